use crate::{process::Process, values::ParameterValues};
use echem_error::Error;
use echem_expr::Expr;
use indexmap::IndexMap;
use std::hash::Hash;
use tracing::debug;

/// The boundary conditions of a variable at the two ends of its domain. A side with no condition
/// is [`None`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundaryConditions {
    /// The condition at the left end of the domain.
    pub left: Option<Expr>,

    /// The condition at the right end of the domain.
    pub right: Option<Expr>,
}

impl BoundaryConditions {
    /// Creates boundary conditions with both sides given.
    pub fn new(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self {
            left: Some(left.into()),
            right: Some(right.into()),
        }
    }

    /// Returns the conditions that are present, left first.
    pub fn iter(&self) -> impl Iterator<Item = &Expr> {
        self.left.iter().chain(self.right.iter())
    }
}

impl Process for BoundaryConditions {
    fn process(&self, values: &ParameterValues) -> Result<Self, Error> {
        Ok(Self {
            left: self.left.as_ref().map(|left| left.process(values)).transpose()?,
            right: self.right.as_ref().map(|right| right.process(values)).transpose()?,
        })
    }
}

/// A set of equations describing a model, written in terms of variables and parameters.
///
/// Every map is keyed by the variable (or, for `variables`, the name) the equation belongs to,
/// and keeps the order equations were added in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    /// The name of the model.
    pub name: String,

    /// The right-hand sides of the differential equations, `d(key)/dt = value`.
    pub rhs: IndexMap<Expr, Expr>,

    /// The algebraic equations, `0 = value`.
    pub algebraic: IndexMap<Expr, Expr>,

    /// The initial value of each variable.
    pub initial_conditions: IndexMap<Expr, Expr>,

    /// The boundary conditions of each variable.
    pub boundary_conditions: IndexMap<Expr, BoundaryConditions>,

    /// Named output expressions.
    pub variables: IndexMap<String, Expr>,
}

impl Model {
    /// Creates an empty model with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Returns an iterator over every equation of the model.
    pub fn equations(&self) -> impl Iterator<Item = &Expr> {
        self.rhs.values()
            .chain(self.algebraic.values())
            .chain(self.initial_conditions.values())
            .chain(self.boundary_conditions.values().flat_map(|conditions| conditions.iter()))
            .chain(self.variables.values())
    }

    /// Returns true if no equation of the model contains a parameter.
    pub fn is_processed(&self) -> bool {
        !self.equations().any(Expr::has_parameters)
    }
}

/// Processes every value of the map, keeping the keys and their order.
fn process_equations<K: Clone + Hash + Eq, V: Process>(
    equations: &IndexMap<K, V>,
    values: &ParameterValues,
) -> Result<IndexMap<K, V>, Error> {
    equations
        .iter()
        .map(|(key, equation)| Ok((key.clone(), equation.process(values)?)))
        .collect()
}

impl Process for Model {
    fn process(&self, values: &ParameterValues) -> Result<Self, Error> {
        Ok(Self {
            name: self.name.clone(),
            rhs: process_equations(&self.rhs, values)?,
            algebraic: process_equations(&self.algebraic, values)?,
            initial_conditions: process_equations(&self.initial_conditions, values)?,
            boundary_conditions: process_equations(&self.boundary_conditions, values)?,
            variables: process_equations(&self.variables, values)?,
        })
    }
}

impl ParameterValues {
    /// Replaces every parameter in the model's equations with its value.
    ///
    /// If any equation fails to process, the error is returned and the model is left unchanged.
    pub fn process_model(&self, model: &mut Model) -> Result<(), Error> {
        *model = model.process(self)?;
        debug!(model = %model.name, "processed model");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::UnknownParameter;
    use pretty_assertions::assert_eq;
    use super::*;

    fn model() -> Model {
        let c = Expr::variable("c");
        let mut model = Model::new("diffusion");
        model.rhs.insert(c.clone(), Expr::parameter("a") * c.gradient().divergence());
        model.initial_conditions.insert(c.clone(), Expr::parameter("b"));
        model.boundary_conditions.insert(c.clone(), BoundaryConditions {
            left: Some(Expr::scalar(0.0)),
            right: Some(Expr::parameter("b") * 2.0),
        });
        model.variables.insert("Concentration".to_string(), c);
        model
    }

    #[test]
    fn process_model() {
        let values = ParameterValues::new([("a", 1.0), ("b", 2.0)]).unwrap();
        let mut model = model();
        assert!(!model.is_processed());

        values.process_model(&mut model).unwrap();
        assert!(model.is_processed());

        let c = Expr::variable("c");
        assert_eq!(model.rhs[&c], Expr::scalar(1.0) * c.gradient().divergence());
        assert_eq!(model.initial_conditions[&c], Expr::scalar(2.0));
        assert_eq!(model.boundary_conditions[&c], BoundaryConditions::new(0.0, Expr::scalar(2.0) * 2.0));
        assert_eq!(model.variables["Concentration"], c);
    }

    #[test]
    fn missing_side_stays_missing() {
        let values = ParameterValues::new([("b", 2.0)]).unwrap();
        let conditions = BoundaryConditions {
            left: None,
            right: Some(Expr::parameter("b")),
        };
        let processed = conditions.process(&values).unwrap();
        assert_eq!(processed.left, None);
        assert_eq!(processed.right, Some(Expr::scalar(2.0)));
    }

    #[test]
    fn all_or_nothing() {
        let values = ParameterValues::new([("a", 1.0)]).unwrap();
        let mut model = model();
        let before = model.clone();

        let err = values.process_model(&mut model).unwrap_err();
        assert!(err.is::<UnknownParameter>());
        assert_eq!(model, before);
    }
}
