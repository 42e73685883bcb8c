use crate::{
    error::{TypeMismatch, UnknownParameter},
    source::ParameterSource,
    value::ParameterValue,
};
use echem_error::Error;
use echem_expr::{Expr, Node};
use levenshtein::levenshtein;
use std::collections::{hash_map::Iter, HashMap};
use tracing::debug;

/// The maximum edit distance between an unknown parameter name and a defined parameter name for
/// the defined one to be suggested.
const SUGGESTION_DISTANCE: usize = 2;

/// A mapping from parameter names to the values they are bound to.
///
/// Parameter values are built from one or more [`ParameterSource`]s: in-memory mappings or
/// parameter tables on disk. Later sources overwrite the values of earlier ones.
///
/// Lookups never fall back to a default; asking for a name that is not defined is an
/// [`UnknownParameter`] error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterValues {
    values: HashMap<String, ParameterValue>,
}

impl ParameterValues {
    /// Creates parameter values with no parameters defined.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates parameter values from the given source.
    pub fn new(base: impl Into<ParameterSource>) -> Result<Self, Error> {
        let mut values = Self::empty();
        values.update(base)?;
        Ok(values)
    }

    /// Creates parameter values from the `base` source, then overwrites them with every value
    /// from the `optional` source.
    pub fn with_optional(
        base: impl Into<ParameterSource>,
        optional: impl Into<ParameterSource>,
    ) -> Result<Self, Error> {
        let mut values = Self::new(base)?;
        values.update(optional)?;
        Ok(values)
    }

    /// Adds every value from the given source, overwriting existing values with the same name.
    ///
    /// The source is loaded in full before anything is written, so if loading fails, the
    /// parameter values are left unchanged.
    pub fn update(&mut self, source: impl Into<ParameterSource>) -> Result<(), Error> {
        let entries = source.into().load()?;
        debug!(count = entries.len(), "updating parameter values");
        self.values.extend(entries);
        Ok(())
    }

    /// Binds a single parameter, returning the value it was previously bound to, if any.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<ParameterValue>,
    ) -> Option<ParameterValue> {
        self.values.insert(name.into(), value.into())
    }

    /// Returns the value of the parameter with the given name.
    pub fn get(&self, name: &str) -> Result<&ParameterValue, Error> {
        self.values.get(name).ok_or_else(|| {
            Error::spanless(UnknownParameter {
                name: name.to_string(),
                suggestions: self.similar_names(name),
            })
        })
    }

    /// Returns the value bound to the given [`Node::Parameter`] node.
    ///
    /// Any other kind of node is a [`TypeMismatch`] error.
    pub fn get_parameter_value(&self, node: &Expr) -> Result<&ParameterValue, Error> {
        match node.node() {
            Node::Parameter(name) => self.get(name),
            _ => Err(Error::spanless(TypeMismatch {
                expected: "Parameter",
                found: node.kind().typename(),
            })),
        }
    }

    /// Returns true if a parameter with the given name is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns the number of defined parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no parameters are defined.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the names of the defined parameters, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names = self.values.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    /// Returns an iterator over the defined parameters, in arbitrary order.
    pub fn iter(&self) -> Iter<'_, String, ParameterValue> {
        self.values.iter()
    }

    /// Returns the defined names that are similar to the given name, closest first.
    ///
    /// A name is similar if it is at most [`SUGGESTION_DISTANCE`] edits away, and fewer edits away
    /// than the given name has characters. Short symbols like `R` and `F` are never similar to
    /// each other.
    fn similar_names(&self, name: &str) -> Vec<String> {
        let max_distance = SUGGESTION_DISTANCE.min(name.chars().count().saturating_sub(1));
        let mut similar = self.values
            .keys()
            .map(|n| (levenshtein(n, name), n))
            .filter(|(distance, _)| *distance <= max_distance)
            .collect::<Vec<_>>();
        similar.sort();
        similar.into_iter().map(|(_, n)| n.clone()).collect()
    }
}

impl<K: Into<String>, V: Into<ParameterValue>> FromIterator<(K, V)> for ParameterValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ParameterValues {
    type Item = (&'a String, &'a ParameterValue);
    type IntoIter = Iter<'a, String, ParameterValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn overwrite() {
        let values = ParameterValues::with_optional(
            [("a", 1.0), ("b", 2.0)],
            [("b", 3.0)],
        ).unwrap();
        assert_eq!(values.get("a").unwrap(), &ParameterValue::Scalar(1.0));
        assert_eq!(values.get("b").unwrap(), &ParameterValue::Scalar(3.0));
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn update_overwrites() {
        let mut values = ParameterValues::new([("a", 1.0)]).unwrap();
        values.update([("a", 4.0)]).unwrap();
        assert_eq!(values.get("a").unwrap().as_scalar(), Some(4.0));
    }

    #[test]
    fn failed_update_leaves_values_unchanged() {
        let mut values = ParameterValues::new([("a", 1.0)]).unwrap();
        let before = values.clone();
        assert!(values.update("does/not/exist.csv").is_err());
        assert_eq!(values, before);
    }

    #[test]
    fn unknown_parameter() {
        let values = ParameterValues::new([("a", 1.0)]).unwrap();
        let err = values.get("z").unwrap_err();
        assert_eq!(err.downcast_ref::<UnknownParameter>(), Some(&UnknownParameter {
            name: "z".to_string(),
            suggestions: vec![],
        }));
        assert_eq!(err.to_string(), "parameter `z` is not defined");
    }

    #[test]
    fn unknown_parameter_suggestions() {
        let values = ParameterValues::new([
            ("T_ref", 294.85),
            ("T_amb", 298.15),
            ("L_ref", 1.0),
            ("Faraday constant", 96487.0),
        ]).unwrap();
        let err = values.get("T_re").unwrap_err();
        let kind = err.downcast_ref::<UnknownParameter>().unwrap();
        assert_eq!(kind.suggestions, vec!["T_ref".to_string(), "L_ref".to_string()]);
    }

    #[test]
    fn short_names_not_suggested() {
        let values = ParameterValues::new([("R", 8.314), ("F", 96487.0), ("H", 0.114), ("Ln", 1.0)])
            .unwrap();
        let err = values.get("T").unwrap_err();
        assert_eq!(err.downcast_ref::<UnknownParameter>().unwrap().suggestions, Vec::<String>::new());

        let err = values.get("Lx").unwrap_err();
        assert_eq!(err.downcast_ref::<UnknownParameter>().unwrap().suggestions, vec!["Ln".to_string()]);
    }

    #[test]
    fn parameter_node_lookup() {
        let values = ParameterValues::new([("a", 1.0)]).unwrap();
        let value = values.get_parameter_value(&Expr::parameter("a")).unwrap();
        assert_eq!(value, &ParameterValue::Scalar(1.0));
    }

    #[test]
    fn non_parameter_node_lookup() {
        let values = ParameterValues::new([("a", 1.0)]).unwrap();
        let err = values.get_parameter_value(&Expr::variable("a")).unwrap_err();
        assert_eq!(err.downcast_ref::<TypeMismatch>(), Some(&TypeMismatch {
            expected: "Parameter",
            found: "Variable",
        }));
    }

    #[test]
    fn from_iter_and_names() {
        let values = [("b", 2.0), ("a", 1.0), ("c", 3.0)]
            .into_iter()
            .collect::<ParameterValues>();
        assert_eq!(values.names(), vec!["a", "b", "c"]);
        assert!(values.contains("c"));
        assert!(!values.contains("d"));
        assert!(!values.is_empty());
    }
}
