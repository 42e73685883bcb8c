use echem_expr::{Expr, Matrix};
use std::{fmt::{self, Debug, Display, Formatter}, sync::Arc};

/// A zero-argument function that produces a parameter value when called.
///
/// Callables are shared, so cloning one is cheap. Two callables are equal only if they are clones
/// of the same function.
#[derive(Clone)]
pub struct Callable(Arc<dyn Fn() -> ParameterValue + Send + Sync>);

impl Callable {
    /// Wraps the given function.
    pub fn new(f: impl Fn() -> ParameterValue + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Calls the function.
    pub fn call(&self) -> ParameterValue {
        (self.0)()
    }
}

impl Debug for Callable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Callable({:p})", Arc::as_ptr(&self.0))
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Represents any value that a parameter can be bound to.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    /// A single number.
    Scalar(f64),

    /// A column of numbers.
    Vector(Vec<f64>),

    /// A dense matrix of numbers.
    Matrix(Matrix),

    /// A symbolic expression, which may itself refer to other parameters.
    Expr(Expr),

    /// A function that computes the value on demand.
    Function(Callable),
}

impl ParameterValue {
    /// Returns the typename of this value.
    pub fn typename(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "Scalar",
            Self::Vector(_) => "Vector",
            Self::Matrix(_) => "Matrix",
            Self::Expr(_) => "Expr",
            Self::Function(_) => "Function",
        }
    }

    /// If the value is a [`ParameterValue::Scalar`], returns the number.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(value) => Some(*value),
            _ => None,
        }
    }

    /// If the value is a [`ParameterValue::Expr`], returns the expression.
    pub fn as_expr(&self) -> Option<&Expr> {
        match self {
            Self::Expr(expr) => Some(expr),
            _ => None,
        }
    }
}

impl Display for ParameterValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(value) => write!(f, "{}", value),
            Self::Vector(values) => {
                let values = values.iter().map(f64::to_string).collect::<Vec<_>>();
                write!(f, "[{}]", values.join(", "))
            },
            Self::Matrix(matrix) => write!(f, "Matrix({}x{})", matrix.rows(), matrix.cols()),
            Self::Expr(expr) => write!(f, "{}", expr),
            Self::Function(_) => write!(f, "<function>"),
        }
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<f64>> for ParameterValue {
    fn from(values: Vec<f64>) -> Self {
        Self::Vector(values)
    }
}

impl From<Matrix> for ParameterValue {
    fn from(matrix: Matrix) -> Self {
        Self::Matrix(matrix)
    }
}

impl From<Expr> for ParameterValue {
    fn from(expr: Expr) -> Self {
        Self::Expr(expr)
    }
}

impl From<&Expr> for ParameterValue {
    fn from(expr: &Expr) -> Self {
        Self::Expr(expr.clone())
    }
}

impl From<Callable> for ParameterValue {
    fn from(callable: Callable) -> Self {
        Self::Function(callable)
    }
}
