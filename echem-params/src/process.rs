//! Substitution of parameter values into expression trees.
//!
//! Processing walks an expression tree and rebuilds it, replacing every [`Node::Parameter`] with
//! the value it is bound to in a [`ParameterValues`]. Every other node keeps its kind, operator,
//! and child order. The input tree is never modified.
//!
//! A parameter bound to an expression is replaced by that expression, itself processed against
//! the same values, so parameters may be defined in terms of other parameters. A parameter bound
//! to a function is replaced by the function's result, resolved the same way.
//!
//! Processing stops at the first parameter that cannot be resolved, returning its error. There
//! is no partial result.
//!
//! Parameters defined in terms of each other (`a = b`, `b = a`) are not detected, and processing
//! them does not terminate.

use crate::{value::ParameterValue, values::ParameterValues};
use echem_error::Error;
use echem_expr::{Expr, Node};
use tracing::trace;

/// Any type whose parameters can be replaced with values to produce a new instance of the type.
pub trait Process: Sized {
    /// Returns a copy of `self` with every parameter replaced by its value from `values`.
    fn process(&self, values: &ParameterValues) -> Result<Self, Error>;
}

impl Process for Expr {
    fn process(&self, values: &ParameterValues) -> Result<Self, Error> {
        values.process_symbol(self)
    }
}

impl ParameterValues {
    /// Returns a copy of the given expression with every parameter replaced by its value.
    ///
    /// Nodes other than parameters and operators are returned as-is; since expressions are
    /// immutable, the result may share them with the input.
    ///
    /// See the [module-level documentation](crate::process) for details.
    pub fn process_symbol(&self, symbol: &Expr) -> Result<Expr, Error> {
        match symbol.node() {
            Node::Scalar(_)
                | Node::Vector(_)
                | Node::Matrix(_)
                | Node::Variable(_)
                | Node::InputParameter(_) => Ok(symbol.clone()),
            Node::Parameter(name) => {
                let value = self.get_parameter_value(symbol)?;
                trace!(parameter = %name, value = %value, "resolving parameter");
                self.resolve(value)
            },
            Node::Unary(op, operand) => Ok(Expr::unary(*op, self.process_symbol(operand)?)),
            Node::Binary(op, [lhs, rhs]) => {
                let lhs = self.process_symbol(lhs)?;
                let rhs = self.process_symbol(rhs)?;
                Ok(Expr::binary(*op, lhs, rhs))
            },
        }
    }

    /// Converts a parameter value to the expression that replaces the parameter.
    fn resolve(&self, value: &ParameterValue) -> Result<Expr, Error> {
        match value {
            ParameterValue::Scalar(value) => Ok(Expr::scalar(*value)),
            ParameterValue::Vector(values) => Ok(Expr::vector(values.clone())),
            ParameterValue::Matrix(matrix) => Ok(Expr::matrix(matrix.clone())),
            ParameterValue::Expr(expr) => self.process_symbol(expr),
            ParameterValue::Function(f) => self.resolve(&f.call()),
        }
    }
}
