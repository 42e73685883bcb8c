//! Operator kinds that can appear in [`Node::Unary`](crate::Node::Unary) and
//! [`Node::Binary`](crate::Node::Binary) nodes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The precedence of an operation, in order from lowest precedence (evaluated last) to highest
/// precedence (evaluated first).
///
/// This is only used to decide where parentheses are needed when displaying an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// Precedence of addition (`+`) and subtraction (`-`), which separate terms.
    Term,

    /// Precedence of multiplication (`*`) and division (`/`), which separate factors.
    Factor,

    /// Precedence of unary negation (`-`).
    Neg,

    /// Precedence of exponentiation (`^`).
    Exp,

    /// Precedence of anything that is displayed as a single unit, such as a number, a name, or
    /// a function-style operator like `grad(x)`.
    Atom,
}

/// The associativity of a binary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    /// `a - b - c` is `(a - b) - c`.
    Left,

    /// `a ^ b ^ c` is `a ^ (b ^ c)`.
    Right,
}

/// The unary operation that is being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnaryOpKind {
    /// Negation, `-x`.
    Neg,

    /// Absolute value, `abs(x)`.
    Abs,

    /// Spatial gradient, `grad(x)`.
    Grad,

    /// Spatial divergence, `div(x)`.
    Div,
}

impl UnaryOpKind {
    /// Returns the precedence of the unary operation.
    pub fn precedence(&self) -> Precedence {
        match self {
            Self::Neg => Precedence::Neg,
            Self::Abs | Self::Grad | Self::Div => Precedence::Atom,
        }
    }

    /// Returns the text used to display the operation. Function-style operators are displayed as
    /// `name(operand)`, and negation as a prefix.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Abs => "abs",
            Self::Grad => "grad",
            Self::Div => "div",
        }
    }
}

/// The binary operation that is being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOpKind {
    /// Returns the precedence of the binary operation.
    pub fn precedence(&self) -> Precedence {
        match self {
            Self::Pow => Precedence::Exp,
            Self::Mul | Self::Div => Precedence::Factor,
            Self::Add | Self::Sub => Precedence::Term,
        }
    }

    /// Returns the associativity of the binary operation.
    pub fn associativity(&self) -> Associativity {
        match self {
            Self::Pow => Associativity::Right,
            Self::Mul | Self::Div | Self::Add | Self::Sub => Associativity::Left,
        }
    }

    /// Returns the symbol used to display the operation.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
        }
    }
}
