//! Symbolic expression trees for electrochemical models.
//!
//! Model equations are written as trees of [`Expr`] nodes: numeric constants ([`Node::Scalar`],
//! [`Node::Vector`], [`Node::Matrix`]), named placeholders ([`Node::Parameter`],
//! [`Node::InputParameter`]), state variables ([`Node::Variable`]), and operators
//! ([`Node::Unary`], [`Node::Binary`]).
//!
//! The usual arithmetic operators build operator nodes directly, without any simplification, so
//! the tree mirrors the equation as written:
//!
//! ```
//! use echem_expr::{BinOpKind, Expr, Node, UnaryOpKind};
//!
//! let a = Expr::parameter("a");
//! let c = Expr::variable("c");
//! let rhs = &a * c.gradient();
//!
//! assert_eq!(rhs.to_string(), "a * grad(c)");
//! match rhs.node() {
//!     Node::Binary(BinOpKind::Mul, [lhs, rhs]) => {
//!         assert_eq!(lhs, &a);
//!         assert_eq!(rhs.node(), &Node::Unary(UnaryOpKind::Grad, c));
//!     },
//!     _ => unreachable!(),
//! }
//! ```
//!
//! # Features
//!
//! - `serde`: Derives [`serde`] traits for expressions, nodes, and matrices.

pub mod array;
pub mod expr;
pub mod op;

pub use array::Matrix;
pub use expr::{Expr, ExprIter, Node, NodeKind};
pub use op::{BinOpKind, UnaryOpKind};
