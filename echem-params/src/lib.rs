//! Parameter values and parameter substitution for electrochemical models.
//!
//! Model equations ([`echem_expr::Expr`] trees) refer to physical constants and design choices
//! through named [`Node::Parameter`](echem_expr::Node::Parameter) placeholders. A
//! [`ParameterValues`] binds those names to numbers, arrays, expressions, or functions, and
//! [`ParameterValues::process_symbol`] returns a copy of a tree with every parameter replaced by
//! its value.
//!
//! ```
//! use echem_expr::Expr;
//! use echem_params::ParameterValues;
//!
//! let values = ParameterValues::new([("a", 1.0), ("b", 2.0)]).unwrap();
//!
//! let c = Expr::variable("c");
//! let rhs = Expr::parameter("a") * c.gradient() + Expr::parameter("b");
//! let processed = values.process_symbol(&rhs).unwrap();
//!
//! assert_eq!(processed.to_string(), "1 * grad(c) + 2");
//! assert!(!processed.has_parameters());
//! ```
//!
//! Parameter values can also be read from parameter tables on disk; see the [`source`] module
//! for the table format.
//!
//! # Errors
//!
//! Every fallible operation returns an [`echem_error::Error`], which can be rendered as a report
//! pointing at the offending row of a parameter table with [`echem_error::Error::build_report`].
//! The possible error kinds are in the [`error`] module.
//!
//! # Logging
//!
//! Loading tables and processing models emit [`tracing`] events. Use [`Settings::init_tracing`]
//! to show them on standard error.

pub mod error;
pub mod model;
pub mod process;
pub mod settings;
pub mod source;
pub mod value;
pub mod values;

pub use model::{BoundaryConditions, Model};
pub use process::Process;
pub use settings::Settings;
pub use source::{read_parameters_csv, read_parameters_csv_str, ParameterSource};
pub use value::{Callable, ParameterValue};
pub use values::ParameterValues;
