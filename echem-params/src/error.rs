use ariadne::Fmt;
use echem_attrs::ErrorKind;
use echem_error::EXPR;

/// The parameter is not defined in the parameter values.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("parameter `{}` is not defined", self.name),
    help = if self.suggestions.is_empty() {
        "add it to the parameter values, or load a parameter table that defines it".to_string()
    } else if self.suggestions.len() == 1 {
        format!("did you mean the `{}` parameter?", (&*self.suggestions[0]).fg(EXPR))
    } else {
        format!(
            "did you mean one of these parameters? {}",
            self.suggestions
                .iter()
                .map(|s| format!("`{}`", s.fg(EXPR)))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
)]
pub struct UnknownParameter {
    /// The name of the parameter that was undefined.
    pub name: String,

    /// A list of similarly named parameters, if any.
    pub suggestions: Vec<String>,
}

/// A parameter table defines the same parameter more than once.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("parameter `{}` is defined more than once", self.name),
    labels = ["first defined here", "defined again here"],
    help = "each parameter may only appear once in a table; remove one of the rows",
)]
pub struct DuplicateParameter {
    /// The name of the duplicated parameter.
    pub name: String,
}

/// A row of a parameter table cannot be read as a name and a number.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("malformed parameter table: {}", self.reason),
    labels = ["this row"],
    help = format!(
        "tables need a header with {} and {} columns, and one numeric value per row",
        "Name".fg(EXPR),
        "Value".fg(EXPR),
    ),
)]
pub struct MalformedSource {
    /// What is wrong with the row.
    pub reason: String,
}

/// A parameter table could not be read from disk.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(message = format!("cannot read parameter table `{}`: {}", self.path, self.reason))]
pub struct SourceUnreadable {
    /// The path that was read.
    pub path: String,

    /// The underlying I/O error, as text.
    pub reason: String,
}

/// A node or value of an unexpected kind was given.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(message = format!("expected `{}`, found `{}`", self.expected, self.found))]
pub struct TypeMismatch {
    /// The kind that was expected.
    pub expected: &'static str,

    /// The kind that was given.
    pub found: &'static str,
}
