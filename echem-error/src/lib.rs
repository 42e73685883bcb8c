//! Contains the common [`ErrorKind`] trait used by all errors to display user-facing error
//! messages, and the [`Error`] type that pairs an error kind with the regions of source text it
//! originated from.
//!
//! Most errors raised while processing parameters have no source text at all (an unknown
//! parameter name is just a name), in which case the error is created with no spans. Errors
//! raised while reading a parameter table carry the byte ranges of the offending rows, so the
//! report can point at them.

// lets `echem_attrs::ErrorKind` refer to this crate by name in its own tests
extern crate self as echem_error;

use ariadne::{Color, Report};
use std::{any::Any, fmt::{self, Debug, Display}, ops::Range};

/// The color to use to highlight expressions.
pub const EXPR: Color = Color::RGB(52, 235, 152);

/// Represents any kind of error that can occur during some operation.
///
/// This trait is usually derived with `echem_attrs::ErrorKind`.
pub trait ErrorKind: Debug + Send + Sync {
    /// Returns the error kind as [`Any`], so that it can be downcast to its concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Returns the message describing this error.
    fn message(&self) -> String;

    /// Builds the report for this error.
    fn build_report<'a>(
        &self,
        src_id: &'a str,
        spans: &[Range<usize>],
    ) -> Report<'a, (&'a str, Range<usize>)>;
}

/// An error associated with regions of source text that can be highlighted.
#[derive(Debug)]
pub struct Error {
    /// The regions of the source text that this error originated from.
    pub spans: Vec<Range<usize>>,

    /// The kind of error that occurred.
    pub kind: Box<dyn ErrorKind>,
}

impl Error {
    /// Creates a new error with the given spans and kind.
    pub fn new(spans: Vec<Range<usize>>, kind: impl ErrorKind + 'static) -> Self {
        Self { spans, kind: Box::new(kind) }
    }

    /// Creates a new error that is not associated with any source text.
    pub fn spanless(kind: impl ErrorKind + 'static) -> Self {
        Self::new(Vec::new(), kind)
    }

    /// Returns true if the kind of this error is `K`.
    pub fn is<K: ErrorKind + 'static>(&self) -> bool {
        self.kind.as_any().is::<K>()
    }

    /// Returns a reference to the kind of this error if it is of type `K`.
    pub fn downcast_ref<K: ErrorKind + 'static>(&self) -> Option<&K> {
        self.kind.as_any().downcast_ref::<K>()
    }

    /// Build a report from this error kind.
    pub fn build_report<'a>(&self, src_id: &'a str) -> Report<'a, (&'a str, Range<usize>)> {
        self.kind.build_report(src_id, &self.spans)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.message())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use ariadne::Source;
    use echem_attrs::ErrorKind;
    use super::*;

    #[derive(Debug, ErrorKind, PartialEq)]
    #[error(
        message = format!("`{}` is defined twice", name),
        labels = ["first defined here", "defined again here"],
        help = "remove one of the rows",
    )]
    struct Twice {
        name: String,
    }

    #[derive(Debug, ErrorKind)]
    #[error(message = "nothing to see here")]
    struct Bare;

    /// Renders the report of the given error against the given source, without colors.
    fn render(err: &Error, src: &str) -> String {
        let mut out = Vec::new();
        err.build_report("input.csv")
            .write(("input.csv", Source::from(src)), &mut out)
            .unwrap();
        String::from_utf8(strip_ansi_escapes::strip(out)).unwrap()
    }

    #[test]
    fn display_uses_message() {
        let err = Error::spanless(Twice { name: "R".to_string() });
        assert_eq!(err.to_string(), "`R` is defined twice");
    }

    #[test]
    fn downcast_kind() {
        let err = Error::spanless(Twice { name: "F".to_string() });
        assert!(err.is::<Twice>());
        assert!(!err.is::<Bare>());
        assert_eq!(err.downcast_ref::<Twice>(), Some(&Twice { name: "F".to_string() }));
    }

    #[test]
    fn report_highlights_spans() {
        let src = "Name,Value\nR,8.314\nR,8.3\n";
        let err = Error::new(vec![11..18, 19..24], Twice { name: "R".to_string() });
        let report = render(&err, src);
        assert!(report.contains("`R` is defined twice"));
        assert!(report.contains("first defined here"));
        assert!(report.contains("defined again here"));
        assert!(report.contains("remove one of the rows"));
    }

    #[test]
    fn report_without_spans() {
        let err = Error::spanless(Bare);
        let report = render(&err, "");
        assert!(report.contains("nothing to see here"));
    }
}
