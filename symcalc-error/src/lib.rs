//! Contains the common [`ErrorKind`] trait used by all errors to display user-facing error
//! messages, and the [`Error`] type that pairs a kind with the source regions it came from.

// allows the `ErrorKind` derive to be used within this crate's tests
extern crate self as symcalc_error;

use ariadne::{Color, Report, Source};
use std::{any::Any, fmt::Debug, ops::Range};

/// The color to use to highlight expressions.
pub const EXPR: Color = Color::RGB(52, 235, 152);

/// Represents any kind of error that can occur during some operation.
pub trait ErrorKind: Debug + Send {
    /// Returns the error as [`Any`], so that callers can inspect the concrete kind.
    fn as_any(&self) -> &dyn Any;

    /// Builds the report for this error.
    fn build_report<'a>(
        &self,
        src_id: &'a str,
        spans: &[Range<usize>],
    ) -> Report<(&'a str, Range<usize>)>;
}

/// An error associated with regions of source code that can be highlighted.
///
/// Errors raised while analyzing an expression tree that was built programmatically have no
/// spans.
#[derive(Debug)]
pub struct Error {
    /// The regions of the source code that this error originated from.
    pub spans: Vec<Range<usize>>,

    /// The kind of error that occurred.
    pub kind: Box<dyn ErrorKind>,
}

impl Error {
    /// Creates a new error with the given spans and kind.
    pub fn new(spans: Vec<Range<usize>>, kind: impl ErrorKind + 'static) -> Self {
        Self { spans, kind: Box::new(kind) }
    }

    /// Creates a new error that does not point at any source code.
    pub fn spanless(kind: impl ErrorKind + 'static) -> Self {
        Self::new(Vec::new(), kind)
    }

    /// Attaches the given span to this error if it does not point at any source code yet.
    pub fn or_span(mut self, span: Range<usize>) -> Self {
        if self.spans.is_empty() {
            self.spans.push(span);
        }
        self
    }

    /// Returns true if the error is of the given kind.
    pub fn is<K: ErrorKind + 'static>(&self) -> bool {
        self.kind.as_any().is::<K>()
    }

    /// Returns a reference to the error kind, if it is of the given type.
    pub fn downcast_ref<K: ErrorKind + 'static>(&self) -> Option<&K> {
        self.kind.as_any().downcast_ref::<K>()
    }

    /// Build a report from this error kind.
    pub fn build_report<'a>(&self, src_id: &'a str) -> Report<(&'a str, Range<usize>)> {
        self.kind.build_report(src_id, &self.spans)
    }

    /// Report this error to stderr, highlighting the given source.
    ///
    /// The [`Report`] type does not implement `Display`, so this is the simplest way to show the
    /// error to a user.
    pub fn report_to_stderr(&self, src_id: &str, input: &str) {
        // a failure to write to stderr leaves nothing to report to
        let _ = self.build_report(src_id).eprint((src_id, Source::from(input)));
    }

    /// Renders the report for this error into a string, without colors.
    pub fn report_to_string(&self, src_id: &str, input: &str) -> String {
        let mut buf = Vec::new();
        let _ = self.build_report(src_id).write((src_id, Source::from(input)), &mut buf);
        String::from_utf8_lossy(&strip_ansi_escapes::strip(&buf)).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use symcalc_attrs::ErrorKind;
    use super::*;

    #[derive(Debug, ErrorKind)]
    #[error(
        message = format!("`{}` is not defined", self.name),
        labels = ["this variable"],
        help = "define it first",
    )]
    struct Undefined {
        name: String,
    }

    #[derive(Debug, ErrorKind)]
    #[error(message = "something else")]
    struct Other;

    #[test]
    fn downcast_kind() {
        let err = Error::new(vec![0..1], Undefined { name: "x".to_string() });
        assert!(err.is::<Undefined>());
        assert!(!err.is::<Other>());
        assert_eq!(err.downcast_ref::<Undefined>().unwrap().name, "x");
    }

    #[test]
    fn report_with_span() {
        let err = Error::new(vec![4..5], Undefined { name: "y".to_string() });
        let report = err.report_to_string("input", "2 + y");
        assert!(report.contains("`y` is not defined"));
        assert!(report.contains("this variable"));
        assert!(report.contains("define it first"));
    }

    #[test]
    fn report_without_span() {
        let err = Error::spanless(Other).or_span(0..1);
        assert_eq!(err.spans, vec![0..1]);

        let err = Error::spanless(Other);
        let report = err.report_to_string("input", "x");
        assert!(report.contains("something else"));
    }
}
