//! Error kinds reported while parsing source code.

use ariadne::Fmt;
use symcalc_attrs::ErrorKind;
use symcalc_error::EXPR;
use crate::tokenizer::TokenKind;

/// The end of the source code was reached unexpectedly.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unexpected end of file",
    labels = [format!("you might need to add another {} here", "expression".fg(EXPR))],
)]
pub struct UnexpectedEof;

/// The end of the source code was expected, but something else was found.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "expected end of file",
    labels = [format!("I could not understand the remaining {} here", "expression".fg(EXPR))],
)]
pub struct ExpectedEof;

/// An unexpected token was encountered.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unexpected token",
    labels = [format!("expected one of: {}", self.expected.iter().map(|t| format!("{:?}", t)).collect::<Vec<_>>().join(", "))],
    help = format!("found {:?}", self.found),
)]
pub struct UnexpectedToken {
    /// The token(s) that were expected.
    pub expected: &'static [TokenKind],

    /// The token that was found.
    pub found: TokenKind,
}

/// A parenthesis or bracket was opened but never closed.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unclosed parenthesis",
    labels = ["this parenthesis is never closed"],
    help = format!("add a closing `{}` after the {}", self.close, "expression".fg(EXPR)),
)]
pub struct UnclosedParenthesis {
    /// The closing character that was expected.
    pub close: char,
}

/// The left-hand side of an assignment is not something that can be assigned to.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "invalid assignment target",
    labels = ["this cannot be assigned to"],
    help = format!("assign to a variable (`{}`) or a function header (`{}`)", "x = 2".fg(EXPR), "f(x) = x^2".fg(EXPR)),
)]
pub struct InvalidAssignmentTarget;

/// A number literal could not be represented as a floating-point number.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "invalid number literal",
    labels = ["this number cannot be represented"],
)]
pub struct InvalidNumber;
