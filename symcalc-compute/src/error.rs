//! Error kinds that can occur while building, evaluating or analyzing expressions.

use ariadne::Fmt;
use symcalc_attrs::ErrorKind;
use symcalc_error::EXPR;
use crate::symbolic::expr::op::{BinaryOp, UnaryOp};

/// A node was constructed with the wrong number of children.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("wrong number of arguments given to `{}`", self.name),
    labels = [format!("{} argument(s) given here", self.given)],
    help = format!("`{}` takes {} argument(s)", (&self.name).fg(EXPR), self.expected),
)]
pub struct ArityError {
    /// The name of the node or function.
    pub name: String,

    /// A description of the accepted number of arguments, such as `2` or `3 to 4`.
    pub expected: String,

    /// The number of arguments that were given.
    pub given: usize,
}

impl ArityError {
    /// Creates an arity error for a node accepting between `min` and `max` children.
    pub fn new(name: impl Into<String>, min: usize, max: usize, given: usize) -> Self {
        let expected = if min == max {
            min.to_string()
        } else if max == usize::MAX {
            format!("at least {}", min)
        } else {
            format!("{} to {}", min, max)
        };
        Self { name: name.into(), expected, given }
    }
}

/// A function was given an argument outside of its domain.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` is not defined for this input", self.function),
    labels = [self.reason.clone()],
)]
pub struct DomainError {
    /// The function or operator that was applied.
    pub function: String,

    /// Why the input is outside the domain.
    pub reason: String,
}

/// A value was divided by zero.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "division by zero",
    labels = ["this divisor is zero"],
)]
pub struct DivisionByZero;

/// Two vectors or matrices do not have compatible shapes.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "mismatched shapes",
    labels = [format!("cannot combine a `{}` with a `{}`", self.left, self.right)],
)]
pub struct ShapeMismatch {
    /// The shape of the left operand.
    pub left: String,

    /// The shape of the right operand.
    pub right: String,
}

/// The variable is undefined.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` is not defined", self.name),
    labels = ["this variable"],
    help = format!("to define it, type: {} = {}", (&self.name).fg(EXPR), "<expression>".fg(EXPR)),
)]
pub struct UndefinedVariable {
    /// The name of the variable that was undefined.
    pub name: String,
}

/// The function is undefined.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("the `{}` function does not exist", self.name),
    labels = ["this function"],
    help = if self.suggestions.is_empty() {
        format!("to define it, type: {} = {}", format!("{}(x)", self.name).fg(EXPR), "<expression>".fg(EXPR))
    } else if self.suggestions.len() == 1 {
        format!("did you mean the `{}` function?", (&*self.suggestions[0]).fg(EXPR))
    } else {
        format!(
            "did you mean one of these functions? {}",
            self.suggestions
                .iter()
                .map(|s| format!("`{}`", s.fg(EXPR)))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
)]
pub struct UndefinedFunction {
    /// The name of the function that was undefined.
    pub name: String,

    /// A list of similarly named functions, if any.
    pub suggestions: Vec<String>,
}

/// The operation has no defined meaning for this expression.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("cannot {}", self.operation),
    labels = ["this expression"],
)]
pub struct UnsupportedOperation {
    /// A description of the attempted operation, such as `differentiate a comparison`.
    pub operation: String,
}

/// An analyzer was run without the context it requires.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "invalid configuration",
    labels = [self.reason],
    help = self.reason,
)]
pub struct InvalidConfiguration {
    /// What is missing.
    pub reason: &'static str,
}

/// The maximum recursion depth was exceeded.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "maximum recursion depth reached",
    labels = ["while working on this expression"],
    help = format!("the maximum recursion depth is {}", self.max_depth),
)]
pub struct RecursionLimitExceeded {
    /// The configured recursion ceiling.
    pub max_depth: usize,
}

/// The given binary operation cannot be applied to the given operands.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("cannot apply the `{}` operator to these operands", self.op),
    labels = [format!("the operands have types `{}` and `{}`", self.left, self.right)],
)]
pub struct InvalidBinaryOperation {
    /// The operator that was used.
    pub op: BinaryOp,

    /// The type the left side evaluated to.
    pub left: &'static str,

    /// The type the right side evaluated to.
    pub right: &'static str,
}

/// The given unary operation cannot be applied to the given operand.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("cannot apply `{}` to this operand", self.op),
    labels = [format!("this operand has type `{}`", self.operand)],
)]
pub struct InvalidUnaryOperation {
    /// The operator that was used.
    pub op: UnaryOp,

    /// The type the operand evaluated to.
    pub operand: &'static str,
}

/// A node refers to a child that cannot be used in its position.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "invalid expression node",
    labels = [self.reason.clone()],
)]
pub struct InvalidChild {
    /// What is wrong with the child.
    pub reason: String,
}
