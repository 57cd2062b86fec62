use crate::{
    parser::{error::InvalidAssignmentTarget, Parse, Parser, Precedence},
    tokenizer::TokenKind,
};
use std::ops::Range;
use super::{
    assign::Assign,
    binary::Binary,
    call::Call,
    literal::Literal,
    paren::Paren,
    unary::Unary,
};
use symcalc_error::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents any kind of expression.
///
/// An expression is any valid piece of source code that can be evaluated to produce a value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    /// A literal value.
    Literal(Literal),

    /// A parenthesized expression, such as `(1 + 2)`.
    Paren(Paren),

    /// A function call, such as `abs(-1)`.
    Call(Call),

    /// A unary operation, such as `-1` or `!true`.
    Unary(Unary),

    /// A binary operation, such as `1 + 2`.
    Binary(Binary),

    /// An assignment of a variable or function, such as `x = 1` or `f(x) = x^2`.
    Assign(Assign),
}

impl Expr {
    /// Returns the span of the expression.
    pub fn span(&self) -> Range<usize> {
        match self {
            Expr::Literal(literal) => literal.span(),
            Expr::Paren(paren) => paren.span(),
            Expr::Call(call) => call.span(),
            Expr::Unary(unary) => unary.span(),
            Expr::Binary(binary) => binary.span(),
            Expr::Assign(assign) => assign.span(),
        }
    }

    /// If this expression is an [`Expr::Paren`], returns the innermost expression in the
    /// parenthesized expression. Otherwise, returns `self`.
    pub fn innermost(&self) -> &Expr {
        match self {
            Expr::Paren(paren) => paren.innermost(),
            _ => self,
        }
    }
}

impl Parse for Expr {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        if let Some(assign) = Assign::parse_if_present(input)? {
            return Ok(Expr::Assign(assign));
        }

        let lhs = Unary::parse_or_lower(input)?;
        let expr = Binary::parse_expr(input, lhs, Precedence::Any)?;

        // valid assignment targets were handled above
        if input.peek_kind() == Some(TokenKind::Assign) {
            return Err(Error::new(vec![expr.span()], InvalidAssignmentTarget));
        }

        Ok(expr)
    }
}

/// Represents a primary expression.
///
/// Primary expressions are the simplest expressions, and are the building blocks of more complex
/// expressions. Primary expressions also include expressions involving parentheses, since they
/// can be unambiguously parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum Primary {
    /// A literal value.
    Literal(Literal),

    /// A parenthesized expression, such as `(1 + 2)`.
    Paren(Paren),

    /// A function call, such as `abs(-1)`.
    Call(Call),
}

impl Primary {
    /// Returns the span of the primary expression.
    pub fn span(&self) -> Range<usize> {
        match self {
            Primary::Literal(literal) => literal.span(),
            Primary::Paren(paren) => paren.span(),
            Primary::Call(call) => call.span(),
        }
    }
}

impl Parse for Primary {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        match input.peek_kind() {
            Some(TokenKind::OpenParen) => input.try_parse::<Paren>().map(Primary::Paren),
            Some(TokenKind::Name) => {
                // a name directly followed by `(` is a function call
                let mut ahead = input.clone();
                ahead.next_token()?;
                if ahead.peek_kind() == Some(TokenKind::OpenParen) {
                    input.try_parse::<Call>().map(Primary::Call)
                } else {
                    input.try_parse::<Literal>().map(Primary::Literal)
                }
            },
            _ => input.try_parse::<Literal>().map(Primary::Literal),
        }
    }
}

impl From<Primary> for Expr {
    fn from(primary: Primary) -> Self {
        match primary {
            Primary::Literal(literal) => Self::Literal(literal),
            Primary::Paren(paren) => Self::Paren(paren),
            Primary::Call(call) => Self::Call(call),
        }
    }
}
