use crate::{
    parser::{
        token::op::{UnaryOp, UnaryOpKind},
        Parser,
        Precedence,
    },
    tokenizer::TokenKind,
};
use std::ops::Range;
use super::{binary::Binary, expr::{Expr, Primary}};
use symcalc_error::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A unary expression, such as `-2` or `3!`. Unary expressions can include nested expressions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Unary {
    /// The operand of the unary expression.
    pub operand: Box<Expr>,

    /// The operator of the unary expression.
    pub op: UnaryOp,

    /// The region of the source code that this unary expression was parsed from.
    pub span: Range<usize>,
}

impl Unary {
    /// Returns the span of the unary expression.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Parses a unary expression with a prefix operator (`-` or `not`), if one is present.
    fn parse_prefix(input: &mut Parser) -> Result<Option<Expr>, Error> {
        if !matches!(input.peek_kind(), Some(TokenKind::Sub | TokenKind::Not)) {
            return Ok(None);
        }

        let op = input.try_parse::<UnaryOp>()?;
        let operand = Self::parse_or_lower(input)?;

        // operators binding tighter than the prefix operator apply to the operand first, so that
        // `-x^2` is `-(x^2)`
        let operand = match op.kind {
            UnaryOpKind::Neg => Binary::parse_expr(input, operand, Precedence::Exp)?,
            _ => operand,
        };

        let span = op.span.start..operand.span().end;
        Ok(Some(Expr::Unary(Self {
            operand: Box::new(operand),
            op,
            span,
        })))
    }

    /// Wraps the given expression in any factorial operators that follow it.
    fn parse_postfix(input: &mut Parser, mut expr: Expr) -> Result<Expr, Error> {
        while input.peek_kind() == Some(TokenKind::Factorial) {
            let op = input.try_parse::<UnaryOp>()?;
            let span = expr.span().start..op.span.end;
            expr = Expr::Unary(Self {
                operand: Box::new(expr),
                op,
                span,
            });
        }
        Ok(expr)
    }

    /// Parses a unary expression, or a primary expression if there is no unary operator.
    pub fn parse_or_lower(input: &mut Parser) -> Result<Expr, Error> {
        if let Some(expr) = Self::parse_prefix(input)? {
            return Ok(expr);
        }

        let primary = input.try_parse::<Primary>()?;
        Self::parse_postfix(input, primary.into())
    }
}
