use crate::{
    parser::{
        token::op::{BinOp, BinOpKind},
        Associativity,
        Parser,
        Precedence,
    },
    tokenizer::TokenKind,
};
use std::ops::Range;
use super::{expr::Expr, unary::Unary};
use symcalc_error::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A binary expression, such as `1 + 2`. Binary expressions can include nested expressions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Binary {
    /// The left-hand side of the binary expression.
    pub lhs: Box<Expr>,

    /// The operator of the binary expression.
    pub op: BinOp,

    /// The right-hand side of the binary expression.
    pub rhs: Box<Expr>,

    /// The region of the source code that this binary expression was parsed from.
    pub span: Range<usize>,
}

/// The operator found after an operand, if any.
#[derive(Debug, Clone, PartialEq)]
enum NextOp {
    /// An explicit binary operator, such as `+` or `*`.
    Op(BinOp),

    /// Implicit multiplication, such as `2x` or `x(x + 1)`.
    ///
    /// This is not a real operator, but it is treated as one for the purposes of parsing.
    ImplicitMultiplication,
}

impl NextOp {
    /// Returns the precedence of the operator.
    fn precedence(&self) -> Precedence {
        match self {
            NextOp::Op(op) => op.precedence(),
            NextOp::ImplicitMultiplication => Precedence::Factor,
        }
    }

    /// Returns the associativity of the operator.
    fn associativity(&self) -> Associativity {
        match self {
            NextOp::Op(op) => op.associativity(),
            NextOp::ImplicitMultiplication => Associativity::Left,
        }
    }
}

impl Binary {
    /// Returns the span of the binary expression.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Looks ahead for the next operator without consuming it. Returns [`None`] if the next
    /// token is not a binary operator and does not start a primary expression.
    fn peek_op(input: &Parser) -> Option<NextOp> {
        let mut input_ahead = input.clone();
        match input_ahead.try_parse::<BinOp>() {
            Ok(op) => Some(NextOp::Op(op)),
            Err(_) if input.peek_kind().map_or(false, TokenKind::starts_primary) => {
                Some(NextOp::ImplicitMultiplication)
            },
            Err(_) => None,
        }
    }

    /// Consumes the next operator if its precedence is at least the given precedence.
    fn next_op(input: &mut Parser, precedence: Precedence) -> Option<NextOp> {
        let mut input_ahead = input.clone();
        if let Ok(op) = input_ahead.try_parse::<BinOp>() {
            if op.precedence() >= precedence {
                input.set_cursor(&input_ahead);
                return Some(NextOp::Op(op));
            }
            return None;
        }

        // implicit multiplication has no token to consume
        let starts_primary = input.peek_kind().map_or(false, TokenKind::starts_primary);
        if starts_primary && Precedence::Factor >= precedence {
            Some(NextOp::ImplicitMultiplication)
        } else {
            None
        }
    }

    /// Parses a binary expression starting with the given left-hand side, consuming operators
    /// whose precedence is at least the given precedence.
    pub fn parse_expr(input: &mut Parser, mut lhs: Expr, precedence: Precedence) -> Result<Expr, Error> {
        while let Some(op) = Self::next_op(input, precedence) {
            let mut rhs = Unary::parse_or_lower(input)?;

            // before creating the `lhs op rhs` node, check the precedence of the following
            // operator, if any; in `3 + 4 * 5`, the `4 * 5` must be grouped first
            while let Some(next_op) = Self::peek_op(input) {
                let next_precedence = next_op.precedence();
                let binds_tighter = next_precedence > op.precedence()
                    || (next_precedence == op.precedence()
                        && next_op.associativity() == Associativity::Right);
                if binds_tighter {
                    rhs = Self::parse_expr(input, rhs, next_precedence)?;
                } else {
                    break;
                }
            }

            lhs = Self::build(lhs, op, rhs);
        }

        Ok(lhs)
    }

    /// Builds the node representing `lhs op rhs`.
    fn build(lhs: Expr, op: NextOp, rhs: Expr) -> Expr {
        let span = lhs.span().start..rhs.span().end;
        let op = match op {
            NextOp::Op(op) => op,
            NextOp::ImplicitMultiplication => BinOp {
                kind: BinOpKind::Mul,
                implicit: true,
                span: lhs.span().end..rhs.span().start,
            },
        };
        Expr::Binary(Binary {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
            span,
        })
    }
}
