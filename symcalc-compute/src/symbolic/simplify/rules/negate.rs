//! Simplification rules for negation.

use crate::symbolic::{
    expr::{op::{BinaryOp, UnaryOp}, Expr, ExprArena, ExprId},
    simplify::{rules::{as_binary, as_unary, attempt}, step::Step},
    step_collector::StepCollector,
};
use tracing::debug;

/// `--a = a`
pub fn double_negation(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    let inner = as_unary(arena, id, UnaryOp::Neg)?;
    let opt = as_unary(arena, inner, UnaryOp::Neg)?;

    debug!(rule = "double_negation", "cancelled double negation");
    step_collector.push(Step::DoubleNegation);
    Some(opt)
}

/// `-(2) = -2`
/// `-(2a) = -2a`
pub fn negate_number(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    let opt = attempt(arena, id, |arena| {
        let operand = as_unary(arena, id, UnaryOp::Neg)?;
        match arena.get(operand).clone() {
            // `-0` would print as such, and is equal to `0` anyway
            Expr::Number(n) if n == 0.0 => Some(arena.num(0.0)),
            Expr::Number(n) => Some(arena.num(-n)),
            Expr::Complex(z) => Some(arena.complex(-z)),
            _ => {
                let (coeff, rest) = as_binary(arena, operand, BinaryOp::Mul)?;
                let coeff = arena.as_number(coeff)?;
                if coeff == 1.0 {
                    return Some(arena.neg(rest));
                }
                if coeff == -1.0 {
                    return Some(rest);
                }
                let coeff = arena.num(-coeff);
                Some(arena.mul(coeff, rest))
            },
        }
    })?;

    debug!(rule = "negate_number", "folded negation into a number");
    step_collector.push(Step::NegateNumber);
    Some(opt)
}

/// Applies all negation rules.
pub fn all(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    double_negation(arena, id, step_collector)
        .or_else(|| negate_number(arena, id, step_collector))
}
