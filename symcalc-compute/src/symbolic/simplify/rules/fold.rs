//! Folding of operations whose operands are all literals.

use crate::numerical::{eval::{apply_binary, apply_unary}, trig_mode::TrigMode, value::Value};
use crate::symbolic::{
    expr::{op::{BinaryOp, UnaryOp}, Expr, ExprArena, ExprId},
    simplify::{rules::attempt, step::Step},
    step_collector::StepCollector,
};
use tracing::debug;

/// Returns the node as a value, if it is a real number or boolean literal.
fn literal(arena: &ExprArena, id: ExprId) -> Option<Value> {
    match arena.get(id) {
        Expr::Number(n) => Some(Value::Number(*n)),
        Expr::Boolean(b) => Some(Value::Boolean(*b)),
        _ => None,
    }
}

/// Inserts the value as a literal, if it can be represented exactly as one.
fn insert_literal(arena: &mut ExprArena, value: Value) -> Option<ExprId> {
    match value {
        Value::Number(n) if n.is_finite() => Some(arena.num(n)),
        Value::Boolean(b) => Some(arena.boolean(b)),
        _ => None,
    }
}

/// `2+3 = 5`
/// `2^3 = 8`
/// `1 < 2 = true`
///
/// Division is only folded when the quotient is an integer, so that fractions such as `1/3` stay
/// exact. Logarithms and roots have rules of their own. Operations that fail, such as `5 % 0`,
/// are left for evaluation to report.
pub fn fold_binary(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    let opt = attempt(arena, id, |arena| {
        let Expr::Binary(op, lhs, rhs) = *arena.get(id) else {
            return None;
        };
        if matches!(op, BinaryOp::Log | BinaryOp::Root) {
            return None;
        }

        let (lhs, rhs) = (literal(arena, lhs)?, literal(arena, rhs)?);
        if op == BinaryOp::Div {
            match (lhs.as_number(), rhs.as_number()) {
                (Some(a), Some(b)) if b != 0.0 && (a / b).fract() == 0.0 => (),
                _ => return None,
            }
        }

        let value = apply_binary(op, lhs, rhs).ok()?;
        insert_literal(arena, value)
    })?;

    debug!(rule = "fold_binary", "folded literal operands");
    step_collector.push(Step::FoldConstants);
    Some(opt)
}

/// `not true = false`
pub fn fold_not(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    let opt = attempt(arena, id, |arena| {
        let Expr::Unary(UnaryOp::Not, operand) = *arena.get(id) else {
            return None;
        };
        let value = apply_unary(UnaryOp::Not, literal(arena, operand)?, TrigMode::default()).ok()?;
        insert_literal(arena, value)
    })?;

    debug!(rule = "fold_not", "folded logical negation");
    step_collector.push(Step::FoldConstants);
    Some(opt)
}

/// Applies all folding rules.
pub fn all(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    fold_binary(arena, id, step_collector)
        .or_else(|| fold_not(arena, id, step_collector))
}
