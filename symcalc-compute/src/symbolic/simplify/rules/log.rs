//! Simplification rules for logarithms.

use crate::consts::E;
use crate::symbolic::{
    expr::{op::{BinaryOp, UnaryOp}, Expr, ExprArena, ExprId},
    simplify::{rules::as_binary, step::Step},
    step_collector::StepCollector,
};
use tracing::debug;

/// Returns true if the node is the base of the given logarithm function.
fn is_base_of(arena: &ExprArena, op: UnaryOp, id: ExprId) -> bool {
    match (op, arena.get(id)) {
        (UnaryOp::Ln, Expr::Variable(name)) => name == "e",
        (UnaryOp::Ln, Expr::Number(n)) => *n == E,
        (UnaryOp::Lg, Expr::Number(n)) => *n == 10.0,
        (UnaryOp::Lb, Expr::Number(n)) => *n == 2.0,
        _ => false,
    }
}

/// `log(a, a) = 1`
/// `ln(e) = 1`
/// `lg(10) = 1`
/// `lb(2) = 1`
pub fn log_self(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    let matches = match arena.get(id) {
        Expr::Binary(BinaryOp::Log, base, arg) => arena.eq_at(*base, *arg),
        Expr::Unary(op @ (UnaryOp::Ln | UnaryOp::Lg | UnaryOp::Lb), arg) => is_base_of(arena, *op, *arg),
        _ => false,
    };
    if !matches {
        return None;
    }
    let opt = arena.num(1.0);

    debug!(rule = "log_self", "replaced logarithm of its base with one");
    step_collector.push(Step::LogSelf);
    Some(opt)
}

/// `log(a, 1) = 0`
/// `ln(1) = 0`
pub fn log_one(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    let arg = match arena.get(id) {
        Expr::Unary(UnaryOp::Ln | UnaryOp::Lg | UnaryOp::Lb, arg) => *arg,
        _ => as_binary(arena, id, BinaryOp::Log)?.1,
    };
    if !arena.is_number(arg, 1.0) {
        return None;
    }
    let opt = arena.num(0.0);

    debug!(rule = "log_one", "replaced logarithm of one with zero");
    step_collector.push(Step::LogOne);
    Some(opt)
}

/// Applies all logarithm rules.
pub fn all(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    log_self(arena, id, step_collector)
        .or_else(|| log_one(arena, id, step_collector))
}
