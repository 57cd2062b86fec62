//! Implementation of the simplification rules.
//!
//! Each rule in this module is a function that takes the id of the node to simplify, whose
//! children are already simplified, and returns `Some(id)` with the rewritten node if the rule
//! applies, or `None` if the rule does not apply. A rule that does not apply leaves the arena as
//! it found it.

pub mod add;
pub mod fold;
pub mod function;
pub mod inverse;
pub mod log;
pub mod multiply;
pub mod negate;
pub mod power;

use crate::symbolic::{
    expr::{op::{BinaryOp, UnaryOp}, Expr, ExprArena, ExprId},
    step_collector::StepCollector,
};
use super::step::Step;

/// Runs the transformation `f` on the node. If `f` gives up, or produces a tree structurally
/// equal to the node, every node `f` inserted is discarded.
///
/// Returns `Some(id)` with the transformed node if a transformation was applied.
pub(crate) fn attempt(
    arena: &mut ExprArena,
    id: ExprId,
    f: impl FnOnce(&mut ExprArena) -> Option<ExprId>,
) -> Option<ExprId> {
    let mark = arena.checkpoint();
    match f(arena) {
        Some(new_id) if !arena.eq_at(new_id, id) => Some(new_id),
        _ => {
            arena.rollback(mark);
            None
        },
    }
}

/// If the node applies the given binary operator, returns its operands.
pub(crate) fn as_binary(arena: &ExprArena, id: ExprId, op: BinaryOp) -> Option<(ExprId, ExprId)> {
    match arena.get(id) {
        Expr::Binary(node_op, lhs, rhs) if *node_op == op => Some((*lhs, *rhs)),
        _ => None,
    }
}

/// If the node applies the given unary operator, returns its operand.
pub(crate) fn as_unary(arena: &ExprArena, id: ExprId, op: UnaryOp) -> Option<ExprId> {
    match arena.get(id) {
        Expr::Unary(node_op, operand) if *node_op == op => Some(*operand),
        _ => None,
    }
}

/// Multiplies the factors together, from left to right. An empty product is `1`.
pub(crate) fn product(arena: &mut ExprArena, factors: &[ExprId]) -> ExprId {
    match factors.split_first() {
        Some((&first, rest)) => rest.iter().fold(first, |acc, &factor| arena.mul(acc, factor)),
        None => arena.num(1.0),
    }
}

/// Applies all rules.
pub fn all(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    fold::all(arena, id, step_collector)
        .or_else(|| negate::all(arena, id, step_collector))
        .or_else(|| add::all(arena, id, step_collector))
        .or_else(|| multiply::all(arena, id, step_collector))
        .or_else(|| power::all(arena, id, step_collector))
        .or_else(|| log::all(arena, id, step_collector))
        .or_else(|| inverse::all(arena, id, step_collector))
        .or_else(|| function::all(arena, id, step_collector))
}
