//! Cancellation of a function applied to its own inverse.

use crate::symbolic::{
    expr::{Expr, ExprArena, ExprId},
    simplify::step::Step,
    step_collector::StepCollector,
};
use tracing::debug;

/// `f(g(a)) = a`, for each pair in [`INVERSE_PAIRS`](crate::symbolic::expr::op::INVERSE_PAIRS)
///
/// `sin(arcsin(a)) = a`
/// `exp(ln(a)) = a`
pub fn inverse_pair(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    let Expr::Unary(outer, inner) = arena.get(id) else {
        return None;
    };
    let Expr::Unary(inner_op, operand) = arena.get(*inner) else {
        return None;
    };
    if outer.inverse() != Some(*inner_op) {
        return None;
    }
    let opt = *operand;

    debug!(rule = "inverse_pair", ?outer, ?inner_op, "cancelled inverse functions");
    step_collector.push(Step::InversePair);
    Some(opt)
}

/// Applies all inverse function rules.
pub fn all(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    inverse_pair(arena, id, step_collector)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn reduce(src: &str) -> String {
        let mut arena = ExprArena::new();
        let id = arena.parse(src).unwrap();
        let id = all(&mut arena, id, &mut ()).unwrap_or(id);
        arena.node(id).to_string()
    }

    #[test]
    fn pairs() {
        assert_eq!(reduce("sin(arcsin(x))"), "x");
        assert_eq!(reduce("cosh(arcosh(x + 1))"), "x + 1");
        assert_eq!(reduce("exp(ln(x))"), "x");
        assert_eq!(reduce("ln(exp(x))"), "x");
    }

    #[test]
    fn only_exact_pairs_cancel() {
        assert_eq!(reduce("arcsin(sin(x))"), "arcsin(sin(x))");
        assert_eq!(reduce("sin(arccos(x))"), "sin(arccos(x))");
    }
}
