//! Simplification rules for powers and roots.

use crate::numerical::{eval::apply_binary, value::Value};
use crate::symbolic::{
    expr::{op::BinaryOp, ExprArena, ExprId},
    simplify::{rules::{as_binary, attempt}, step::Step},
    step_collector::StepCollector,
};
use tracing::debug;

/// `a^0 = 1`
pub fn power_zero(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    let (_, exp) = as_binary(arena, id, BinaryOp::Pow)?;
    if !arena.is_number(exp, 0.0) {
        return None;
    }
    let opt = arena.num(1.0);

    debug!(rule = "power_zero", "replaced power of zero with one");
    step_collector.push(Step::PowerZero);
    Some(opt)
}

/// `a^1 = a`
pub fn power_one(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    let (base, exp) = as_binary(arena, id, BinaryOp::Pow)?;
    if !arena.is_number(exp, 1.0) {
        return None;
    }

    debug!(rule = "power_one", "removed power of one");
    step_collector.push(Step::PowerOne);
    Some(base)
}

/// `1^a = 1`
pub fn one_to_power(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    let (base, _) = as_binary(arena, id, BinaryOp::Pow)?;
    if !arena.is_number(base, 1.0) {
        return None;
    }

    debug!(rule = "one_to_power", "replaced one to a power with one");
    step_collector.push(Step::OneToPower);
    Some(base)
}

/// `0^n = 0`, for a positive number `n`
pub fn zero_to_power(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    let (base, exp) = as_binary(arena, id, BinaryOp::Pow)?;
    if !arena.is_number(base, 0.0) || arena.as_number(exp)? <= 0.0 {
        return None;
    }

    debug!(rule = "zero_to_power", "replaced zero to a power with zero");
    step_collector.push(Step::ZeroToPower);
    Some(base)
}

/// `(a^m)^n = a^(m*n)`, for numbers `m` and an integer `n`
pub fn power_of_power(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    let opt = attempt(arena, id, |arena| {
        let (inner, outer_exp) = as_binary(arena, id, BinaryOp::Pow)?;
        let (base, inner_exp) = as_binary(arena, inner, BinaryOp::Pow)?;
        let n = arena.as_number(outer_exp)?;
        if n.fract() != 0.0 {
            return None;
        }
        let m = arena.as_number(inner_exp)?;
        let exp = arena.num(m * n);
        Some(arena.pow(base, exp))
    })?;

    debug!(rule = "power_of_power", "multiplied exponents");
    step_collector.push(Step::PowerOfPower);
    Some(opt)
}

/// `root(a, 1) = a`
pub fn root_one(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    let (radicand, index) = as_binary(arena, id, BinaryOp::Root)?;
    if !arena.is_number(index, 1.0) {
        return None;
    }

    debug!(rule = "root_one", "removed first root");
    step_collector.push(Step::RootOne);
    Some(radicand)
}

/// `root(8, 3) = 2`, when the root is an integer
pub fn exact_root(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    let (radicand, index) = as_binary(arena, id, BinaryOp::Root)?;
    let (x, n) = (arena.as_number(radicand)?, arena.as_number(index)?);
    let root = apply_binary(BinaryOp::Root, Value::Number(x), Value::Number(n))
        .ok()?
        .as_number()?
        .round();
    if root.powf(n) != x {
        return None;
    }
    let opt = arena.num(root);

    debug!(rule = "exact_root", "evaluated exact root");
    step_collector.push(Step::EvaluateFunction);
    Some(opt)
}

/// Applies all power and root rules.
pub fn all(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    power_zero(arena, id, step_collector)
        .or_else(|| power_one(arena, id, step_collector))
        .or_else(|| one_to_power(arena, id, step_collector))
        .or_else(|| zero_to_power(arena, id, step_collector))
        .or_else(|| power_of_power(arena, id, step_collector))
        .or_else(|| root_one(arena, id, step_collector))
        .or_else(|| exact_root(arena, id, step_collector))
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
    fn powers() {
        assert_eq!(reduce("x^0"), "1");
        assert_eq!(reduce("x^1"), "x");
        assert_eq!(reduce("1^x"), "1");
        assert_eq!(reduce("0^x"), "0^x");
        assert_eq!(reduce("(x^2)^3"), "x^6");
        assert_eq!(reduce("(x^2)^0.5"), "(x^2)^0.5");
    }

    #[test]
    fn roots() {
        assert_eq!(reduce("root(x, 1)"), "x");
        assert_eq!(reduce("root(8, 3)"), "2");
        assert_eq!(reduce("root(27, 3)"), "3");
        assert_eq!(reduce("root(2, 2)"), "root(2, 2)");
    }

    #[test]
    fn zero_base() {
        let mut arena = ExprArena::new();
        let zero = arena.num(0.0);
        let exp = arena.num(2.5);
        let id = arena.pow(zero, exp);
        let mut steps = Vec::new();
        assert_eq!(zero_to_power(&mut arena, id, &mut steps), Some(zero));
        assert_eq!(steps, vec![Step::ZeroToPower]);
    }
}
