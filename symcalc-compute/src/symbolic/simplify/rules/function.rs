//! Evaluation of functions at points where the result is an exact number.

use crate::numerical::{eval::apply_unary, trig_mode::TrigMode, value::Value};
use crate::symbolic::{
    expr::{op::UnaryOp, Expr, ExprArena, ExprId},
    simplify::step::Step,
    step_collector::StepCollector,
};
use tracing::debug;

/// Returns the value of `op(x)` if it is known to be exact.
fn exact_value(op: UnaryOp, x: f64) -> Option<f64> {
    match op {
        UnaryOp::Abs | UnaryOp::Sign | UnaryOp::Round | UnaryOp::Floor | UnaryOp::Ceil => {
            apply_unary(op, Value::Number(x), TrigMode::default()).ok()?.as_number()
        },
        UnaryOp::Sqrt | UnaryOp::Cbrt => {
            let root = apply_unary(op, Value::Number(x), TrigMode::default())
                .ok()?
                .as_number()?
                .round();
            let degree = if op == UnaryOp::Sqrt { 2 } else { 3 };
            (root.powi(degree) == x).then_some(root)
        },
        // zero is zero in every angle unit
        UnaryOp::Sin | UnaryOp::Tan | UnaryOp::Sinh | UnaryOp::Tanh
            | UnaryOp::Arcsin | UnaryOp::Arctan if x == 0.0 => Some(0.0),
        UnaryOp::Cos | UnaryOp::Cosh | UnaryOp::Exp if x == 0.0 => Some(1.0),
        _ => None,
    }
}

/// `abs(-2) = 2`
/// `sqrt(9) = 3`
/// `cos(0) = 1`
/// `exp(0) = 1`
pub fn evaluate_function(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    let Expr::Unary(op, operand) = *arena.get(id) else {
        return None;
    };
    let value = exact_value(op, arena.as_number(operand)?)?;
    let opt = arena.num(value);

    debug!(rule = "evaluate_function", ?op, value, "evaluated function");
    step_collector.push(Step::EvaluateFunction);
    Some(opt)
}

/// Applies all function evaluation rules.
pub fn all(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    evaluate_function(arena, id, step_collector)
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
    fn exact_values() {
        assert_eq!(reduce("abs(3)"), "3");
        assert_eq!(reduce("sign(0)"), "0");
        assert_eq!(reduce("round(2.5)"), "3");
        assert_eq!(reduce("floor(2.5)"), "2");
        assert_eq!(reduce("ceil(2.5)"), "3");
        assert_eq!(reduce("sqrt(9)"), "3");
        assert_eq!(reduce("cbrt(27)"), "3");
        assert_eq!(reduce("sin(0)"), "0");
        assert_eq!(reduce("cos(0)"), "1");
        assert_eq!(reduce("tan(0)"), "0");
        assert_eq!(reduce("exp(0)"), "1");
    }

    #[test]
    fn inexact_values_are_kept() {
        assert_eq!(reduce("sqrt(2)"), "sqrt(2)");
        assert_eq!(reduce("sin(1)"), "sin(1)");
        assert_eq!(reduce("exp(1)"), "exp(1)");
        assert_eq!(reduce("sqrt(x)"), "sqrt(x)");
    }
}
