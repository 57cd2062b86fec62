//! Algebraic simplification of expressions.
//!
//! The [`Simplifier`] rewrites an expression bottom-up: the children of a node are simplified
//! first, then the [rules](rules) are tried on the node itself. Whenever a rule fires, the
//! rewritten node is simplified again, so that reductions cascade (`2 * (x + x)` becomes
//! `2 * (2 * x)`, then `4 * x`).
//!
//! The result is not guaranteed to be a unique normal form. The simplifier repeats whole passes
//! over the expression until a pass leaves it unchanged, bounded by
//! [`Simplifier::with_max_passes`].
//!
//! Division by a divisor that simplifies to the literal `0` fails with [`DivisionByZero`]. A
//! divisor that is merely unknown, such as `x`, is left as is.

pub mod rules;
pub mod step;

use crate::error::{DivisionByZero, RecursionLimitExceeded};
use crate::numerical::ctxt::MAX_RECURSION_DEPTH;
use crate::symbolic::{
    analyzer::Analyzer,
    expr::{op::{BinaryOp, NaryOp, UnaryOp}, ExprArena, ExprId},
    step_collector::StepCollector,
};
use num_complex::Complex64;
use symcalc_error::Error;
use tracing::trace;

pub use step::Step;

/// Default number of passes made over an expression.
pub const DEFAULT_MAX_PASSES: usize = 8;

/// Simplifies expressions, reporting each rule it applies to a [`StepCollector`].
///
/// The default collector, `()`, discards the steps.
#[derive(Debug, Clone)]
pub struct Simplifier<C: StepCollector<Step> = ()> {
    collector: C,
    max_depth: usize,
    max_passes: usize,

    /// Current recursion depth.
    depth: usize,
}

impl Default for Simplifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Simplifier {
    /// Creates a simplifier that discards its steps.
    pub fn new() -> Self {
        Self {
            collector: (),
            max_depth: MAX_RECURSION_DEPTH,
            max_passes: DEFAULT_MAX_PASSES,
            depth: 0,
        }
    }
}

impl<C: StepCollector<Step>> Simplifier<C> {
    /// Replaces the step collector.
    pub fn with_collector<D: StepCollector<Step>>(self, collector: D) -> Simplifier<D> {
        Simplifier {
            collector,
            max_depth: self.max_depth,
            max_passes: self.max_passes,
            depth: self.depth,
        }
    }

    /// Sets the maximum depth of the expressions the simplifier accepts. Deeper expressions fail
    /// with [`RecursionLimitExceeded`].
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the maximum number of passes made over an expression.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    /// Returns the step collector.
    pub fn collector(&self) -> &C {
        &self.collector
    }

    /// Consumes the simplifier, returning its step collector.
    pub fn into_collector(self) -> C {
        self.collector
    }

    /// Simplifies the expression, returning the id of the simplified expression. If nothing
    /// could be simplified, the given id is returned.
    pub fn simplify(&mut self, arena: &mut ExprArena, id: ExprId) -> Result<ExprId, Error> {
        let mut current = id;
        for pass in 0..self.max_passes {
            trace!(pass, "simplification pass");
            let next = self.visit(arena, current)?;
            if arena.eq_at(next, current) {
                return Ok(next);
            }
            current = next;
        }
        Ok(current)
    }

    /// Simplifies the node, guarding against runaway recursion.
    fn visit(&mut self, arena: &mut ExprArena, id: ExprId) -> Result<ExprId, Error> {
        if self.depth >= self.max_depth {
            return Err(arena.error_at(id, RecursionLimitExceeded { max_depth: self.max_depth }));
        }
        self.depth += 1;
        let result = arena.accept(id, self);
        self.depth -= 1;
        result
    }

    /// Applies the rules to a node whose children are simplified. If a rule fires, the new node
    /// is simplified in turn.
    fn reduce(&mut self, arena: &mut ExprArena, id: ExprId) -> Result<ExprId, Error> {
        match rules::all(arena, id, &mut self.collector) {
            Some(new_id) => self.visit(arena, new_id),
            None => Ok(id),
        }
    }
}

impl<C: StepCollector<Step>> Analyzer for Simplifier<C> {
    type Output = Result<ExprId, Error>;

    fn number(&mut self, _: &mut ExprArena, id: ExprId, _: f64) -> Self::Output {
        Ok(id)
    }

    fn variable(&mut self, _: &mut ExprArena, id: ExprId, _: &str) -> Self::Output {
        Ok(id)
    }

    fn boolean(&mut self, _: &mut ExprArena, id: ExprId, _: bool) -> Self::Output {
        Ok(id)
    }

    fn complex(&mut self, _: &mut ExprArena, id: ExprId, _: Complex64) -> Self::Output {
        Ok(id)
    }

    fn unary(&mut self, arena: &mut ExprArena, id: ExprId, op: UnaryOp, operand: ExprId) -> Self::Output {
        let new_operand = self.visit(arena, operand)?;
        let node = if new_operand == operand {
            id
        } else {
            arena.mk_unary(op, new_operand)
        };
        self.reduce(arena, node)
    }

    fn binary(&mut self, arena: &mut ExprArena, id: ExprId, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> Self::Output {
        let new_lhs = self.visit(arena, lhs)?;
        let new_rhs = self.visit(arena, rhs)?;
        if op == BinaryOp::Div && arena.is_number(new_rhs, 0.0) {
            return Err(arena.error_at(rhs, DivisionByZero));
        }

        let node = if new_lhs == lhs && new_rhs == rhs {
            id
        } else {
            arena.mk_binary(op, new_lhs, new_rhs)
        };
        self.reduce(arena, node)
    }

    fn nary(&mut self, arena: &mut ExprArena, id: ExprId, op: &NaryOp, args: &[ExprId]) -> Self::Output {
        let new_args = args.iter()
            .map(|&arg| self.visit(arena, arg))
            .collect::<Result<Vec<_>, _>>()?;
        if new_args == args {
            Ok(id)
        } else {
            Ok(arena.mk_nary(op.clone(), new_args))
        }
    }
}

/// Simplifies the expression, discarding the steps taken.
pub fn simplify(arena: &mut ExprArena, id: ExprId) -> Result<ExprId, Error> {
    Simplifier::new().simplify(arena, id)
}

/// Simplifies the expression, returning the steps taken in the order they were applied.
pub fn simplify_with_steps(arena: &mut ExprArena, id: ExprId) -> Result<(ExprId, Vec<Step>), Error> {
    let mut simplifier = Simplifier::new().with_collector(Vec::new());
    let id = simplifier.simplify(arena, id)?;
    Ok((id, simplifier.into_collector()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn simplified(src: &str) -> String {
        let mut arena = ExprArena::new();
        let id = arena.parse(src).unwrap();
        let id = simplify(&mut arena, id).unwrap();
        arena.node(id).to_string()
    }

    #[test]
    fn closed_forms() {
        assert_eq!(simplified("x + 0"), "x");
        assert_eq!(simplified("0 * x"), "0");
        assert_eq!(simplified("(2*x) + (3*x)"), "5 * x");
        assert_eq!(simplified("2 + 3"), "5");
        assert_eq!(simplified("0 / x"), "0");
    }

    #[test]
    fn cascading_rules() {
        assert_eq!(simplified("2 * (x + x)"), "4 * x");
        assert_eq!(simplified("x * x * x"), "x^3");
        assert_eq!(simplified("x - x + y"), "y");
        assert_eq!(simplified("(x + 1)^1 * 1"), "x + 1");
        assert_eq!(simplified("sin(arcsin(x + 0))"), "x");
        assert_eq!(simplified("ln(e^1)"), "1");
        assert_eq!(simplified("-(-x)"), "x");
        assert_eq!(simplified("x / 2 + x / 2"), "x");
        assert_eq!(simplified("[x + 0, 2 * 3]"), "[x, 6]");
    }

    #[test]
    fn idempotent() {
        for src in [
            "x + 0",
            "2x + 3x - y",
            "x^3 / x * 2",
            "6x / 4 + 1",
            "sin(x)^2 + cos(x)^2",
            "-(x * y) + 3",
            "(x + 1) / (x - 1)",
            "ln(2 * x) * exp(0)",
        ] {
            let mut arena = ExprArena::new();
            let id = arena.parse(src).unwrap();
            let once = simplify(&mut arena, id).unwrap();
            let twice = simplify(&mut arena, once).unwrap();
            assert!(arena.eq_at(once, twice), "{} is not idempotent", src);
        }
    }

    #[test]
    fn division_by_zero() {
        let mut arena = ExprArena::new();
        let id = arena.parse("x / 0").unwrap();
        let err = simplify(&mut arena, id).unwrap_err();
        assert!(err.is::<DivisionByZero>());
        assert_eq!(err.spans, vec![4..5]);

        let id = arena.parse("x / (1 - 1)").unwrap();
        assert!(simplify(&mut arena, id).unwrap_err().is::<DivisionByZero>());
    }

    #[test]
    fn unknown_divisors_are_kept() {
        assert_eq!(simplified("1 / x"), "1 / x");
        assert_eq!(simplified("x / (y - y + z)"), "x / z");
    }

    #[test]
    fn unchanged_expressions_keep_their_id() {
        let mut arena = ExprArena::new();
        let id = arena.parse("x * y + 1").unwrap();
        assert_eq!(simplify(&mut arena, id).unwrap(), id);
    }

    #[test]
    fn records_steps() {
        let mut arena = ExprArena::new();
        let id = arena.parse("x + 0").unwrap();
        let (id, steps) = simplify_with_steps(&mut arena, id).unwrap();
        assert_eq!(arena.node(id).to_string(), "x");
        assert_eq!(steps, vec![Step::AddZero]);

        let id = arena.parse("2 * (x + x)").unwrap();
        let (_, steps) = simplify_with_steps(&mut arena, id).unwrap();
        assert_eq!(steps, vec![Step::CombineLikeTerms, Step::FoldConstants]);
    }

    #[test]
    fn recursion_limit() {
        let mut arena = ExprArena::new();
        let id = arena.parse("x + 1 + 1 + 1 + 1").unwrap();
        let err = Simplifier::new().with_max_depth(3).simplify(&mut arena, id).unwrap_err();
        assert!(err.is::<RecursionLimitExceeded>());
    }
}
