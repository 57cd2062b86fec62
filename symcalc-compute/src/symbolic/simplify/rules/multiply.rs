//! Simplification rules for products and quotients.
//!
//! A chain of `*`, `/` and negations is treated as one flat product of powers. The numeric
//! factors collapse into a single fraction in lowest terms, and factors with the same base have
//! their exponents added, so that `x * x = x^2` and `x^3 / x = x^2`. The product is then rebuilt
//! as `coefficient * factors / (denominator * factors)`.

use crate::symbolic::{
    expr::{op::{BinaryOp, NaryOp, UnaryOp}, Expr, ExprArena, ExprId},
    simplify::{rules::{attempt, product}, step::Step},
    step_collector::StepCollector,
};
use tracing::debug;

/// The flattened product.
#[derive(Debug)]
struct Product {
    num: f64,
    den: f64,

    /// Each distinct base with its total exponent.
    factors: Vec<(ExprId, f64)>,

    /// Number of literals found in the numerator and denominator.
    num_literals: usize,
    den_literals: usize,

    /// Number of literal `1`s found in the numerator and denominator.
    num_ones: usize,
    den_ones: usize,

    negations: usize,
    merged: usize,

    /// True if a base appeared in both the numerator and the denominator.
    cancelled: bool,

    /// True if a factor is a vector or matrix, whose multiplication does not commute.
    non_commutative: bool,
}

impl Default for Product {
    fn default() -> Self {
        Self {
            num: 1.0,
            den: 1.0,
            factors: Vec::new(),
            num_literals: 0,
            den_literals: 0,
            num_ones: 0,
            den_ones: 0,
            negations: 0,
            merged: 0,
            cancelled: false,
            non_commutative: false,
        }
    }
}

/// Greatest common divisor of two non-negative integers stored as floats.
fn gcd(mut a: f64, mut b: f64) -> f64 {
    while b != 0.0 {
        (a, b) = (b, a % b);
    }
    a
}

impl Product {
    /// Adds the node to the product, in the numerator if `sign` is `1` or the denominator if it
    /// is `-1`.
    fn flatten(&mut self, arena: &ExprArena, id: ExprId, sign: f64) {
        match arena.get(id) {
            Expr::Binary(BinaryOp::Mul, lhs, rhs) => {
                self.flatten(arena, *lhs, sign);
                self.flatten(arena, *rhs, sign);
            },
            Expr::Binary(BinaryOp::Div, lhs, rhs) => {
                self.flatten(arena, *lhs, sign);
                self.flatten(arena, *rhs, -sign);
            },
            Expr::Unary(UnaryOp::Neg, operand) => {
                self.num = -self.num;
                self.negations += 1;
                self.flatten(arena, *operand, sign);
            },
            Expr::Number(n) if sign > 0.0 => {
                self.num *= n;
                self.num_literals += 1;
                self.num_ones += (*n == 1.0) as usize;
            },
            Expr::Number(n) => {
                self.den *= n;
                self.den_literals += 1;
                self.den_ones += (*n == 1.0) as usize;
            },
            Expr::Binary(BinaryOp::Pow, base, exp) => match arena.as_number(*exp) {
                Some(exp) => self.push(arena, *base, sign * exp),
                None => self.push(arena, id, sign),
            },
            Expr::Nary(NaryOp::Vector | NaryOp::Matrix { .. }, _) => {
                self.non_commutative = true;
            },
            _ => self.push(arena, id, sign),
        }
    }

    /// Multiplies the product by `base^exp`.
    fn push(&mut self, arena: &ExprArena, base: ExprId, exp: f64) {
        let existing = self.factors.iter_mut().find(|(other, _)| arena.eq_at(*other, base));
        match existing {
            Some((_, total)) => {
                if total.signum() != exp.signum() {
                    self.cancelled = true;
                }
                *total += exp;
                self.merged += 1;
            },
            None => self.factors.push((base, exp)),
        }
    }

    /// Brings the numeric fraction to lowest terms, with a positive denominator.
    fn reduce_constants(&mut self) {
        if self.den < 0.0 {
            self.num = -self.num;
            self.den = -self.den;
        }

        let quotient = self.num / self.den;
        if quotient.fract() == 0.0 {
            self.num = quotient;
            self.den = 1.0;
        } else if self.num.fract() == 0.0 && self.den.fract() == 0.0 {
            let divisor = gcd(self.num.abs(), self.den);
            self.num /= divisor;
            self.den /= divisor;
        } else {
            self.num = quotient;
            self.den = 1.0;
        }
    }

    /// Builds `base^exp`, where `exp` is positive.
    fn power(arena: &mut ExprArena, base: ExprId, exp: f64) -> ExprId {
        if exp == 1.0 {
            base
        } else {
            let exp = arena.num(exp);
            arena.pow(base, exp)
        }
    }

    /// Rebuilds the product in canonical form.
    fn build(mut self, arena: &mut ExprArena) -> ExprId {
        if self.num == 0.0 {
            return arena.num(0.0);
        }
        self.reduce_constants();

        let mut numerator = Vec::new();
        let mut denominator = Vec::new();
        let has_num_factors = self.factors.iter().any(|(_, exp)| *exp > 0.0);
        let negate = self.num == -1.0 && has_num_factors;
        if self.num != 1.0 && !negate {
            numerator.push(arena.num(self.num));
        }
        if self.den != 1.0 {
            denominator.push(arena.num(self.den));
        }

        for &(base, exp) in &self.factors {
            if exp > 0.0 {
                numerator.push(Self::power(arena, base, exp));
            } else if exp < 0.0 {
                denominator.push(Self::power(arena, base, -exp));
            }
        }

        let numerator = if numerator.is_empty() {
            arena.num(if negate { -1.0 } else { 1.0 })
        } else {
            product(arena, &numerator)
        };
        let numerator = if negate { arena.neg(numerator) } else { numerator };

        if denominator.is_empty() {
            numerator
        } else {
            let denominator = product(arena, &denominator);
            arena.div(numerator, denominator)
        }
    }

    /// Returns the step describing the rewrite.
    fn step(&self) -> Step {
        if self.num == 0.0 {
            Step::MultiplyZero
        } else if self.cancelled || (self.den_literals > 0 && self.num_literals > 0) {
            Step::CancelFactors
        } else if self.merged > 0 {
            Step::CombineLikeFactors
        } else if self.num_literals + self.den_literals > 1 {
            Step::FoldConstants
        } else if self.num_ones > 0 {
            Step::MultiplyOne
        } else if self.den_ones > 0 {
            Step::DivideByOne
        } else if self.negations > 0 {
            Step::NormalizeSign
        } else {
            Step::MoveCoefficient
        }
    }
}

/// Collects constants and like factors in a product or quotient.
///
/// `a*0 = 0`
/// `a*1 = a`
/// `a/1 = a`
/// `a*a = a^2`
/// `a^3/a = a^2`
/// `2a/2 = a`
/// `a*(-b) = -(ab)`
pub fn combine_factors(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    if !matches!(arena.get(id), Expr::Binary(BinaryOp::Mul | BinaryOp::Div, _, _)) {
        return None;
    }

    let mut product = Product::default();
    product.flatten(arena, id, 1.0);
    if product.non_commutative
        || product.den == 0.0
        || !product.num.is_finite()
        || !product.den.is_finite()
    {
        return None;
    }

    let step = product.step();
    let opt = attempt(arena, id, |arena| Some(product.build(arena)))?;

    debug!(rule = "combine_factors", ?step, "rewrote product");
    step_collector.push(step);
    Some(opt)
}

/// Applies all multiplication and division rules.
pub fn all(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    combine_factors(arena, id, step_collector)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn combine(src: &str) -> String {
        let mut arena = ExprArena::new();
        let id = arena.parse(src).unwrap();
        let id = combine_factors(&mut arena, id, &mut ()).unwrap_or(id);
        arena.node(id).to_string()
    }

    #[test]
    fn identities() {
        assert_eq!(combine("0 * x"), "0");
        assert_eq!(combine("x * 0"), "0");
        assert_eq!(combine("0 / x"), "0");
        assert_eq!(combine("x * 1"), "x");
        assert_eq!(combine("x / 1"), "x");
        assert_eq!(combine("x / x"), "1");
    }

    #[test]
    fn like_factors() {
        assert_eq!(combine("x * x"), "x^2");
        assert_eq!(combine("x^3 / x"), "x^2");
        assert_eq!(combine("x * y * x^2"), "x^3 * y");
        assert_eq!(combine("x / y^2 * y"), "x / y");
    }

    #[test]
    fn coefficients() {
        assert_eq!(combine("2 * x * 3"), "6 * x");
        assert_eq!(combine("x * 2"), "2 * x");
        assert_eq!(combine("2x / 2"), "x");
        assert_eq!(combine("6x / 4"), "3 * x / 2");
        assert_eq!(combine("1 / (2 * x) * 2"), "1 / x");
        assert_eq!(combine("x * (-y)"), "-(x * y)");
        assert_eq!(combine("-2 * x"), "-2 * x");
    }

    #[test]
    fn matrices_are_left_alone() {
        assert_eq!(combine("[1, 2] * x * x"), "[1, 2] * x * x");
    }

    #[test]
    fn steps() {
        let mut arena = ExprArena::new();
        let id = arena.parse("x * x").unwrap();
        let mut steps = Vec::new();
        combine_factors(&mut arena, id, &mut steps).unwrap();
        assert_eq!(steps, vec![Step::CombineLikeFactors]);
    }
}
