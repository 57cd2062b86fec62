//! Simplification rules for sums and differences, including combining like terms.
//!
//! A chain of `+`, `-` and negations is treated as one flat sum of signed terms. The rule folds
//! the numeric terms into one constant, adds up the coefficients of terms that differ only in
//! their coefficient, and rebuilds the sum in a canonical shape:
//!
//! - the first term with a positive coefficient leads, the other terms keep their order,
//! - terms with negative coefficients are subtracted instead of added,
//! - the constant comes last, unless no other term is positive.

use crate::symbolic::{
    expr::{op::{BinaryOp, UnaryOp}, Expr, ExprArena, ExprId},
    simplify::{rules::{attempt, product}, step::Step},
    step_collector::StepCollector,
};
use num_complex::Complex64;
use tracing::debug;

/// A term of a sum, `coeff * factors[0] * factors[1] * ...`.
#[derive(Debug)]
struct Term {
    coeff: f64,
    factors: Vec<ExprId>,
}

/// The flattened sum.
#[derive(Debug, Default)]
struct Sum {
    constant: Complex64,
    terms: Vec<Term>,

    /// Number of literal terms found.
    literals: usize,

    /// Number of terms merged into an earlier term.
    merged: usize,
}

/// Splits a product into its numeric coefficient and the remaining factors. Products lean left,
/// with the coefficient (if any) as the leftmost factor.
///
/// - `x` -> `(1, [x])`
/// - `3 * x * y` -> `(3, [x, y])`
/// - `x * 3` -> `(1, [x, 3])`
fn split_coefficient(arena: &ExprArena, id: ExprId) -> (f64, Vec<ExprId>) {
    let mut factors = Vec::new();
    let mut current = id;
    while let Expr::Binary(BinaryOp::Mul, lhs, rhs) = arena.get(current) {
        factors.push(*rhs);
        current = *lhs;
    }

    let coeff = match arena.get(current) {
        Expr::Number(n) if !factors.is_empty() => *n,
        _ => {
            factors.push(current);
            1.0
        },
    };
    factors.reverse();
    (coeff, factors)
}

impl Sum {
    /// Adds the node to the sum, with the given sign.
    fn flatten(&mut self, arena: &ExprArena, id: ExprId, sign: f64) {
        match arena.get(id) {
            Expr::Binary(BinaryOp::Add, lhs, rhs) => {
                self.flatten(arena, *lhs, sign);
                self.flatten(arena, *rhs, sign);
            },
            Expr::Binary(BinaryOp::Sub, lhs, rhs) => {
                self.flatten(arena, *lhs, sign);
                self.flatten(arena, *rhs, -sign);
            },
            Expr::Unary(UnaryOp::Neg, operand) => self.flatten(arena, *operand, -sign),
            Expr::Number(n) => {
                self.constant += sign * *n;
                self.literals += 1;
            },
            Expr::Complex(z) => {
                self.constant += sign * *z;
                self.literals += 1;
            },
            _ => {
                let (coeff, factors) = split_coefficient(arena, id);
                let like_term = self.terms.iter_mut().find(|term| {
                    term.factors.len() == factors.len()
                        && term.factors.iter().zip(&factors).all(|(&a, &b)| arena.eq_at(a, b))
                });
                match like_term {
                    Some(term) => {
                        term.coeff += sign * coeff;
                        self.merged += 1;
                    },
                    None => self.terms.push(Term { coeff: sign * coeff, factors }),
                }
            },
        }
    }

    /// Builds `|coeff| * factors`.
    fn magnitude(arena: &mut ExprArena, term: &Term) -> ExprId {
        if term.coeff.abs() == 1.0 {
            product(arena, &term.factors)
        } else {
            let coeff = arena.num(term.coeff.abs());
            let mut factors = vec![coeff];
            factors.extend_from_slice(&term.factors);
            product(arena, &factors)
        }
    }

    /// Builds the term with its sign, for when it leads the sum.
    fn signed(arena: &mut ExprArena, term: &Term) -> ExprId {
        if term.coeff == -1.0 {
            let magnitude = product(arena, &term.factors);
            arena.neg(magnitude)
        } else if term.coeff < 0.0 {
            let coeff = arena.num(term.coeff);
            let mut factors = vec![coeff];
            factors.extend_from_slice(&term.factors);
            product(arena, &factors)
        } else {
            Self::magnitude(arena, term)
        }
    }

    /// Inserts the constant as a literal.
    fn literal(arena: &mut ExprArena, value: Complex64) -> ExprId {
        if value.im == 0.0 {
            arena.num(value.re)
        } else {
            arena.complex(value)
        }
    }

    /// Rebuilds the sum in canonical form.
    fn build(self, arena: &mut ExprArena) -> ExprId {
        let mut terms = self.terms.into_iter()
            .filter(|term| term.coeff != 0.0)
            .collect::<Vec<_>>();
        if let Some(lead) = terms.iter().position(|term| term.coeff > 0.0) {
            let term = terms.remove(lead);
            terms.insert(0, term);
        }

        let constant = self.constant;
        let constant_is_zero = constant == Complex64::new(0.0, 0.0);
        let constant_is_negative = constant.im == 0.0 && constant.re < 0.0;

        let mut acc = None;
        let constant_leads = !constant_is_zero
            && !constant_is_negative
            && terms.first().map_or(true, |term| term.coeff < 0.0);
        if constant_leads {
            acc = Some(Self::literal(arena, constant));
        }

        for term in &terms {
            acc = Some(match acc {
                None => Self::signed(arena, term),
                Some(acc) => {
                    let magnitude = Self::magnitude(arena, term);
                    if term.coeff > 0.0 {
                        arena.add(acc, magnitude)
                    } else {
                        arena.sub(acc, magnitude)
                    }
                },
            });
        }

        if constant_leads || constant_is_zero {
            return acc.unwrap_or_else(|| arena.num(0.0));
        }
        match acc {
            Some(acc) if constant_is_negative => {
                let magnitude = arena.num(-constant.re);
                arena.sub(acc, magnitude)
            },
            Some(acc) => {
                let constant = Self::literal(arena, constant);
                arena.add(acc, constant)
            },
            None => Self::literal(arena, constant),
        }
    }
}

/// Combines like terms and folds constants in a sum.
///
/// `a+0 = a`
/// `2a+3a = 5a`
/// `a-a = 0`
/// `a+(-b) = a-b`
/// `1+a+2 = a+3`
pub fn combine_terms(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    if !matches!(arena.get(id), Expr::Binary(BinaryOp::Add | BinaryOp::Sub, _, _)) {
        return None;
    }

    let mut sum = Sum::default();
    sum.flatten(arena, id, 1.0);
    let step = if sum.merged > 0 {
        Step::CombineLikeTerms
    } else if sum.literals > 1 {
        Step::FoldConstants
    } else if sum.literals == 1 && sum.constant == Complex64::new(0.0, 0.0) {
        Step::AddZero
    } else {
        Step::NormalizeSign
    };

    let opt = attempt(arena, id, |arena| Some(sum.build(arena)))?;

    debug!(rule = "combine_terms", ?step, "rewrote sum");
    step_collector.push(step);
    Some(opt)
}

/// Applies all addition rules.
pub fn all(arena: &mut ExprArena, id: ExprId, step_collector: &mut dyn StepCollector<Step>) -> Option<ExprId> {
    combine_terms(arena, id, step_collector)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn combine(src: &str) -> String {
        let mut arena = ExprArena::new();
        let id = arena.parse(src).unwrap();
        let id = combine_terms(&mut arena, id, &mut ()).unwrap_or(id);
        arena.node(id).to_string()
    }

    #[test]
    fn like_terms() {
        assert_eq!(combine("2x + 3x"), "5 * x");
        assert_eq!(combine("x + x"), "2 * x");
        assert_eq!(combine("x - x"), "0");
        assert_eq!(combine("3x - 4x"), "-x");
        assert_eq!(combine("x * y + 2 * x * y"), "3 * x * y");
    }

    #[test]
    fn constants_and_signs() {
        assert_eq!(combine("x + 0"), "x");
        assert_eq!(combine("0 + x"), "x");
        assert_eq!(combine("0 - x"), "-x");
        assert_eq!(combine("1 + x + 2"), "x + 3");
        assert_eq!(combine("5 - (2 + x)"), "3 - x");
        assert_eq!(combine("x + -y"), "x - y");
        assert_eq!(combine("-y + x"), "x - y");
        assert_eq!(combine("x - 3"), "x - 3");
    }

    #[test]
    fn canonical_sums_are_untouched() {
        let mut arena = ExprArena::new();
        let id = arena.parse("x - 2 * y + 3").unwrap();
        let len = arena.len();
        let mut steps = Vec::new();
        assert_eq!(combine_terms(&mut arena, id, &mut steps), None);
        assert_eq!(arena.len(), len);
        assert!(steps.is_empty());
    }
}
