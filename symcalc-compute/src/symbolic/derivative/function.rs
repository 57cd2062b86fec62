//! Closed-form derivatives of the builtin functions of one argument.
//!
//! Each entry gives the derivative of `f(u)` with respect to `u`. The
//! [`Differentiator`](super::Differentiator) multiplies it by the derivative of `u` to apply the
//! chain rule. Angles are in radians.

use crate::symbolic::expr::{op::UnaryOp, ExprArena, ExprId};

/// The derivative of a function with respect to its argument.
#[derive(Debug, Clone, Copy)]
pub(super) enum Outer {
    /// `f'(u) = g`
    Times(ExprId),

    /// `f'(u) = 1 / den`, or `-1 / den` if `negate` is set
    Over { den: ExprId, negate: bool },
}

impl Outer {
    /// Applies the chain rule, given the derivative `du` of the argument.
    pub(super) fn apply(self, arena: &mut ExprArena, du: ExprId) -> ExprId {
        match self {
            Outer::Times(g) => arena.mul(du, g),
            Outer::Over { den, negate } => {
                let num = if negate { arena.neg(du) } else { du };
                arena.div(num, den)
            },
        }
    }
}

/// `u^2`
fn square(arena: &mut ExprArena, u: ExprId) -> ExprId {
    let two = arena.num(2.0);
    arena.pow(u, two)
}

/// `sqrt(lhs - rhs)`
fn sqrt_of(arena: &mut ExprArena, lhs: ExprId, rhs: ExprId) -> ExprId {
    let diff = arena.sub(lhs, rhs);
    arena.call(UnaryOp::Sqrt, diff)
}

/// `sqrt(lhs + rhs)`
fn sqrt_of_sum(arena: &mut ExprArena, lhs: ExprId, rhs: ExprId) -> ExprId {
    let sum = arena.add(lhs, rhs);
    arena.call(UnaryOp::Sqrt, sum)
}

/// `|u| * sqrt(1 + u^2)` if `plus_one` is set, `|u| * sqrt(u^2 - 1)` otherwise
fn abs_times_sqrt(arena: &mut ExprArena, u: ExprId, plus_one: bool) -> ExprId {
    let abs = arena.call(UnaryOp::Abs, u);
    let u2 = square(arena, u);
    let one = arena.num(1.0);
    let inner = if plus_one { arena.add(one, u2) } else { arena.sub(u2, one) };
    let root = arena.call(UnaryOp::Sqrt, inner);
    arena.mul(abs, root)
}

/// `f(u) * g(u)`
fn call_product(arena: &mut ExprArena, f: UnaryOp, g: UnaryOp, u: ExprId) -> ExprId {
    let f = arena.call(f, u);
    let g = arena.call(g, u);
    arena.mul(f, g)
}

/// `f(u)^2`
fn call_squared(arena: &mut ExprArena, f: UnaryOp, u: ExprId) -> ExprId {
    let f = arena.call(f, u);
    square(arena, f)
}

/// Returns the derivative of `op(u)` with respect to `u`, or [`None`] if the operator has no
/// entry in the table.
pub(super) fn outer_derivative(arena: &mut ExprArena, op: UnaryOp, u: ExprId) -> Option<Outer> {
    use UnaryOp::*;

    let times = |g| Some(Outer::Times(g));
    let over = |den| Some(Outer::Over { den, negate: false });
    let neg_over = |den| Some(Outer::Over { den, negate: true });

    match op {
        Abs => times(arena.call(Sign, u)),
        Exp => times(arena.call(Exp, u)),
        Ln => over(u),
        Lg | Lb => {
            let base = arena.num(if op == Lg { 10.0 } else { 2.0 });
            let ln_base = arena.call(Ln, base);
            over(arena.mul(u, ln_base))
        },

        Sin => times(arena.call(Cos, u)),
        Cos => {
            let sin = arena.call(Sin, u);
            times(arena.neg(sin))
        },
        Tan => times(call_squared(arena, Sec, u)),
        Cot => {
            let csc2 = call_squared(arena, Csc, u);
            times(arena.neg(csc2))
        },
        Sec => times(call_product(arena, Sec, Tan, u)),
        Csc => {
            let product = call_product(arena, Csc, Cot, u);
            times(arena.neg(product))
        },

        Arcsin | Arccos => {
            let one = arena.num(1.0);
            let u2 = square(arena, u);
            let den = sqrt_of(arena, one, u2);
            if op == Arcsin { over(den) } else { neg_over(den) }
        },
        Arctan | Arccot => {
            let one = arena.num(1.0);
            let u2 = square(arena, u);
            let den = arena.add(one, u2);
            if op == Arctan { over(den) } else { neg_over(den) }
        },
        Arcsec => over(abs_times_sqrt(arena, u, false)),
        Arccsc => neg_over(abs_times_sqrt(arena, u, false)),

        Sinh => times(arena.call(Cosh, u)),
        Cosh => times(arena.call(Sinh, u)),
        Tanh => times(call_squared(arena, Sech, u)),
        Coth => {
            let csch2 = call_squared(arena, Csch, u);
            times(arena.neg(csch2))
        },
        Sech => {
            let product = call_product(arena, Sech, Tanh, u);
            times(arena.neg(product))
        },
        Csch => {
            let product = call_product(arena, Csch, Coth, u);
            times(arena.neg(product))
        },

        Arsinh => {
            let u2 = square(arena, u);
            let one = arena.num(1.0);
            over(sqrt_of_sum(arena, u2, one))
        },
        Arcosh => {
            let u2 = square(arena, u);
            let one = arena.num(1.0);
            over(sqrt_of(arena, u2, one))
        },
        Artanh | Arcoth => {
            let one = arena.num(1.0);
            let u2 = square(arena, u);
            over(arena.sub(one, u2))
        },
        Arsech => {
            let one = arena.num(1.0);
            let u2 = square(arena, u);
            let root = sqrt_of(arena, one, u2);
            neg_over(arena.mul(u, root))
        },
        Arcsch => neg_over(abs_times_sqrt(arena, u, true)),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_functions_have_no_entry() {
        let mut arena = ExprArena::new();
        let x = arena.var("x");
        for op in [UnaryOp::Neg, UnaryOp::Factorial, UnaryOp::Sign, UnaryOp::Sqrt, UnaryOp::Det] {
            assert!(outer_derivative(&mut arena, op, x).is_none(), "{:?} has an entry", op);
        }
    }

    #[test]
    fn every_function_of_one_variable_has_an_entry() {
        let mut arena = ExprArena::new();
        let x = arena.var("x");
        for op in [
            UnaryOp::Sin, UnaryOp::Cos, UnaryOp::Tan, UnaryOp::Cot, UnaryOp::Sec, UnaryOp::Csc,
            UnaryOp::Arcsin, UnaryOp::Arccos, UnaryOp::Arctan, UnaryOp::Arccot, UnaryOp::Arcsec,
            UnaryOp::Arccsc, UnaryOp::Sinh, UnaryOp::Cosh, UnaryOp::Tanh, UnaryOp::Coth,
            UnaryOp::Sech, UnaryOp::Csch, UnaryOp::Arsinh, UnaryOp::Arcosh, UnaryOp::Artanh,
            UnaryOp::Arcoth, UnaryOp::Arsech, UnaryOp::Arcsch, UnaryOp::Exp, UnaryOp::Ln,
            UnaryOp::Lg, UnaryOp::Lb, UnaryOp::Abs,
        ] {
            assert!(outer_derivative(&mut arena, op, x).is_some(), "{:?} has no entry", op);
        }
    }
}
