use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rule applied by the [`Simplifier`](super::Simplifier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Step {
    /// Operations between literals were computed, e.g. `2 + 3 = 5`.
    FoldConstants,

    /// `a+0 = a`
    AddZero,

    /// `2a+3a = 5a`
    CombineLikeTerms,

    /// The terms of a sum were reordered or a negated term was turned into a subtraction, e.g.
    /// `a + (-b) = a - b`.
    NormalizeSign,

    /// `a*0 = 0`
    MultiplyZero,

    /// `a*1 = a`
    MultiplyOne,

    /// `a*a = a^2`
    CombineLikeFactors,

    /// `2a/2 = a`, `a/a = 1`
    CancelFactors,

    /// `a/1 = a`
    DivideByOne,

    /// `a*2 = 2a`
    MoveCoefficient,

    /// `a^0 = 1`
    PowerZero,

    /// `a^1 = a`
    PowerOne,

    /// `1^a = 1`
    OneToPower,

    /// `0^a = 0`
    ZeroToPower,

    /// `(a^m)^n = a^(m*n)`
    PowerOfPower,

    /// `root(a, 1) = a`
    RootOne,

    /// `log(a, a) = 1`, `ln(e) = 1`
    LogSelf,

    /// `log(a, 1) = 0`
    LogOne,

    /// `--a = a`
    DoubleNegation,

    /// `-(2) = -2`
    NegateNumber,

    /// `sin(arcsin(a)) = a`
    InversePair,

    /// A function was evaluated at a point where its value is exact, e.g. `cos(0) = 1`.
    EvaluateFunction,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            Step::FoldConstants => "fold constants",
            Step::AddZero => "remove added zero",
            Step::CombineLikeTerms => "combine like terms",
            Step::NormalizeSign => "normalize signs",
            Step::MultiplyZero => "multiply by zero",
            Step::MultiplyOne => "remove factor of one",
            Step::CombineLikeFactors => "combine like factors",
            Step::CancelFactors => "cancel common factors",
            Step::DivideByOne => "remove division by one",
            Step::MoveCoefficient => "move coefficient to the front",
            Step::PowerZero => "power of zero",
            Step::PowerOne => "power of one",
            Step::OneToPower => "one to a power",
            Step::ZeroToPower => "zero to a power",
            Step::PowerOfPower => "power of a power",
            Step::RootOne => "first root",
            Step::LogSelf => "logarithm of its base",
            Step::LogOne => "logarithm of one",
            Step::DoubleNegation => "double negation",
            Step::NegateNumber => "negate number",
            Step::InversePair => "cancel inverse functions",
            Step::EvaluateFunction => "evaluate function",
        };
        f.write_str(description)
    }
}
