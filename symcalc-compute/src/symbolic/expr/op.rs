//! Operators carried by [`Expr::Unary`], [`Expr::Binary`] and [`Expr::Nary`] nodes.
//!
//! [`Expr::Unary`]: super::Expr::Unary
//! [`Expr::Binary`]: super::Expr::Binary
//! [`Expr::Nary`]: super::Expr::Nary

use once_cell::sync::Lazy;
use std::{collections::HashMap, fmt};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Generates the [`UnaryOp`] enum, along with the name each operator is called by.
macro_rules! unary_ops {
    ($($(#[$meta:meta])* $variant:ident => $name:literal),* $(,)?) => {
        /// An operator that takes exactly one operand.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub enum UnaryOp {
            $($(#[$meta])* $variant,)*
        }

        impl UnaryOp {
            /// All unary operators.
            pub const ALL: &'static [UnaryOp] = &[$(UnaryOp::$variant,)*];

            /// Returns the name of the operator, which is also the name of the function that
            /// produces it (except for the prefix and postfix operators).
            pub fn name(self) -> &'static str {
                match self {
                    $(UnaryOp::$variant => $name,)*
                }
            }
        }
    };
}

unary_ops! {
    /// Negation, `-x`.
    Neg => "neg",
    Abs => "abs",
    Sqrt => "sqrt",
    Cbrt => "cbrt",
    Exp => "exp",
    /// Natural logarithm.
    Ln => "ln",
    /// Base-10 logarithm.
    Lg => "lg",
    /// Base-2 logarithm.
    Lb => "lb",
    Sin => "sin",
    Cos => "cos",
    Tan => "tan",
    Cot => "cot",
    Sec => "sec",
    Csc => "csc",
    Arcsin => "arcsin",
    Arccos => "arccos",
    Arctan => "arctan",
    Arccot => "arccot",
    Arcsec => "arcsec",
    Arccsc => "arccsc",
    Sinh => "sinh",
    Cosh => "cosh",
    Tanh => "tanh",
    Coth => "coth",
    Sech => "sech",
    Csch => "csch",
    Arsinh => "arsinh",
    Arcosh => "arcosh",
    Artanh => "artanh",
    Arcoth => "arcoth",
    Arsech => "arsech",
    Arcsch => "arcsch",
    Sign => "sign",
    Round => "round",
    Floor => "floor",
    Ceil => "ceil",
    /// Factorial, `x!`.
    Factorial => "factorial",
    /// Logical not, `not x`.
    Not => "not",
    /// Real part of a complex number.
    Re => "re",
    /// Imaginary part of a complex number.
    Im => "im",
    /// Complex conjugate.
    Conj => "conj",
    Transpose => "transpose",
    /// Determinant of a square matrix.
    Det => "det",
}

/// Maps function names to the unary operator they produce.
static UNARY_BY_NAME: Lazy<HashMap<&'static str, UnaryOp>> = Lazy::new(|| {
    let mut map = UnaryOp::ALL
        .iter()
        .filter(|op| op.is_function())
        .map(|op| (op.name(), *op))
        .collect::<HashMap<_, _>>();

    // alternative spellings
    map.insert("asin", UnaryOp::Arcsin);
    map.insert("acos", UnaryOp::Arccos);
    map.insert("atan", UnaryOp::Arctan);
    map.insert("acot", UnaryOp::Arccot);
    map.insert("asec", UnaryOp::Arcsec);
    map.insert("acsc", UnaryOp::Arccsc);
    map.insert("asinh", UnaryOp::Arsinh);
    map.insert("acosh", UnaryOp::Arcosh);
    map.insert("atanh", UnaryOp::Artanh);
    map.insert("acoth", UnaryOp::Arcoth);
    map.insert("asech", UnaryOp::Arsech);
    map.insert("acsch", UnaryOp::Arcsch);
    map
});

/// Pairs of functions `(f, g)` where `f(g(x)) = x`.
pub const INVERSE_PAIRS: &[(UnaryOp, UnaryOp)] = &[
    (UnaryOp::Sin, UnaryOp::Arcsin),
    (UnaryOp::Cos, UnaryOp::Arccos),
    (UnaryOp::Tan, UnaryOp::Arctan),
    (UnaryOp::Cot, UnaryOp::Arccot),
    (UnaryOp::Sec, UnaryOp::Arcsec),
    (UnaryOp::Csc, UnaryOp::Arccsc),
    (UnaryOp::Sinh, UnaryOp::Arsinh),
    (UnaryOp::Cosh, UnaryOp::Arcosh),
    (UnaryOp::Tanh, UnaryOp::Artanh),
    (UnaryOp::Coth, UnaryOp::Arcoth),
    (UnaryOp::Sech, UnaryOp::Arsech),
    (UnaryOp::Csch, UnaryOp::Arcsch),
    (UnaryOp::Exp, UnaryOp::Ln),
    (UnaryOp::Ln, UnaryOp::Exp),
];

impl UnaryOp {
    /// Returns the unary operator produced by calling the function with the given name.
    pub fn from_name(name: &str) -> Option<UnaryOp> {
        UNARY_BY_NAME.get(name).copied()
    }

    /// Returns true if the operator is written as a function call, `name(x)`.
    pub fn is_function(self) -> bool {
        !matches!(self, UnaryOp::Neg | UnaryOp::Factorial | UnaryOp::Not)
    }

    /// Returns true if the operator is a trigonometric function whose input is an angle.
    pub fn takes_angle(self) -> bool {
        matches!(
            self,
            UnaryOp::Sin | UnaryOp::Cos | UnaryOp::Tan | UnaryOp::Cot | UnaryOp::Sec | UnaryOp::Csc
        )
    }

    /// Returns true if the operator is an inverse trigonometric function whose output is an
    /// angle.
    pub fn returns_angle(self) -> bool {
        matches!(
            self,
            UnaryOp::Arcsin | UnaryOp::Arccos | UnaryOp::Arctan
                | UnaryOp::Arccot | UnaryOp::Arcsec | UnaryOp::Arccsc
        )
    }

    /// Returns the function `g` such that `self(g(x)) = x`, if there is one.
    pub fn inverse(self) -> Option<UnaryOp> {
        INVERSE_PAIRS
            .iter()
            .find(|(outer, _)| *outer == self)
            .map(|(_, inner)| *inner)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => f.write_str("-"),
            UnaryOp::Factorial => f.write_str("!"),
            op => f.write_str(op.name()),
        }
    }
}

/// An operator that takes exactly two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Mod,
    /// `log(base, x)`.
    Log,
    /// `root(x, n)`, the `n`-th root of `x`.
    Root,
    /// Number of permutations, `npr(n, k)`.
    NPr,
    /// Number of combinations, `ncr(n, k)`.
    NCr,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    And,
    Or,
    Xor,
}

impl BinaryOp {
    /// Returns true if the operator is written as a function call, `name(a, b)`.
    pub fn is_function(self) -> bool {
        matches!(self, BinaryOp::Log | BinaryOp::Root | BinaryOp::NPr | BinaryOp::NCr)
    }

    /// Returns the symbol or function name of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::Mod => "%",
            BinaryOp::Log => "log",
            BinaryOp::Root => "root",
            BinaryOp::NPr => "npr",
            BinaryOp::NCr => "ncr",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEq => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
        }
    }

    /// Returns the binding strength of an infix operator; higher binds tighter. Operators
    /// written as function calls bind tightest.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or | BinaryOp::Xor => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::Less
                | BinaryOp::LessEq | BinaryOp::Greater | BinaryOp::GreaterEq => 3,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 5,
            BinaryOp::Pow => 7,
            BinaryOp::Log | BinaryOp::Root | BinaryOp::NPr | BinaryOp::NCr => 9,
        }
    }

    /// Returns true if the operator is right-associative.
    pub fn is_right_assoc(self) -> bool {
        self == BinaryOp::Pow
    }

    /// Returns true if the operator compares its operands.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::Less
                | BinaryOp::LessEq | BinaryOp::Greater | BinaryOp::GreaterEq
        )
    }

    /// Returns true if the operator combines booleans.
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or | BinaryOp::Xor)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An operator whose number of operands varies per use, or that carries extra data of its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NaryOp {
    /// `sum(expr, index, from, to)`.
    Sum,

    /// `product(expr, index, from, to)`.
    Product,

    /// `integral(expr, var, from, to)`.
    DefiniteIntegral,

    /// `nderiv(expr, var, order[, point])`, the `order`-th derivative of `expr`.
    NDerivative,

    /// `if(cond, then[, else])`.
    Condition,

    /// `piecewise(c1, e1, ..., cn, en[, default])`.
    MultiCondition,

    /// `rand([min,] [max])`.
    Rand,

    /// A vector, `[x1, ..., xn]`.
    Vector,

    /// A matrix stored in row-major order.
    Matrix {
        rows: usize,
        cols: usize,
    },

    /// A call to a user-defined function.
    UserFunction {
        name: String,
        params: usize,
    },

    /// The definition of a variable (no parameters) or of a function. Its only child is the
    /// body.
    Define {
        name: String,
        params: Vec<String>,
    },
}

impl NaryOp {
    /// Returns the minimum and maximum number of children a node with this operator may have.
    /// A maximum of [`usize::MAX`] means there is no upper bound.
    pub fn arity(&self) -> (usize, usize) {
        match self {
            NaryOp::Sum | NaryOp::Product | NaryOp::DefiniteIntegral => (4, 4),
            NaryOp::NDerivative => (3, 4),
            NaryOp::Condition => (2, 3),
            NaryOp::MultiCondition => (2, usize::MAX),
            NaryOp::Rand => (0, 2),
            NaryOp::Vector => (1, usize::MAX),
            NaryOp::Matrix { rows, cols } => (rows * cols, rows * cols),
            NaryOp::UserFunction { params, .. } => (*params, *params),
            NaryOp::Define { .. } => (1, 1),
        }
    }

    /// Returns the name the operator is called by.
    pub fn name(&self) -> &str {
        match self {
            NaryOp::Sum => "sum",
            NaryOp::Product => "product",
            NaryOp::DefiniteIntegral => "integral",
            NaryOp::NDerivative => "nderiv",
            NaryOp::Condition => "if",
            NaryOp::MultiCondition => "piecewise",
            NaryOp::Rand => "rand",
            NaryOp::Vector => "vector",
            NaryOp::Matrix { .. } => "matrix",
            NaryOp::UserFunction { name, .. } | NaryOp::Define { name, .. } => name,
        }
    }

    /// Returns the operator produced by calling the builtin function with the given name.
    pub fn from_name(name: &str) -> Option<NaryOp> {
        Some(match name {
            "sum" => NaryOp::Sum,
            "product" => NaryOp::Product,
            "integral" | "integrate" => NaryOp::DefiniteIntegral,
            "nderiv" | "derivative" => NaryOp::NDerivative,
            "if" => NaryOp::Condition,
            "piecewise" => NaryOp::MultiCondition,
            "rand" => NaryOp::Rand,
            _ => return None,
        })
    }

    /// Checks that the number of children is accepted by this operator.
    pub fn accepts(&self, count: usize) -> bool {
        let (min, max) = self.arity();
        count >= min && count <= max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_names() {
        assert_eq!(UnaryOp::from_name("sin"), Some(UnaryOp::Sin));
        assert_eq!(UnaryOp::from_name("asin"), Some(UnaryOp::Arcsin));
        assert_eq!(UnaryOp::from_name("neg"), None);
        assert_eq!(UnaryOp::from_name("log"), None);
        assert_eq!(NaryOp::from_name("integrate"), Some(NaryOp::DefiniteIntegral));
    }

    #[test]
    fn inverse_pairs() {
        assert_eq!(UnaryOp::Sin.inverse(), Some(UnaryOp::Arcsin));
        assert_eq!(UnaryOp::Exp.inverse(), Some(UnaryOp::Ln));
        assert_eq!(UnaryOp::Arcsin.inverse(), None);
    }

    #[test]
    fn nary_arity() {
        assert_eq!(NaryOp::Matrix { rows: 2, cols: 3 }.arity(), (6, 6));
        assert!(NaryOp::Condition.accepts(3));
        assert!(!NaryOp::Condition.accepts(4));
        assert!(NaryOp::Rand.accepts(0));
        assert!(!NaryOp::Sum.accepts(3));
    }
}
