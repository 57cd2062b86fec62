//! The types of values, and the rules for combining them.
//!
//! Operators behave differently depending on the types of their operands: `+` adds numbers and
//! adds vectors elementwise, `*` scales vectors but also computes dot and matrix products. The
//! functions in this module decide, from the operand types alone, whether an operation is
//! allowed and what type it produces. The evaluator consults them before applying an operator,
//! and [`ExprArena::result_type`] uses them to type an expression without evaluating it.

use crate::{
    error::{
        InvalidBinaryOperation,
        InvalidUnaryOperation,
        RecursionLimitExceeded,
        ShapeMismatch,
        UndefinedFunction,
        UndefinedVariable,
    },
    numerical::{ctxt::Ctxt, value::Value},
    symbolic::expr::{
        op::{BinaryOp, NaryOp, UnaryOp},
        Expr,
        ExprArena,
        ExprId,
    },
};
use std::fmt;
use symcalc_error::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The type of a value, including the shape of vectors and matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ResultType {
    Number,
    Complex,
    Boolean,

    /// A vector with the given number of elements.
    Vector(usize),

    /// A matrix with the given number of rows and columns.
    Matrix(usize, usize),

    Unit,
}

impl ResultType {
    /// Returns the name of the type, without its shape.
    pub fn typename(self) -> &'static str {
        match self {
            ResultType::Number => "number",
            ResultType::Complex => "complex",
            ResultType::Boolean => "boolean",
            ResultType::Vector(_) => "vector",
            ResultType::Matrix(..) => "matrix",
            ResultType::Unit => "unit",
        }
    }

    /// Returns true for real and complex numbers.
    pub fn is_scalar(self) -> bool {
        matches!(self, ResultType::Number | ResultType::Complex)
    }

    /// Returns a value of this type, with every number zero.
    pub fn placeholder(self) -> Value {
        match self {
            ResultType::Number => Value::Number(0.0),
            ResultType::Complex => Value::Complex(Default::default()),
            ResultType::Boolean => Value::Boolean(false),
            ResultType::Vector(n) => Value::Vector(vec![0.0; n]),
            ResultType::Matrix(rows, cols) => Value::Matrix { rows, cols, data: vec![0.0; rows * cols] },
            ResultType::Unit => Value::Unit,
        }
    }

    /// Returns the type produced by applying the unary operator to an operand of this type.
    pub fn unary(op: UnaryOp, operand: ResultType) -> Result<ResultType, Error> {
        use ResultType::*;
        let invalid = || Err(Error::spanless(InvalidUnaryOperation {
            op,
            operand: operand.typename(),
        }));

        Ok(match (op, operand) {
            (UnaryOp::Not, Boolean) => Boolean,
            (UnaryOp::Not, _) | (_, Boolean | Unit) => return invalid(),
            (UnaryOp::Factorial, Number) => Number,
            (UnaryOp::Factorial, _) => return invalid(),
            (UnaryOp::Transpose, Matrix(rows, cols)) => Matrix(cols, rows),
            (UnaryOp::Det, Matrix(rows, cols)) if rows == cols => Number,
            (UnaryOp::Det, Matrix(..)) => return Err(Error::spanless(ShapeMismatch {
                left: operand.to_string(),
                right: "square matrix".to_string(),
            })),
            (UnaryOp::Transpose | UnaryOp::Det, _) => return invalid(),
            (UnaryOp::Abs | UnaryOp::Re | UnaryOp::Im, Complex) => Number,
            (UnaryOp::Abs, Vector(_)) => Number,
            (UnaryOp::Re | UnaryOp::Im | UnaryOp::Conj, Number) => Number,
            (UnaryOp::Re | UnaryOp::Im | UnaryOp::Conj, _) if !operand.is_scalar() => return invalid(),
            (UnaryOp::Sign | UnaryOp::Round | UnaryOp::Floor | UnaryOp::Ceil, Complex) => Complex,
            (_, other) => other,
        })
    }

    /// Returns the type produced by applying the binary operator to operands of these types.
    pub fn binary(op: BinaryOp, lhs: ResultType, rhs: ResultType) -> Result<ResultType, Error> {
        use ResultType::*;
        let invalid = || Err(Error::spanless(InvalidBinaryOperation {
            op,
            left: lhs.typename(),
            right: rhs.typename(),
        }));
        let mismatch = || Err(Error::spanless(ShapeMismatch {
            left: lhs.to_string(),
            right: rhs.to_string(),
        }));

        if op.is_logical() {
            return match (lhs, rhs) {
                (Boolean, Boolean) => Ok(Boolean),
                _ => invalid(),
            };
        }

        if matches!(op, BinaryOp::Eq | BinaryOp::NotEq) {
            return if lhs == rhs || lhs.is_scalar() && rhs.is_scalar() {
                Ok(Boolean)
            } else {
                invalid()
            };
        }

        if op.is_comparison() {
            return match (lhs, rhs) {
                (Number, Number) => Ok(Boolean),
                _ => invalid(),
            };
        }

        match (op, lhs, rhs) {
            (_, Number, Number) => Ok(Number),
            (BinaryOp::Mod | BinaryOp::NPr | BinaryOp::NCr, ..) => invalid(),
            (_, Number | Complex, Number | Complex) => Ok(Complex),
            (BinaryOp::Add | BinaryOp::Sub, Vector(a), Vector(b)) => {
                if a == b { Ok(Vector(a)) } else { mismatch() }
            },
            (BinaryOp::Add | BinaryOp::Sub, Matrix(r1, c1), Matrix(r2, c2)) => {
                if (r1, c1) == (r2, c2) { Ok(Matrix(r1, c1)) } else { mismatch() }
            },
            (BinaryOp::Mul, Number, Vector(n)) | (BinaryOp::Mul | BinaryOp::Div, Vector(n), Number) => {
                Ok(Vector(n))
            },
            (BinaryOp::Mul, Number, Matrix(r, c)) | (BinaryOp::Mul | BinaryOp::Div, Matrix(r, c), Number) => {
                Ok(Matrix(r, c))
            },
            (BinaryOp::Mul, Vector(a), Vector(b)) => {
                if a == b { Ok(Number) } else { mismatch() }
            },
            (BinaryOp::Mul, Matrix(r, k1), Matrix(k2, c)) => {
                if k1 == k2 { Ok(Matrix(r, c)) } else { mismatch() }
            },
            (BinaryOp::Mul, Matrix(r, c), Vector(n)) => {
                if c == n { Ok(Vector(r)) } else { mismatch() }
            },
            _ => invalid(),
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultType::Vector(n) => write!(f, "vector of length {}", n),
            ResultType::Matrix(rows, cols) => write!(f, "{}x{} matrix", rows, cols),
            other => f.write_str(other.typename()),
        }
    }
}

impl ExprArena {
    /// Computes the type the expression would evaluate to, without evaluating it.
    ///
    /// Variables are typed by their current value in the context, and calls to user functions by
    /// typing the function body with its parameters bound to values of the argument types.
    pub fn result_type(&self, id: ExprId, ctxt: &Ctxt) -> Result<ResultType, Error> {
        self.result_type_at(id, ctxt, 0)
    }

    fn result_type_at(&self, id: ExprId, ctxt: &Ctxt, depth: usize) -> Result<ResultType, Error> {
        if depth > ctxt.max_depth {
            return Err(self.error_at(id, RecursionLimitExceeded { max_depth: ctxt.max_depth }));
        }
        let child = |child: ExprId| self.result_type_at(child, ctxt, depth + 1);

        let ty = match self.get(id) {
            Expr::Number(_) => Ok(ResultType::Number),
            Expr::Complex(_) => Ok(ResultType::Complex),
            Expr::Boolean(_) => Ok(ResultType::Boolean),
            Expr::Variable(name) => ctxt.get_var(name)
                .map(|value| value.result_type())
                .ok_or_else(|| Error::spanless(UndefinedVariable { name: name.clone() })),
            Expr::Unary(op, operand) => ResultType::unary(*op, child(*operand)?),
            Expr::Binary(op, lhs, rhs) => ResultType::binary(*op, child(*lhs)?, child(*rhs)?),
            Expr::Nary(op, args) => match op {
                NaryOp::Sum | NaryOp::Product => {
                    // the index is bound while the body is evaluated
                    let index = self.as_variable(args[1]).unwrap_or_default();
                    let mut inner = ctxt.clone();
                    inner.add_var(index, Value::Number(0.0));
                    self.result_type_at(args[0], &inner, depth + 1)
                },
                NaryOp::DefiniteIntegral | NaryOp::NDerivative | NaryOp::Rand => Ok(ResultType::Number),
                NaryOp::Condition | NaryOp::MultiCondition => child(args[1]),
                NaryOp::Vector => Ok(ResultType::Vector(args.len())),
                NaryOp::Matrix { rows, cols } => Ok(ResultType::Matrix(*rows, *cols)),
                NaryOp::Define { params, .. } if !params.is_empty() => Ok(ResultType::Unit),
                NaryOp::Define { .. } => child(args[0]),
                NaryOp::UserFunction { name, .. } => {
                    let func = ctxt.get_func(name).ok_or_else(|| Error::spanless(UndefinedFunction {
                        name: name.clone(),
                        suggestions: ctxt.get_similar_funcs(name).into_iter().map(String::from).collect(),
                    }))?;

                    let mut inner = ctxt.clone();
                    for (param, arg) in func.params.iter().zip(args) {
                        inner.add_var(param, child(*arg)?.placeholder());
                    }
                    func.arena.result_type_at(func.body, &inner, depth + 1)
                },
            },
        };

        ty.map_err(|err| match self.span(id) {
            Some(span) => err.or_span(span),
            None => err,
        })
    }
}
