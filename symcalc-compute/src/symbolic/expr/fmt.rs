//! Infix rendering of expression trees.
//!
//! The output uses as few parentheses as possible while still parsing back into the same tree.

use std::fmt::{self, Debug, Display, Formatter};
use super::{op::{NaryOp, UnaryOp}, Expr, ExprId, ExprRef};

/// Binding strengths used to decide where parentheses are needed. Binary operators use
/// [`BinaryOp::precedence`](super::op::BinaryOp::precedence).
const NEG: u8 = 6;
const POW: u8 = 7;
const FACTORIAL: u8 = 8;
const NOT: u8 = 9;
const ATOM: u8 = 10;

impl ExprRef<'_> {
    /// Returns how tightly the root of the tree binds when printed.
    fn precedence(&self) -> u8 {
        match self.expr() {
            Expr::Number(n) if n.is_sign_negative() && *n != 0.0 => NEG,
            Expr::Complex(c) if c.re != 0.0 => 4,
            Expr::Complex(c) if c.im.is_sign_negative() => NEG,
            Expr::Number(_) | Expr::Variable(_) | Expr::Boolean(_) | Expr::Complex(_) => ATOM,
            Expr::Unary(UnaryOp::Neg, _) => NEG,
            Expr::Unary(UnaryOp::Factorial, _) => FACTORIAL,
            Expr::Unary(UnaryOp::Not, _) => NOT,
            Expr::Unary(..) => ATOM,
            Expr::Binary(op, ..) => op.precedence(),
            Expr::Nary(NaryOp::Define { .. }, _) => 0,
            Expr::Nary(..) => ATOM,
        }
    }

    /// Writes the child, wrapped in parentheses if it binds looser than `min`.
    fn child(&self, f: &mut Formatter<'_>, id: ExprId, min: u8) -> fmt::Result {
        let child = self.with(id);
        if child.precedence() < min {
            write!(f, "({})", child)
        } else {
            write!(f, "{}", child)
        }
    }

    /// Writes a comma-separated list of children.
    fn list(&self, f: &mut Formatter<'_>, ids: &[ExprId]) -> fmt::Result {
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", self.with(*id))?;
        }
        Ok(())
    }
}

impl Display for ExprRef<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.expr() {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Variable(name) => f.write_str(name),
            Expr::Boolean(b) => write!(f, "{}", b),
            Expr::Complex(c) => {
                if c.re == 0.0 {
                    write!(f, "{}i", c.im)
                } else if c.im.is_sign_negative() {
                    write!(f, "{} - {}i", c.re, -c.im)
                } else {
                    write!(f, "{} + {}i", c.re, c.im)
                }
            },
            Expr::Unary(UnaryOp::Neg, operand) => {
                f.write_str("-")?;
                self.child(f, *operand, POW)
            },
            Expr::Unary(UnaryOp::Factorial, operand) => {
                self.child(f, *operand, ATOM)?;
                f.write_str("!")
            },
            Expr::Unary(UnaryOp::Not, operand) => {
                f.write_str("not ")?;
                self.child(f, *operand, FACTORIAL)
            },
            Expr::Unary(op, operand) => write!(f, "{}({})", op.name(), self.with(*operand)),
            Expr::Binary(op, lhs, rhs) if op.is_function() => {
                write!(f, "{}({}, {})", op.symbol(), self.with(*lhs), self.with(*rhs))
            },
            Expr::Binary(op, lhs, rhs) => {
                let prec = op.precedence();
                if op.is_right_assoc() {
                    self.child(f, *lhs, prec + 1)?;
                } else {
                    self.child(f, *lhs, prec)?;
                }

                if op.is_right_assoc() {
                    write!(f, "{}", op)?;
                    self.child(f, *rhs, prec)
                } else {
                    write!(f, " {} ", op)?;
                    self.child(f, *rhs, prec + 1)
                }
            },
            Expr::Nary(NaryOp::Vector, args) => {
                f.write_str("[")?;
                self.list(f, args)?;
                f.write_str("]")
            },
            Expr::Nary(NaryOp::Matrix { cols, .. }, args) => {
                f.write_str("[")?;
                for (i, row) in args.chunks((*cols).max(1)).enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str("[")?;
                    self.list(f, row)?;
                    f.write_str("]")?;
                }
                f.write_str("]")
            },
            Expr::Nary(NaryOp::Define { name, params }, args) => {
                if params.is_empty() {
                    write!(f, "{} = ", name)?;
                } else {
                    write!(f, "{}({}) = ", name, params.join(", "))?;
                }
                self.list(f, args)
            },
            Expr::Nary(op, args) => {
                write!(f, "{}(", op.name())?;
                self.list(f, args)?;
                f.write_str(")")
            },
        }
    }
}

impl Debug for ExprRef<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.expr() {
            Expr::Number(n) => write!(f, "Number({:?})", n),
            Expr::Variable(name) => write!(f, "Variable({:?})", name),
            Expr::Boolean(b) => write!(f, "Boolean({:?})", b),
            Expr::Complex(c) => write!(f, "Complex({:?})", c),
            Expr::Unary(op, operand) => f.debug_tuple(&format!("{:?}", op))
                .field(&self.with(*operand))
                .finish(),
            Expr::Binary(op, lhs, rhs) => f.debug_tuple(&format!("{:?}", op))
                .field(&self.with(*lhs))
                .field(&self.with(*rhs))
                .finish(),
            Expr::Nary(op, args) => {
                let mut tuple = f.debug_tuple(&format!("{:?}", op));
                for arg in args {
                    tuple.field(&self.with(*arg));
                }
                tuple.finish()
            },
        }
    }
}
