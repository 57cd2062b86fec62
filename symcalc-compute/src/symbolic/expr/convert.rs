//! Lowering of the parser's AST into an [`ExprArena`].

use crate::{
    error::{ArityError, InvalidChild, ShapeMismatch},
    numerical::ctxt::Ctxt,
};
use num_complex::Complex64;
use std::ops::Range;
use symcalc_error::Error;
use symcalc_parser::parser::{
    ast::{
        assign::{Assign, AssignTarget},
        call::Call,
        expr::Expr as AstExpr,
        literal::{LitList, Literal},
    },
    token::op::{BinOpKind, UnaryOpKind},
    Parser,
};
use super::{
    op::{BinaryOp, NaryOp, UnaryOp},
    ExprArena,
    ExprId,
};

impl From<UnaryOpKind> for UnaryOp {
    fn from(kind: UnaryOpKind) -> Self {
        match kind {
            UnaryOpKind::Neg => UnaryOp::Neg,
            UnaryOpKind::Not => UnaryOp::Not,
            UnaryOpKind::Factorial => UnaryOp::Factorial,
        }
    }
}

impl From<BinOpKind> for BinaryOp {
    fn from(kind: BinOpKind) -> Self {
        match kind {
            BinOpKind::Exp => BinaryOp::Pow,
            BinOpKind::Mul => BinaryOp::Mul,
            BinOpKind::Div => BinaryOp::Div,
            BinOpKind::Mod => BinaryOp::Mod,
            BinOpKind::Add => BinaryOp::Add,
            BinOpKind::Sub => BinaryOp::Sub,
            BinOpKind::Greater => BinaryOp::Greater,
            BinOpKind::GreaterEq => BinaryOp::GreaterEq,
            BinOpKind::Less => BinaryOp::Less,
            BinOpKind::LessEq => BinaryOp::LessEq,
            BinOpKind::Eq => BinaryOp::Eq,
            BinOpKind::NotEq => BinaryOp::NotEq,
            BinOpKind::And => BinaryOp::And,
            BinOpKind::Or => BinaryOp::Or,
            BinOpKind::Xor => BinaryOp::Xor,
        }
    }
}

/// Lowers AST nodes, optionally consulting a context for the arity of user functions.
struct Lowering<'a, 'c> {
    arena: &'a mut ExprArena,
    ctxt: Option<&'c Ctxt>,
}

impl Lowering<'_, '_> {
    fn spanned(&mut self, id: ExprId, span: Range<usize>) -> ExprId {
        self.arena.set_span(id, span);
        id
    }

    fn expr(&mut self, ast: &AstExpr) -> Result<ExprId, Error> {
        let id = match ast {
            AstExpr::Literal(literal) => return self.literal(literal),
            AstExpr::Paren(paren) => return self.expr(paren.innermost()),
            AstExpr::Call(call) => return self.call(call),
            AstExpr::Unary(unary) => {
                let operand = self.expr(&unary.operand)?;
                self.arena.mk_unary(unary.op.kind.into(), operand)
            },
            AstExpr::Binary(binary) => {
                let lhs = self.expr(&binary.lhs)?;
                let rhs = self.expr(&binary.rhs)?;
                self.arena.mk_binary(binary.op.kind.into(), lhs, rhs)
            },
            AstExpr::Assign(assign) => return self.assign(assign),
        };
        Ok(self.spanned(id, ast.span()))
    }

    fn literal(&mut self, literal: &Literal) -> Result<ExprId, Error> {
        let id = match literal {
            Literal::Number(num) => self.arena.num(num.value),
            Literal::Imaginary(imag) => self.arena.complex(Complex64::new(0.0, imag.value)),
            Literal::Boolean(boolean) => self.arena.boolean(boolean.value),
            Literal::Symbol(sym) => self.arena.var(sym.name.clone()),
            Literal::List(list) => return self.list(list),
        };
        Ok(self.spanned(id, literal.span()))
    }

    /// Lowers a list into a vector, or into a matrix if every element is itself a list.
    fn list(&mut self, list: &LitList) -> Result<ExprId, Error> {
        let rows = list.values
            .iter()
            .map(|value| match value.innermost() {
                AstExpr::Literal(Literal::List(row)) => Some(row),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .filter(|rows| !rows.is_empty());

        let id = match rows {
            Some(rows) => {
                let cols = rows[0].values.len();
                if let Some(row) = rows.iter().find(|row| row.values.len() != cols) {
                    return Err(Error::new(vec![row.span.clone()], ShapeMismatch {
                        left: format!("row of length {}", cols),
                        right: format!("row of length {}", row.values.len()),
                    }));
                }

                let mut elements = Vec::with_capacity(rows.len() * cols);
                for row in &rows {
                    for value in &row.values {
                        elements.push(self.expr(value)?);
                    }
                }
                self.arena.nary(NaryOp::Matrix { rows: rows.len(), cols }, elements)
                    .map_err(|err| err.or_span(list.span.clone()))?
            },
            None => {
                let elements = list.values
                    .iter()
                    .map(|value| self.expr(value))
                    .collect::<Result<Vec<_>, _>>()?;
                self.arena.nary(NaryOp::Vector, elements)
                    .map_err(|err| err.or_span(list.span.clone()))?
            },
        };
        Ok(self.spanned(id, list.span.clone()))
    }

    fn call(&mut self, call: &Call) -> Result<ExprId, Error> {
        let name = call.name.name.as_str();
        let arity_error = |min: usize, max: usize| {
            Error::new(call.outer_span().to_vec(), ArityError::new(name, min, max, call.args.len()))
        };

        let args = call.args
            .iter()
            .map(|arg| self.expr(arg))
            .collect::<Result<Vec<_>, _>>()?;

        let id = if let Some(op) = UnaryOp::from_name(name) {
            match args[..] {
                [operand] => self.arena.mk_unary(op, operand),
                _ => return Err(arity_error(1, 1)),
            }
        } else if name == "log" {
            match args[..] {
                [operand] => self.arena.mk_unary(UnaryOp::Lg, operand),
                [base, operand] => self.arena.mk_binary(BinaryOp::Log, base, operand),
                _ => return Err(arity_error(1, 2)),
            }
        } else if let Some(op) = binary_function(name) {
            match args[..] {
                [lhs, rhs] => self.arena.mk_binary(op, lhs, rhs),
                _ => return Err(arity_error(2, 2)),
            }
        } else if let Some(op) = NaryOp::from_name(name) {
            let (min, max) = op.arity();
            if !op.accepts(args.len()) {
                return Err(arity_error(min, max));
            }
            if let Some(bound) = bound_variable(&op) {
                if self.arena.as_variable(args[bound]).is_none() {
                    return Err(Error::new(vec![call.args[bound].span()], InvalidChild {
                        reason: format!("the {} argument of `{}` must be a variable", ordinal(bound), name),
                    }));
                }
            }
            self.arena.mk_nary(op, args)
        } else {
            let params = self.ctxt
                .and_then(|ctxt| ctxt.get_func(name))
                .map(|func| func.params.len())
                .unwrap_or(args.len());
            if params != args.len() {
                return Err(arity_error(params, params));
            }
            self.arena.mk_nary(NaryOp::UserFunction { name: name.to_string(), params }, args)
        };
        Ok(self.spanned(id, call.span()))
    }

    fn assign(&mut self, assign: &Assign) -> Result<ExprId, Error> {
        let (name, params) = match &assign.target {
            AssignTarget::Symbol(sym) => (sym.name.clone(), Vec::new()),
            AssignTarget::Func(header) => (
                header.name.name.clone(),
                header.params.iter().map(|param| param.name.clone()).collect(),
            ),
        };
        let body = self.expr(&assign.value)?;
        let id = self.arena.mk_nary(NaryOp::Define { name, params }, vec![body]);
        Ok(self.spanned(id, assign.span()))
    }
}

/// Returns the binary operator produced by calling a function with two arguments.
fn binary_function(name: &str) -> Option<BinaryOp> {
    match name {
        "root" => Some(BinaryOp::Root),
        "npr" => Some(BinaryOp::NPr),
        "ncr" => Some(BinaryOp::NCr),
        _ => None,
    }
}

/// Returns the position of the argument that names the variable bound by the operator, if any.
fn bound_variable(op: &NaryOp) -> Option<usize> {
    match op {
        NaryOp::Sum | NaryOp::Product | NaryOp::DefiniteIntegral | NaryOp::NDerivative => Some(1),
        _ => None,
    }
}

fn ordinal(position: usize) -> &'static str {
    match position {
        0 => "first",
        1 => "second",
        2 => "third",
        _ => "last",
    }
}

impl ExprArena {
    /// Converts an AST produced by [`symcalc_parser`] into nodes of this arena, returning the id
    /// of the root.
    ///
    /// Builtin function names are resolved to their operators. Calls to any other name become
    /// [`NaryOp::UserFunction`] nodes; if the context defines a function with that name, the
    /// number of arguments must match its parameters.
    pub fn insert_ast(&mut self, ast: &AstExpr, ctxt: Option<&Ctxt>) -> Result<ExprId, Error> {
        let mark = self.checkpoint();
        let result = Lowering { arena: self, ctxt }.expr(ast);
        if result.is_err() {
            self.rollback(mark);
        }
        result
    }

    /// Parses the source code and inserts the resulting tree.
    pub fn parse(&mut self, src: &str) -> Result<ExprId, Error> {
        let ast = Parser::new(src).try_parse_full::<AstExpr>()?;
        self.insert_ast(&ast, None)
    }

    /// Parses the source code and inserts the resulting tree, checking calls to functions
    /// defined in the context.
    pub fn parse_with(&mut self, src: &str, ctxt: &Ctxt) -> Result<ExprId, Error> {
        let ast = Parser::new(src).try_parse_full::<AstExpr>()?;
        self.insert_ast(&ast, Some(ctxt))
    }
}

#[cfg(test)]
mod tests {
    use crate::symbolic::expr::Expr;
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn builtin_functions() {
        let mut arena = ExprArena::new();
        let expr = arena.parse("sqrt(x)").unwrap();
        assert!(matches!(arena.get(expr), Expr::Unary(UnaryOp::Sqrt, _)));

        let expr = arena.parse("log(2, 8)").unwrap();
        let Expr::Binary(BinaryOp::Log, base, _) = *arena.get(expr) else { panic!() };
        assert_eq!(arena.as_number(base), Some(2.0));

        let expr = arena.parse("sum(k^2, k, 1, 10)").unwrap();
        assert!(matches!(arena.get(expr), Expr::Nary(NaryOp::Sum, args) if args.len() == 4));
    }

    #[test]
    fn arity_errors_point_at_call() {
        let mut arena = ExprArena::new();
        let err = arena.parse("1 + sin(x, y)").unwrap_err();
        assert!(err.is::<ArityError>());
        assert_eq!(err.spans, vec![4..8, 12..13]);

        let err = arena.parse("integral(x, 0, 1)").unwrap_err();
        assert_eq!(err.downcast_ref::<ArityError>().unwrap().given, 3);
    }

    #[test]
    fn bound_variable_must_be_symbol() {
        let mut arena = ExprArena::new();
        let err = arena.parse("sum(k, 2, 1, 10)").unwrap_err();
        assert!(err.is::<InvalidChild>());
        assert_eq!(err.spans, vec![7..8]);
    }

    #[test]
    fn lists() {
        let mut arena = ExprArena::new();
        let expr = arena.parse("[[1, 2, 3], [4, 5, 6]]").unwrap();
        assert!(matches!(arena.get(expr), Expr::Nary(NaryOp::Matrix { rows: 2, cols: 3 }, _)));

        let err = arena.parse("[[1, 2], [3]]").unwrap_err();
        assert!(err.is::<ShapeMismatch>());

        let err = arena.parse("[]").unwrap_err();
        assert!(err.is::<ArityError>());
        assert_eq!(err.spans, vec![0..2]);
    }

    #[test]
    fn user_function_arity_from_context() {
        let mut ctxt = Ctxt::new();
        let mut defs = ExprArena::new();
        let body = defs.parse("x + y").unwrap();
        ctxt.add_func("f", vec!["x".to_string(), "y".to_string()], &defs, body);

        let mut arena = ExprArena::new();
        assert!(arena.parse_with("f(1, 2)", &ctxt).is_ok());
        assert!(arena.parse_with("f(1)", &ctxt).unwrap_err().is::<ArityError>());

        // without a context, the call is taken at face value
        assert!(arena.parse("f(1)").is_ok());
    }

    #[test]
    fn failed_lowering_leaves_arena_unchanged() {
        let mut arena = ExprArena::new();
        arena.parse("x").unwrap();
        assert!(arena.parse("2 + sin(x, y)").is_err());
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn spans_are_recorded() {
        let mut arena = ExprArena::new();
        let expr = arena.parse("2 * (x + 1)").unwrap();
        assert_eq!(arena.span(expr), Some(0..11));
        let Expr::Binary(_, _, rhs) = *arena.get(expr) else { panic!() };
        assert_eq!(arena.span(rhs), Some(5..10));
    }
}
