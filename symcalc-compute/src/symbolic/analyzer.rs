//! The [`Analyzer`] trait, implemented by algorithms that walk an expression tree.

use num_complex::Complex64;
use super::expr::{
    op::{BinaryOp, NaryOp, UnaryOp},
    Expr,
    ExprArena,
    ExprId,
};

/// An algorithm that consumes an expression tree, with one method per kind of node.
///
/// [`ExprArena::accept`] looks up a node and calls the method matching its kind. Each method
/// receives the arena mutably, so that analyzers producing new expressions can insert nodes into
/// the same arena, along with the id of the node being visited and its contents. Analyzers
/// usually recurse by calling [`ExprArena::accept`] on the children they are interested in.
///
/// The operator of [`Expr::Unary`], [`Expr::Binary`] and [`Expr::Nary`] nodes is passed along,
/// so a `match` on it inside the method selects the behavior for each concrete operator.
pub trait Analyzer {
    /// The result of analyzing a node.
    type Output;

    /// Analyzes an [`Expr::Number`] node.
    fn number(&mut self, arena: &mut ExprArena, id: ExprId, value: f64) -> Self::Output;

    /// Analyzes an [`Expr::Variable`] node.
    fn variable(&mut self, arena: &mut ExprArena, id: ExprId, name: &str) -> Self::Output;

    /// Analyzes an [`Expr::Boolean`] node.
    fn boolean(&mut self, arena: &mut ExprArena, id: ExprId, value: bool) -> Self::Output;

    /// Analyzes an [`Expr::Complex`] node.
    fn complex(&mut self, arena: &mut ExprArena, id: ExprId, value: Complex64) -> Self::Output;

    /// Analyzes an [`Expr::Unary`] node.
    fn unary(
        &mut self,
        arena: &mut ExprArena,
        id: ExprId,
        op: UnaryOp,
        operand: ExprId,
    ) -> Self::Output;

    /// Analyzes an [`Expr::Binary`] node.
    fn binary(
        &mut self,
        arena: &mut ExprArena,
        id: ExprId,
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    ) -> Self::Output;

    /// Analyzes an [`Expr::Nary`] node.
    fn nary(
        &mut self,
        arena: &mut ExprArena,
        id: ExprId,
        op: &NaryOp,
        args: &[ExprId],
    ) -> Self::Output;
}

impl ExprArena {
    /// Dispatches the node with the given id to the method of the analyzer matching its kind.
    pub fn accept<A: Analyzer + ?Sized>(&mut self, id: ExprId, analyzer: &mut A) -> A::Output {
        // the node is copied out so the analyzer is free to insert into the arena
        match self.get(id).clone() {
            Expr::Number(value) => analyzer.number(self, id, value),
            Expr::Variable(name) => analyzer.variable(self, id, &name),
            Expr::Boolean(value) => analyzer.boolean(self, id, value),
            Expr::Complex(value) => analyzer.complex(self, id, value),
            Expr::Unary(op, operand) => analyzer.unary(self, id, op, operand),
            Expr::Binary(op, lhs, rhs) => analyzer.binary(self, id, op, lhs, rhs),
            Expr::Nary(op, args) => analyzer.nary(self, id, &op, &args),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts the nodes of each kind in a tree.
    #[derive(Default)]
    struct Census {
        leaves: usize,
        operators: usize,
    }

    impl Analyzer for Census {
        type Output = ();

        fn number(&mut self, _: &mut ExprArena, _: ExprId, _: f64) {
            self.leaves += 1;
        }

        fn variable(&mut self, _: &mut ExprArena, _: ExprId, _: &str) {
            self.leaves += 1;
        }

        fn boolean(&mut self, _: &mut ExprArena, _: ExprId, _: bool) {
            self.leaves += 1;
        }

        fn complex(&mut self, _: &mut ExprArena, _: ExprId, _: Complex64) {
            self.leaves += 1;
        }

        fn unary(&mut self, arena: &mut ExprArena, _: ExprId, _: UnaryOp, operand: ExprId) {
            self.operators += 1;
            arena.accept(operand, self);
        }

        fn binary(&mut self, arena: &mut ExprArena, _: ExprId, _: BinaryOp, lhs: ExprId, rhs: ExprId) {
            self.operators += 1;
            arena.accept(lhs, self);
            arena.accept(rhs, self);
        }

        fn nary(&mut self, arena: &mut ExprArena, _: ExprId, _: &NaryOp, args: &[ExprId]) {
            self.operators += 1;
            for &arg in args {
                arena.accept(arg, self);
            }
        }
    }

    #[test]
    fn visits_every_node() {
        let mut arena = ExprArena::new();
        let expr = arena.parse("sin(x) + 2i * [1, true]").unwrap();

        let mut census = Census::default();
        arena.accept(expr, &mut census);
        assert_eq!(census.leaves, 4);
        assert_eq!(census.operators, 4);
    }
}
