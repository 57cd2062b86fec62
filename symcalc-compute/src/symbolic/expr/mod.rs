//! The expression arena and the nodes stored in it.

mod convert;
mod fmt;
pub mod iter;
pub mod op;

use crate::error::{ArityError, InvalidChild};
use num_complex::Complex64;
use op::{BinaryOp, NaryOp, UnaryOp};
use std::{collections::HashMap, ops::Range};
use symcalc_error::{Error, ErrorKind};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use iter::PostOrder;

/// The address of a node in an [`ExprArena`].
///
/// Ids are only meaningful for the arena that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExprId(u32);

impl ExprId {
    /// Returns the position of the node in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single node of an expression tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    /// A real number.
    Number(f64),

    /// A named variable, such as `x`.
    Variable(String),

    /// A boolean, `true` or `false`.
    Boolean(bool),

    /// A complex number.
    Complex(Complex64),

    /// An operator applied to one operand.
    Unary(UnaryOp, ExprId),

    /// An operator applied to two operands.
    Binary(BinaryOp, ExprId, ExprId),

    /// An operator applied to a number of arguments that depends on the operator.
    Nary(NaryOp, Vec<ExprId>),
}

impl Expr {
    /// Returns the children of the node, from left to right.
    pub fn children(&self) -> Vec<ExprId> {
        match self {
            Expr::Number(_) | Expr::Variable(_) | Expr::Boolean(_) | Expr::Complex(_) => Vec::new(),
            Expr::Unary(_, operand) => vec![*operand],
            Expr::Binary(_, lhs, rhs) => vec![*lhs, *rhs],
            Expr::Nary(_, args) => args.clone(),
        }
    }

    /// Returns true if the node has no children.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Expr::Number(_) | Expr::Variable(_) | Expr::Boolean(_) | Expr::Complex(_))
    }

    /// Returns a copy of this node whose children are replaced by the result of `f`.
    pub(crate) fn map_children(&self, mut f: impl FnMut(ExprId) -> ExprId) -> Expr {
        match self {
            Expr::Unary(op, operand) => Expr::Unary(*op, f(*operand)),
            Expr::Binary(op, lhs, rhs) => {
                let lhs = f(*lhs);
                Expr::Binary(*op, lhs, f(*rhs))
            },
            Expr::Nary(op, args) => Expr::Nary(op.clone(), args.iter().map(|&arg| f(arg)).collect()),
            leaf => leaf.clone(),
        }
    }
}

/// Storage for expression trees.
///
/// Nodes are appended to the arena and never move, so an [`ExprId`] stays valid for the lifetime
/// of the arena. A node's children always have smaller ids than the node itself, which keeps
/// every tree acyclic.
///
/// The arena can hold many trees at once, and trees may share subtrees. Rewrites build new nodes
/// instead of modifying existing ones, so rewriting one tree never affects another. The exception
/// is [`ExprArena::replace`], which edits a node in place: every tree sharing that node sees the
/// edit. Use [`ExprArena::deep_clone`] first to edit one tree on its own.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExprArena {
    /// The nodes, indexed by [`ExprId`].
    nodes: Vec<Expr>,

    /// The region of source code each parsed node came from.
    spans: HashMap<ExprId, Range<usize>>,
}

impl ExprArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the arena has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends a node without validating it.
    pub(crate) fn push(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(expr);
        id
    }

    /// Returns the node with the given id.
    ///
    /// # Panics
    ///
    /// Panics if the id was not created by this arena.
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.nodes[id.index()]
    }

    /// Returns the node with the given id, or [`None`] if there is no such node.
    pub fn try_get(&self, id: ExprId) -> Option<&Expr> {
        self.nodes.get(id.index())
    }

    /// Returns a handle to the tree rooted at the given node, which can be compared and
    /// displayed.
    pub fn node(&self, id: ExprId) -> ExprRef<'_> {
        ExprRef { arena: self, id }
    }

    /// Inserts a number.
    pub fn num(&mut self, value: f64) -> ExprId {
        self.push(Expr::Number(value))
    }

    /// Inserts a variable.
    pub fn var(&mut self, name: impl Into<String>) -> ExprId {
        self.push(Expr::Variable(name.into()))
    }

    /// Inserts a boolean.
    pub fn boolean(&mut self, value: bool) -> ExprId {
        self.push(Expr::Boolean(value))
    }

    /// Inserts a complex number.
    pub fn complex(&mut self, value: Complex64) -> ExprId {
        self.push(Expr::Complex(value))
    }

    /// Returns an error if the given id does not refer to a node in this arena.
    fn check_child(&self, id: ExprId) -> Result<(), Error> {
        if self.try_get(id).is_none() {
            return Err(Error::spanless(InvalidChild {
                reason: format!("there is no node with id {}", id.index()),
            }));
        }
        Ok(())
    }

    /// Inserts a unary node.
    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> Result<ExprId, Error> {
        self.check_child(operand)?;
        Ok(self.mk_unary(op, operand))
    }

    /// Inserts a binary node.
    pub fn binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> Result<ExprId, Error> {
        self.check_child(lhs)?;
        self.check_child(rhs)?;
        Ok(self.mk_binary(op, lhs, rhs))
    }

    /// Inserts an n-ary node, checking that the operator accepts the given number of arguments.
    ///
    /// ```
    /// use symcalc_compute::error::ArityError;
    /// use symcalc_compute::symbolic::expr::{op::NaryOp, ExprArena};
    ///
    /// let mut arena = ExprArena::new();
    /// let x = arena.var("x");
    /// let err = arena.nary(NaryOp::Sum, vec![x, x]).unwrap_err();
    /// assert!(err.is::<ArityError>());
    /// ```
    pub fn nary(&mut self, op: NaryOp, args: Vec<ExprId>) -> Result<ExprId, Error> {
        if !op.accepts(args.len()) {
            let (min, max) = op.arity();
            return Err(Error::spanless(ArityError::new(op.name(), min, max, args.len())));
        }
        for &arg in &args {
            self.check_child(arg)?;
        }
        Ok(self.mk_nary(op, args))
    }

    pub(crate) fn mk_unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        self.push(Expr::Unary(op, operand))
    }

    pub(crate) fn mk_binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.push(Expr::Binary(op, lhs, rhs))
    }

    pub(crate) fn mk_nary(&mut self, op: NaryOp, args: Vec<ExprId>) -> ExprId {
        self.push(Expr::Nary(op, args))
    }

    pub(crate) fn add(&mut self, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.mk_binary(BinaryOp::Add, lhs, rhs)
    }

    pub(crate) fn sub(&mut self, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.mk_binary(BinaryOp::Sub, lhs, rhs)
    }

    pub(crate) fn mul(&mut self, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.mk_binary(BinaryOp::Mul, lhs, rhs)
    }

    pub(crate) fn div(&mut self, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.mk_binary(BinaryOp::Div, lhs, rhs)
    }

    pub(crate) fn pow(&mut self, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.mk_binary(BinaryOp::Pow, lhs, rhs)
    }

    pub(crate) fn neg(&mut self, operand: ExprId) -> ExprId {
        self.mk_unary(UnaryOp::Neg, operand)
    }

    pub(crate) fn call(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        self.mk_unary(op, operand)
    }

    /// Replaces the node with the given id in place. Unlike every other operation on the arena,
    /// this is visible to every tree containing the node, including trees that only share it.
    ///
    /// The new node may only refer to children with smaller ids than `id`, so that the arena stays
    /// acyclic.
    pub fn replace(&mut self, id: ExprId, expr: Expr) -> Result<(), Error> {
        self.check_child(id)?;
        if let Some(child) = expr.children().into_iter().find(|child| *child >= id) {
            return Err(Error::spanless(InvalidChild {
                reason: format!(
                    "node {} cannot refer to node {}, which was not inserted before it",
                    id.index(),
                    child.index(),
                ),
            }));
        }
        if let Expr::Nary(op, args) = &expr {
            if !op.accepts(args.len()) {
                let (min, max) = op.arity();
                return Err(Error::spanless(ArityError::new(op.name(), min, max, args.len())));
            }
        }
        self.nodes[id.index()] = expr;
        Ok(())
    }

    /// Copies the tree rooted at the given node into fresh nodes, returning the id of the new
    /// root. The copy shares nothing with the original.
    pub fn deep_clone(&mut self, id: ExprId) -> ExprId {
        let expr = self.get(id).clone();
        let copy = expr.map_children(|child| self.deep_clone(child));
        let new_id = self.push(copy);
        if let Some(span) = self.spans.get(&id).cloned() {
            self.spans.insert(new_id, span);
        }
        new_id
    }

    /// Copies the tree rooted at `id` in another arena into this arena, returning the id of the
    /// copy.
    pub fn import(&mut self, other: &ExprArena, id: ExprId) -> ExprId {
        let mut copied = HashMap::new();
        self.import_memo(other, id, &mut copied)
    }

    fn import_memo(
        &mut self,
        other: &ExprArena,
        id: ExprId,
        copied: &mut HashMap<ExprId, ExprId>,
    ) -> ExprId {
        if let Some(&new_id) = copied.get(&id) {
            return new_id;
        }
        let copy = other.get(id).map_children(|child| self.import_memo(other, child, copied));
        let new_id = self.push(copy);
        copied.insert(id, new_id);
        new_id
    }

    /// Returns a marker for the current end of the arena.
    pub(crate) fn checkpoint(&self) -> usize {
        self.nodes.len()
    }

    /// Discards every node inserted after the given [`checkpoint`](Self::checkpoint). None of the
    /// discarded ids may still be in use.
    pub(crate) fn rollback(&mut self, mark: usize) {
        if mark < self.nodes.len() {
            self.nodes.truncate(mark);
            self.spans.retain(|id, _| id.index() < mark);
        }
    }

    /// Returns an iterator over the ids of the tree rooted at the given node, in left-to-right
    /// post-order.
    pub fn post_order(&self, id: ExprId) -> PostOrder<'_> {
        PostOrder::new(self, id)
    }

    /// Returns true if the tree rooted at the given node contains the named variable.
    ///
    /// Bound variables (the index of a sum, the variable of an integral) count as well, since
    /// they are still syntactically present.
    pub fn contains_var(&self, id: ExprId, name: &str) -> bool {
        self.post_order(id)
            .any(|node| matches!(self.get(node), Expr::Variable(var) if var == name))
    }

    /// Returns the value of the node if it is a number.
    pub fn as_number(&self, id: ExprId) -> Option<f64> {
        match self.get(id) {
            Expr::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns true if the node is the given number.
    pub(crate) fn is_number(&self, id: ExprId, value: f64) -> bool {
        self.as_number(id) == Some(value)
    }

    /// Returns the name of the node if it is a variable.
    pub fn as_variable(&self, id: ExprId) -> Option<&str> {
        match self.get(id) {
            Expr::Variable(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Returns true if the trees rooted at the two nodes are structurally equal.
    pub fn eq_at(&self, a: ExprId, b: ExprId) -> bool {
        a == b || structural_eq(self, a, self, b)
    }

    /// Returns a tree where every occurrence of the named variable in the tree rooted at `id` is
    /// replaced by `replacement`. Parts of the tree that do not contain the variable are reused
    /// as-is.
    pub fn substitute(&mut self, id: ExprId, name: &str, replacement: ExprId) -> ExprId {
        let bindings = HashMap::from([(name.to_string(), replacement)]);
        self.substitute_all(id, &bindings)
    }

    /// Replaces every variable named in `bindings` at once.
    pub fn substitute_all(&mut self, id: ExprId, bindings: &HashMap<String, ExprId>) -> ExprId {
        let mut done = HashMap::new();
        self.substitute_memo(id, bindings, &mut done)
    }

    fn substitute_memo(
        &mut self,
        id: ExprId,
        bindings: &HashMap<String, ExprId>,
        done: &mut HashMap<ExprId, ExprId>,
    ) -> ExprId {
        if let Some(&new_id) = done.get(&id) {
            return new_id;
        }

        let expr = self.get(id).clone();
        let new_id = match &expr {
            Expr::Variable(name) => bindings.get(name).copied().unwrap_or(id),
            leaf if leaf.is_leaf() => id,
            _ => {
                let new_expr = expr.map_children(|child| self.substitute_memo(child, bindings, done));
                if new_expr == expr {
                    id
                } else {
                    self.push(new_expr)
                }
            },
        };
        done.insert(id, new_id);
        new_id
    }

    /// Returns the span of source code the node was parsed from, if it was parsed.
    pub fn span(&self, id: ExprId) -> Option<Range<usize>> {
        self.spans.get(&id).cloned()
    }

    /// Records the span of source code the node was parsed from.
    pub fn set_span(&mut self, id: ExprId, span: Range<usize>) {
        self.spans.insert(id, span);
    }

    /// Creates an error pointing at the source code of the given node, if there is any.
    pub fn error_at(&self, id: ExprId, kind: impl ErrorKind + 'static) -> Error {
        Error::new(self.span(id).into_iter().collect(), kind)
    }
}

/// Compares two trees, possibly from different arenas, by structure.
fn structural_eq(a_arena: &ExprArena, a: ExprId, b_arena: &ExprArena, b: ExprId) -> bool {
    let eq = |x: &ExprId, y: &ExprId| structural_eq(a_arena, *x, b_arena, *y);
    match (a_arena.get(a), b_arena.get(b)) {
        (Expr::Number(x), Expr::Number(y)) => x == y,
        (Expr::Variable(x), Expr::Variable(y)) => x == y,
        (Expr::Boolean(x), Expr::Boolean(y)) => x == y,
        (Expr::Complex(x), Expr::Complex(y)) => x == y,
        (Expr::Unary(op_x, x), Expr::Unary(op_y, y)) => op_x == op_y && eq(x, y),
        (Expr::Binary(op_x, lx, rx), Expr::Binary(op_y, ly, ry)) => {
            op_x == op_y && eq(lx, ly) && eq(rx, ry)
        },
        (Expr::Nary(op_x, xs), Expr::Nary(op_y, ys)) => {
            op_x == op_y && xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| eq(x, y))
        },
        _ => false,
    }
}

/// A reference to the tree rooted at a node of an [`ExprArena`].
///
/// Two references are equal if their trees have the same structure, even if they live in
/// different arenas. The [`Display`](std::fmt::Display) implementation prints the tree in infix
/// notation.
#[derive(Clone, Copy)]
pub struct ExprRef<'a> {
    /// The arena containing the tree.
    pub arena: &'a ExprArena,

    /// The root of the tree.
    pub id: ExprId,
}

impl<'a> ExprRef<'a> {
    /// Returns the root node.
    pub fn expr(&self) -> &'a Expr {
        self.arena.get(self.id)
    }

    /// Returns a reference to another node in the same arena.
    pub fn with(&self, id: ExprId) -> ExprRef<'a> {
        ExprRef { arena: self.arena, id }
    }
}

impl PartialEq for ExprRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        structural_eq(self.arena, self.id, other.arena, other.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn children_precede_parents() {
        let mut arena = ExprArena::new();
        let expr = arena.parse("x * (y + 1)").unwrap();
        for id in arena.post_order(expr).collect::<Vec<_>>() {
            for child in arena.get(id).children() {
                assert!(child < id);
            }
        }
    }

    #[test]
    fn replace_rejects_cycles() {
        let mut arena = ExprArena::new();
        let x = arena.var("x");
        let neg = arena.neg(x);
        assert!(arena.replace(x, Expr::Unary(UnaryOp::Neg, neg)).unwrap_err().is::<InvalidChild>());
        assert!(arena.replace(x, Expr::Unary(UnaryOp::Neg, x)).is_err());
        assert!(arena.replace(neg, Expr::Unary(UnaryOp::Abs, x)).is_ok());
    }

    #[test]
    fn constructors_validate_children() {
        let mut arena = ExprArena::new();
        let x = arena.var("x");
        assert!(arena.unary(UnaryOp::Sin, ExprId(99)).unwrap_err().is::<InvalidChild>());
        assert!(arena.binary(BinaryOp::Add, x, ExprId(99)).is_err());

        let header = NaryOp::UserFunction { name: "f".to_string(), params: 2 };
        assert!(arena.nary(header.clone(), vec![x]).unwrap_err().is::<ArityError>());
        assert!(arena.nary(header, vec![x, x]).is_ok());
        assert!(arena.nary(NaryOp::Matrix { rows: 2, cols: 2 }, vec![x; 3]).is_err());
    }

    #[test]
    fn deep_clone_is_independent() {
        let mut arena = ExprArena::new();
        let original = arena.parse("2 * x").unwrap();
        let copy = arena.deep_clone(original);
        assert_ne!(copy, original);
        assert!(arena.eq_at(copy, original));

        // editing the copy leaves the original alone
        let Expr::Binary(_, two, _) = *arena.get(copy) else { unreachable!() };
        arena.replace(two, Expr::Number(5.0)).unwrap();
        assert_eq!(arena.node(original).to_string(), "2 * x");
        assert_eq!(arena.node(copy).to_string(), "5 * x");
    }

    #[test]
    fn structural_equality_across_arenas() {
        let mut a = ExprArena::new();
        let mut b = ExprArena::new();
        b.num(1.0);
        let x = a.parse("x - x").unwrap();
        let y = b.parse("x - x").unwrap();
        assert!(a.node(x) == b.node(y));

        let z = b.parse("x - y").unwrap();
        assert!(a.node(x) != b.node(z));
    }

    #[test]
    fn substitute_reuses_unchanged_subtrees() {
        let mut arena = ExprArena::new();
        let expr = arena.parse("sin(y) + x^2").unwrap();
        let Expr::Binary(_, sin_y, _) = *arena.get(expr) else { unreachable!() };

        let three = arena.num(3.0);
        let result = arena.substitute(expr, "x", three);
        assert_eq!(arena.node(result).to_string(), "sin(y) + 3^2");
        let Expr::Binary(_, new_sin_y, _) = *arena.get(result) else { unreachable!() };
        assert_eq!(new_sin_y, sin_y);

        // no occurrence, same tree
        assert_eq!(arena.substitute(expr, "z", three), expr);
        assert_eq!(arena.node(expr).to_string(), "sin(y) + x^2");
    }

    #[test]
    fn replace_reaches_shared_subtrees() {
        let mut arena = ExprArena::new();
        let expr = arena.parse("sin(y) + x").unwrap();
        let two = arena.num(2.0);
        let other = arena.substitute(expr, "x", two);
        let Expr::Binary(_, sin_y, _) = *arena.get(other) else { unreachable!() };
        let Expr::Unary(_, y) = *arena.get(sin_y) else { unreachable!() };

        arena.replace(sin_y, Expr::Unary(UnaryOp::Cos, y)).unwrap();
        assert_eq!(arena.node(expr).to_string(), "cos(y) + x");
        assert_eq!(arena.node(other).to_string(), "cos(y) + 2");
    }

    #[test]
    fn contains_var() {
        let mut arena = ExprArena::new();
        let expr = arena.parse("3 * sin(t) + y").unwrap();
        assert!(arena.contains_var(expr, "t"));
        assert!(arena.contains_var(expr, "y"));
        assert!(!arena.contains_var(expr, "x"));
    }

    #[test]
    fn import_between_arenas() {
        let mut source = ExprArena::new();
        let expr = source.parse("f(x) = x + 1").unwrap();

        let mut target = ExprArena::new();
        target.var("unrelated");
        let copy = target.import(&source, expr);
        assert!(source.node(expr) == target.node(copy));
    }

    #[test]
    fn rollback_discards_nodes() {
        let mut arena = ExprArena::new();
        let x = arena.var("x");
        let mark = arena.checkpoint();
        arena.num(1.0);
        arena.num(2.0);
        arena.rollback(mark);
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.as_variable(x), Some("x"));
    }
}
