//! Symbolic manipulation of expressions.
//!
//! # Expression representation
//!
//! Expressions are stored in an [`ExprArena`], a flat list of [`Expr`] nodes addressed by
//! [`ExprId`]. A node refers to its children by id, and children are always inserted before
//! their parent, so every tree in the arena is acyclic. Nodes are never modified once inserted:
//! rewriting an expression inserts new nodes for the parts that changed and reuses the ids of
//! the parts that did not.
//!
//! ```
//! use symcalc_compute::symbolic::expr::{Expr, ExprArena};
//! use symcalc_compute::symbolic::expr::op::BinaryOp;
//!
//! let mut arena = ExprArena::new();
//! let expr = arena.parse("x + 2").unwrap();
//! assert!(matches!(arena.get(expr), Expr::Binary(BinaryOp::Add, _, _)));
//! assert_eq!(arena.node(expr).to_string(), "x + 2");
//! ```
//!
//! # Analyzers
//!
//! Algorithms that walk an expression tree implement the [`Analyzer`] trait, which has one
//! method per kind of node. [`ExprArena::accept`] dispatches a node to the matching method.
//! This crate provides two analyzers:
//!
//! - the [`Simplifier`](simplify::Simplifier), which rewrites an expression into a reduced
//!   form, and
//! - the [`Differentiator`](derivative::Differentiator), which computes symbolic derivatives and
//!   can record the derivation as a [`StepTree`](derivative::StepTree).
//!
//! ```
//! use symcalc_compute::symbolic::{expr::ExprArena, simplify};
//!
//! let mut arena = ExprArena::new();
//! let expr = arena.parse("2x + 3x").unwrap();
//! let simplified = simplify(&mut arena, expr).unwrap();
//! assert_eq!(arena.node(simplified).to_string(), "5 * x");
//! ```

pub mod analyzer;
pub mod derivative;
pub mod expr;
pub mod simplify;
pub mod step_collector;

pub use analyzer::Analyzer;
pub use derivative::{differentiate, nth_derivative, Differentiator};
pub use expr::{Expr, ExprArena, ExprId};
pub use simplify::{simplify, simplify_with_steps, Simplifier};
pub use step_collector::StepCollector;
