//! The core of symcalc: an arena-backed expression tree, numerical evaluation, and two
//! tree-rewriting analyzers, a [`Simplifier`](symbolic::simplify::Simplifier) and a
//! [`Differentiator`](symbolic::derivative::Differentiator).
//!
//! Expressions are stored in an [`ExprArena`](symbolic::expr::ExprArena) and addressed by
//! [`ExprId`](symbolic::expr::ExprId). Nodes never change once they are inserted; rewriting an
//! expression produces new nodes that share the unchanged parts of the old tree.
//!
//! ```
//! use symcalc_compute::numerical::{ctxt::Ctxt, eval::Eval, value::Value};
//! use symcalc_compute::symbolic::{derivative::differentiate, expr::ExprArena};
//!
//! let mut arena = ExprArena::new();
//! let expr = arena.parse("x^2").unwrap();
//! let derivative = differentiate(&mut arena, expr, "x").unwrap();
//! assert_eq!(arena.node(derivative).to_string(), "2 * x");
//!
//! let mut ctxt = Ctxt::new();
//! ctxt.add_var("x", Value::Number(3.0));
//! assert_eq!(arena.node(derivative).eval(&mut ctxt).unwrap(), Value::Number(6.0));
//! ```

pub mod consts;
pub mod error;
pub mod numerical;
pub mod symbolic;

pub use symcalc_error::Error;
