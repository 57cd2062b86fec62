//! Numerical evaluation of expressions.
//!
//! An expression is evaluated against a [`Ctxt`](ctxt::Ctxt), which holds the values of
//! variables, the user-defined functions, and settings such as the [`TrigMode`]. Evaluating
//! produces a [`Value`](value::Value):
//!
//! ```
//! use symcalc_compute::numerical::{ctxt::Ctxt, eval::Eval, value::Value};
//! use symcalc_compute::symbolic::expr::ExprArena;
//!
//! let mut arena = ExprArena::new();
//! let mut ctxt = Ctxt::default();
//! ctxt.add_var("x", Value::Number(3.0));
//!
//! let expr = arena.parse("x^2 + 1").unwrap();
//! assert_eq!(arena.node(expr).eval(&mut ctxt).unwrap(), Value::Number(10.0));
//! ```

pub mod ctxt;
pub mod eval;
pub mod result_type;
pub mod trig_mode;
pub mod value;

pub use trig_mode::TrigMode;
