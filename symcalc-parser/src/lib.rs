//! Tokenizer and parser for mathematical expressions.
//!
//! The parser produces an abstract syntax tree ([`parser::ast::Expr`]) that keeps the span of
//! every node, so that later stages can point errors back at the source code. It understands
//! the usual arithmetic operators, implicit multiplication (`2x`, `3(x + 1)`), function calls,
//! comparisons and logical operators, list literals (`[1, 2, 3]`), and assignments of variables
//! and functions (`f(x) = x^2`).
//!
//! ```
//! use symcalc_parser::parser::{ast::Expr, Parser};
//!
//! let mut parser = Parser::new("2x^2 + sin(x)");
//! let expr = parser.try_parse_full::<Expr>().unwrap();
//! assert_eq!(expr.span(), 0..13);
//! ```

pub mod parser;
pub mod tokenizer;
