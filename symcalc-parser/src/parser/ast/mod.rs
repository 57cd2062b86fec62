//! Abstract syntax tree produced by the parser.

pub mod assign;
pub mod binary;
pub mod call;
pub mod expr;
pub mod literal;
pub mod paren;
pub mod unary;

pub use assign::{Assign, AssignTarget, FuncHeader};
pub use binary::Binary;
pub use call::Call;
pub use expr::{Expr, Primary};
pub use literal::{LitBool, LitImag, LitList, LitNum, LitSym, Literal};
pub use paren::Paren;
pub use unary::Unary;
