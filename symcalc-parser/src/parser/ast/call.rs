use crate::{
    parser::{
        error::UnclosedParenthesis,
        token::{CloseParen, Comma, OpenParen},
        Parse,
        Parser,
    },
    tokenizer::TokenKind,
};
use std::ops::Range;
use super::{expr::Expr, literal::LitSym};
use symcalc_error::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A function call, such as `func(x, -40)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Call {
    /// The name of the function to call.
    pub name: LitSym,

    /// The arguments to the function.
    pub args: Vec<Expr>,

    /// The region of the source code that this function call was parsed from.
    pub span: Range<usize>,

    /// The span of the parentheses that surround the arguments.
    pub paren_span: Range<usize>,
}

impl Call {
    /// Returns the span of the function call.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Returns a set of two spans, where the first is the span of the function name (with the
    /// opening parenthesis) and the second is the span of the closing parenthesis.
    pub fn outer_span(&self) -> [Range<usize>; 2] {
        [
            self.name.span.start..self.paren_span.start + 1,
            self.paren_span.end - 1..self.paren_span.end,
        ]
    }
}

impl Parse for Call {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let name = input.try_parse::<LitSym>()?;
        let open = input.try_parse::<OpenParen>()?;
        let mut args = Vec::new();

        if input.peek_kind() != Some(TokenKind::CloseParen) {
            args.push(input.try_parse::<Expr>()?);
            while input.try_parse::<Comma>().is_ok() {
                args.push(input.try_parse::<Expr>()?);
            }
        }

        let close = input.try_parse::<CloseParen>()
            .map_err(|_| Error::new(vec![open.span.clone()], UnclosedParenthesis { close: ')' }))?;

        Ok(Self {
            span: name.span.start..close.span.end,
            name,
            args,
            paren_span: open.span.start..close.span.end,
        })
    }
}
