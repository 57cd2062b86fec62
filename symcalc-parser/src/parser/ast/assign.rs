use crate::{
    parser::{
        token::{Assign as AssignToken, CloseParen, Comma, OpenParen},
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

/// A function header, **not including the surrounding parentheses**, such as `f(x, y)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FuncHeader {
    /// The name of the function.
    pub name: LitSym,

    /// The parameters of the function.
    pub params: Vec<LitSym>,

    /// The region of the source code that this function header was parsed from.
    pub span: Range<usize>,
}

impl Parse for FuncHeader {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let name = input.try_parse::<LitSym>()?;
        input.try_parse::<OpenParen>()?;
        let mut params = Vec::new();

        if input.peek_kind() != Some(TokenKind::CloseParen) {
            params.push(input.try_parse::<LitSym>()?);
            while input.try_parse::<Comma>().is_ok() {
                params.push(input.try_parse::<LitSym>()?);
            }
        }

        let close = input.try_parse::<CloseParen>()?;
        Ok(Self {
            span: name.span.start..close.span.end,
            name,
            params,
        })
    }
}

/// The target of an assignment: a variable or a function header.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AssignTarget {
    /// A symbol, such as `x`.
    Symbol(LitSym),

    /// A function header, such as `f(x, y)`.
    Func(FuncHeader),
}

impl AssignTarget {
    /// Returns the span of the assignment target.
    pub fn span(&self) -> Range<usize> {
        match self {
            AssignTarget::Symbol(symbol) => symbol.span.clone(),
            AssignTarget::Func(header) => header.span.clone(),
        }
    }
}

impl Parse for AssignTarget {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        input.try_parse::<FuncHeader>().map(AssignTarget::Func)
            .or_else(|_| input.try_parse::<LitSym>().map(AssignTarget::Symbol))
    }
}

/// An assignment of a variable or function, such as `x = 1` or `f(x) = x^2`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Assign {
    /// The target to assign to.
    pub target: AssignTarget,

    /// The expression to assign to the target.
    pub value: Box<Expr>,

    /// The region of the source code that this assignment was parsed from.
    pub span: Range<usize>,
}

impl Assign {
    /// Returns the span of the assignment.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Parses an assignment if the stream starts with an assignment target followed by `=`.
    /// Returns [`None`] without consuming anything otherwise.
    ///
    /// Once the `=` is found, errors in the assigned value are reported instead of backtracking.
    pub fn parse_if_present(input: &mut Parser) -> Result<Option<Self>, Error> {
        let mut input_ahead = input.clone();
        let Ok(target) = input_ahead.try_parse::<AssignTarget>() else {
            return Ok(None);
        };
        if input_ahead.try_parse::<AssignToken>().is_err() {
            return Ok(None);
        }

        input.set_cursor(&input_ahead);
        let value = input.try_parse::<Expr>()?;
        Ok(Some(Self {
            span: target.span().start..value.span().end,
            target,
            value: Box::new(value),
        }))
    }
}

impl Parse for Assign {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        match Self::parse_if_present(input)? {
            Some(assign) => Ok(assign),
            None => {
                let token = input.next_token()?;
                Err(Error::new(vec![token.span], crate::parser::error::InvalidAssignmentTarget))
            },
        }
    }
}
