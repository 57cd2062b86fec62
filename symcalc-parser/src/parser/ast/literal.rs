use crate::{
    parser::{
        error::{InvalidNumber, UnclosedParenthesis, UnexpectedToken},
        token::{Boolean, CloseSquare, Comma, Float, Imaginary, Int, Name, OpenSquare},
        Parse,
        Parser,
    },
    tokenizer::TokenKind,
};
use std::ops::Range;
use super::expr::Expr;
use symcalc_error::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A number literal. Integers and floating-point numbers are both supported and represented here
/// as `f64`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LitNum {
    /// The value of the number literal.
    pub value: f64,

    /// The region of the source code that this literal was parsed from.
    pub span: Range<usize>,
}

impl Parse for LitNum {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let (lexeme, span) = input
            .try_parse::<Int>()
            .map(|num| (num.lexeme, num.span))
            .or_else(|_| input.try_parse::<Float>().map(|num| (num.lexeme, num.span)))?;
        Ok(Self {
            value: lexeme.parse().map_err(|_| Error::new(vec![span.clone()], InvalidNumber))?,
            span,
        })
    }
}

/// An imaginary number literal, such as `2i` or `0.5i`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LitImag {
    /// The coefficient of the imaginary unit.
    pub value: f64,

    /// The region of the source code that this literal was parsed from.
    pub span: Range<usize>,
}

impl Parse for LitImag {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let token = input.try_parse::<Imaginary>()?;
        let value = token.lexeme
            .trim_end_matches('i')
            .parse()
            .map_err(|_| Error::new(vec![token.span.clone()], InvalidNumber))?;
        Ok(Self { value, span: token.span })
    }
}

/// A boolean literal, either `true` or `false`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LitBool {
    /// The value of the boolean literal.
    pub value: bool,

    /// The region of the source code that this literal was parsed from.
    pub span: Range<usize>,
}

impl Parse for LitBool {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let token = input.try_parse::<Boolean>()?;
        Ok(Self {
            value: token.lexeme == "true",
            span: token.span,
        })
    }
}

/// A symbol / identifier literal. Symbols are used to represent variables and functions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LitSym {
    /// The name of the symbol.
    pub name: String,

    /// The region of the source code that this literal was parsed from.
    pub span: Range<usize>,
}

impl Parse for LitSym {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let token = input.try_parse::<Name>()?;
        Ok(Self {
            name: token.lexeme,
            span: token.span,
        })
    }
}

/// A list literal, such as `[1, 2, 3]`. Nested lists represent matrices.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LitList {
    /// The values in the list.
    pub values: Vec<Expr>,

    /// The region of the source code that this literal was parsed from.
    pub span: Range<usize>,
}

impl Parse for LitList {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        let open = input.try_parse::<OpenSquare>()?;
        let mut values = Vec::new();

        if input.peek_kind() != Some(TokenKind::CloseSquare) {
            values.push(input.try_parse::<Expr>()?);
            while input.try_parse::<Comma>().is_ok() {
                values.push(input.try_parse::<Expr>()?);
            }
        }

        let close = input.try_parse::<CloseSquare>()
            .map_err(|_| Error::new(vec![open.span.clone()], UnclosedParenthesis { close: ']' }))?;

        Ok(Self {
            values,
            span: open.span.start..close.span.end,
        })
    }
}

/// Represents a literal value.
///
/// A literal is any value that is written directly into the source code.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Literal {
    /// A number literal. Integers and floating-point numbers are both supported and represented
    /// here as `f64`.
    Number(LitNum),

    /// An imaginary number literal.
    Imaginary(LitImag),

    /// A boolean literal.
    Boolean(LitBool),

    /// A symbol / identifier literal. Symbols are used to represent variables and functions.
    Symbol(LitSym),

    /// A list literal, representing a vector or matrix.
    List(LitList),
}

impl Literal {
    /// Returns the span of the literal.
    pub fn span(&self) -> Range<usize> {
        match self {
            Literal::Number(num) => num.span.clone(),
            Literal::Imaginary(imag) => imag.span.clone(),
            Literal::Boolean(boolean) => boolean.span.clone(),
            Literal::Symbol(name) => name.span.clone(),
            Literal::List(list) => list.span.clone(),
        }
    }
}

impl Parse for Literal {
    fn parse(input: &mut Parser) -> Result<Self, Error> {
        match input.peek_kind() {
            Some(TokenKind::Int | TokenKind::Float) => input.try_parse::<LitNum>().map(Literal::Number),
            Some(TokenKind::Imaginary) => input.try_parse::<LitImag>().map(Literal::Imaginary),
            Some(TokenKind::Boolean) => input.try_parse::<LitBool>().map(Literal::Boolean),
            Some(TokenKind::Name) => input.try_parse::<LitSym>().map(Literal::Symbol),
            Some(TokenKind::OpenSquare) => input.try_parse::<LitList>().map(Literal::List),
            _ => {
                let token = input.next_token()?;
                Err(Error::new(vec![token.span], UnexpectedToken {
                    expected: &[
                        TokenKind::Int,
                        TokenKind::Float,
                        TokenKind::Imaginary,
                        TokenKind::Boolean,
                        TokenKind::Name,
                        TokenKind::OpenSquare,
                    ],
                    found: token.kind,
                }))
            },
        }
    }
}
