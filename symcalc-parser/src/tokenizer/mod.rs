pub mod token;

use logos::{Lexer, Logos};
pub use token::{Token, TokenKind};

/// Returns an iterator over the token kinds produced by the tokenizer.
pub fn tokenize(input: &str) -> Lexer<TokenKind> {
    TokenKind::lexer(input)
}

/// Returns an owned array containing all of the tokens produced by the tokenizer. This allows us
/// to backtrack in case of an error.
///
/// Characters that do not start any token are kept as [`TokenKind::Unknown`] tokens, so that the
/// parser can report them.
pub fn tokenize_complete(input: &str) -> Box<[Token]> {
    let mut lexer = tokenize(input);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        tokens.push(Token {
            span: lexer.span(),
            kind: result.unwrap_or(TokenKind::Unknown),
            lexeme: lexer.slice(),
        });
    }

    tokens.into_boxed_slice()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Compares the tokens produced by the tokenizer to the raw expected tokens.
    fn compare_tokens<'source, const N: usize>(input: &'source str, expected: [(TokenKind, &'source str); N]) {
        let tokens = tokenize_complete(input);
        assert_eq!(tokens.len(), N);

        for (token, (expected_kind, expected_lexeme)) in tokens.iter().zip(expected) {
            assert_eq!(token.kind, expected_kind);
            assert_eq!(token.lexeme, expected_lexeme);
        }
    }

    #[test]
    fn basic_expr() {
        compare_tokens(
            "1 + 2",
            [
                (TokenKind::Int, "1"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Add, "+"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Int, "2"),
            ],
        );
    }

    #[test]
    fn imaginary_and_keywords() {
        compare_tokens(
            "2.5i == x and not true",
            [
                (TokenKind::Imaginary, "2.5i"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Eq, "=="),
                (TokenKind::Whitespace, " "),
                (TokenKind::Name, "x"),
                (TokenKind::Whitespace, " "),
                (TokenKind::And, "and"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Not, "not"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Boolean, "true"),
            ],
        );
    }

    #[test]
    fn unknown_character() {
        compare_tokens(
            "x $ 1",
            [
                (TokenKind::Name, "x"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Unknown, "$"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Int, "1"),
            ],
        );
    }
}
