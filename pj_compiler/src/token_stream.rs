//! Token stream input of the parser.
use crate::tokens::{Token, TokenError, TokenKind};

use std::{iter::Peekable, vec::IntoIter};

/// Tokens in source order with one token of look ahead.
///
/// The scanner runs upstream, so the whole stream is read
/// up front and the parser consumes it front to back.
pub struct TokenStream {
    tokens: Peekable<IntoIter<Token>>,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_iter().peekable(),
        }
    }

    /// Read a token stream from its text format, one
    /// `kind line lexeme` record per line.
    ///
    /// Blank lines are skipped.
    pub fn from_text(text: &str) -> Result<Self, TokenError> {
        let tokens = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                line.parse::<Token>()
                    .map_err(|err| TokenError::AtLine(index + 1, Box::new(err)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::trace!("read {} tokens", tokens.len());

        Ok(Self::new(tokens))
    }

    /// Take the token under the cursor.
    ///
    /// `None` once the stream is exhausted.
    #[inline]
    pub fn next_token(&mut self) -> Option<Token> {
        self.tokens.next()
    }

    #[inline]
    pub fn peek(&mut self) -> Option<&Token> {
        self.tokens.peek()
    }

    /// Kind of the look ahead token, `None` at the end of input.
    #[inline]
    pub fn peek_kind(&mut self) -> Option<TokenKind> {
        self.tokens.peek().map(|token| token.kind)
    }

    #[inline]
    pub fn at_end(&mut self) -> bool {
        self.tokens.peek().is_none()
    }
}
