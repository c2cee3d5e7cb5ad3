//! Listing scanner.
use super::{
    cursor::{Cursor, EOF_CHAR},
    tokens::{parse_register, Keyword, Span, Token, TokenKind},
};

/// Splits a FRISC listing into tokens.
///
/// Whitespace and `;` comments are dropped, but line breaks are kept
/// as tokens because every statement occupies exactly one line.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    source: &'a str,
    /// Byte offset where the token being scanned begins.
    token_start: u32,
    /// Byte offset of column 0 on the current line.
    line_start: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        let mut cursor = Cursor::new(source_code);

        // Step onto the first character.
        cursor.next();
        let offset = cursor.offset();

        Self {
            cursor,
            source: source_code,
            token_start: offset,
            line_start: offset,
        }
    }

    pub fn source_code(&self) -> &'a str {
        self.source
    }

    /// Scan one token.
    ///
    /// The cursor rests on the first character after the
    /// returned token.
    pub fn next_token(&mut self) -> Token {
        use TokenKind as TK;

        while is_blank(self.cursor.current()) {
            self.cursor.next_char();
        }

        if self.cursor.current() == ';' {
            self.skip_comment();
        }

        self.token_start = self.cursor.offset();

        match self.cursor.current() {
            '\r' => {
                if self.cursor.peek() == '\n' {
                    self.cursor.next();
                }
                self.newline()
            }
            '\n' => self.newline(),
            ',' => self.single(TK::Comma),
            '(' => self.single(TK::LeftParen),
            ')' => self.single(TK::RightParen),
            '+' => self.single(TK::Plus),
            '-' => self.single(TK::Minus),
            '%' => self.base_marker(),
            c if c.is_ascii_digit() => self.number(),
            c if is_word_start(c) => self.word(),
            EOF_CHAR if self.cursor.at_end() => self.single(TK::EOF),
            _ => self.single(TK::Unknown),
        }
    }

    fn token_span(&self) -> Span {
        let end = self.cursor.peek_offset();
        debug_assert!(end >= self.token_start);
        Span::new(self.token_start, end - self.token_start)
    }

    /// Finish the token ending at the cursor and step past it.
    fn single(&mut self, kind: TokenKind) -> Token {
        let span = self.token_span();
        self.cursor.next();
        Token { span, kind }
    }

    fn newline(&mut self) -> Token {
        let token = self.single(TokenKind::Newline);
        self.line_start = self.cursor.offset();
        token
    }

    /// Drop everything up to the line break.
    fn skip_comment(&mut self) {
        while !matches!(self.cursor.current(), '\r' | '\n') && !self.cursor.at_end() {
            self.cursor.next();
        }
    }

    /// Label, mnemonic, register or label reference.
    ///
    /// Any word in column 0 defines a label, even one
    /// spelled like a mnemonic.
    fn word(&mut self) -> Token {
        while is_word_part(self.cursor.peek()) {
            self.cursor.next();
        }

        let text = self.token_span().fragment(self.source);
        let kind = if self.token_start == self.line_start {
            TokenKind::Label
        } else if let Some(keyword) = Keyword::parse(text) {
            TokenKind::Keyword(keyword)
        } else if let Some(register) = parse_register(text) {
            TokenKind::Register(register)
        } else {
            TokenKind::Ident
        };

        self.single(kind)
    }

    /// `%B`, `%O`, `%D` or `%H`.
    fn base_marker(&mut self) -> Token {
        let radix = match self.cursor.peek().to_ascii_uppercase() {
            'B' => 2,
            'O' => 8,
            'D' => 10,
            'H' => 16,
            _ => return self.single(TokenKind::Unknown),
        };
        self.cursor.next();

        self.single(TokenKind::Base(radix))
    }

    /// Digits are scanned as hex regardless of the base in effect.
    /// The assembler rejects digits that don't fit the radix.
    fn number(&mut self) -> Token {
        while self.cursor.peek().is_ascii_hexdigit() {
            self.cursor.next();
        }

        self.single(TokenKind::Number)
    }
}

/// Whitespace within a line.
fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{00A0}' | '\u{FEFF}')
}

fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_word_part(c: char) -> bool {
    is_word_start(c) || c.is_ascii_digit()
}

impl<'a> IntoIterator for Lexer<'a> {
    type Item = Token;
    type IntoIter = LexerIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        LexerIter {
            lexer: self,
            finished: false,
        }
    }
}

/// Yields tokens up to and including a single `EOF`.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct LexerIter<'a> {
    lexer: Lexer<'a>,
    finished: bool,
}

impl<'a> Iterator for LexerIter<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let token = self.lexer.next_token();
        self.finished = token.kind == TokenKind::EOF;
        Some(token)
    }
}
