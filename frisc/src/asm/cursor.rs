//! Character scanner.
use std::str::CharIndices;

/// Character returned when the cursor is past the end of the source.
pub const EOF_CHAR: char = '\0';

/// Scans characters of the source, keeping one character of look ahead.
///
/// `current` is the character most recently advanced to. The cursor
/// starts before the first character, so it must be primed with
/// [`Cursor::next`] before use.
pub struct Cursor<'a> {
    chars: CharIndices<'a>,
    /// Byte offset and character at the cursor.
    current: (u32, char),
    /// Byte offset and character after the cursor.
    peek: (u32, char),
    source_len: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(source_code: &'a str) -> Self {
        let source_len = source_code.len() as u32;
        let mut chars = source_code.char_indices();
        let peek = chars
            .next()
            .map(|(i, c)| (i as u32, c))
            .unwrap_or((source_len, EOF_CHAR));

        Self {
            chars,
            current: (0, EOF_CHAR),
            peek,
            source_len,
        }
    }

    /// Advance to the next character and return it.
    pub fn next(&mut self) -> char {
        self.current = self.peek;
        self.peek = self
            .chars
            .next()
            .map(|(i, c)| (i as u32, c))
            .unwrap_or((self.source_len, EOF_CHAR));
        self.current.1
    }

    /// Advance to the next character, without returning it.
    #[inline]
    pub fn next_char(&mut self) {
        self.next();
    }

    #[inline]
    pub fn current(&self) -> char {
        self.current.1
    }

    #[inline]
    pub fn peek(&self) -> char {
        self.peek.1
    }

    /// Byte offset of the current character.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.current.0
    }

    /// Byte offset of the look ahead character.
    #[inline]
    pub fn peek_offset(&self) -> u32 {
        self.peek.0
    }

    /// The current character is past the end of the source.
    #[inline]
    pub fn at_end(&self) -> bool {
        self.current.0 >= self.source_len
    }
}
