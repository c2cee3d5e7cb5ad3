//! Tokens

use crate::instr::{AluOp, Cond};
use std::fmt;

#[derive(Debug, Clone)]
pub struct Token {
    pub span: Span,
    pub kind: TokenKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum TokenKind {
    // Punctuation
    Comma,      // ,
    LeftParen,  // (
    RightParen, // )
    Plus,       // +
    Minus,      // -
    /// `\n` or `\r\n`, ends a statement.
    Newline,

    // ------------------------------------------------------------------------
    // Words
    /// Identifier starting in the first column, defining a label.
    Label,
    /// Identifier used as an operand, referring to a label.
    Ident,
    /// Mnemonic or directive.
    Keyword(Keyword),
    /// General purpose register R0-R7
    Register(u8),
    /// Number base marker `%B`, `%O`, `%D` or `%H`, holding the radix.
    Base(u32),
    /// Digits of a number literal, in any base.
    Number,

    // ------------------------------------------------------------------------
    /// Character the assembler has no use for.
    Unknown,
    EOF,
}

/// Parse a register name, `R0` to `R7`, or `SP` for `R7`.
pub fn parse_register(text: &str) -> Option<u8> {
    match text {
        "SP" | "sp" => Some(7),
        _ => {
            let digits = text.strip_prefix('R').or_else(|| text.strip_prefix('r'))?;
            match digits.parse::<u8>() {
                Ok(index) if index < 8 && digits.len() == 1 => Some(index),
                _ => None,
            }
        }
    }
}

/// Byte range of a token in the listing.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Span {
    pub index: u32,
    pub size: u32,
}

impl Span {
    pub fn new(index: u32, size: u32) -> Self {
        Self { index, size }
    }

    #[inline]
    pub fn fragment<'a>(&self, text: &'a str) -> &'a str {
        let start = self.index as usize;
        &text[start..start + self.size as usize]
    }

    /// Listing line holding the start of the span, with its line break,
    /// and the span of that line.
    pub fn surrounding_line<'a>(&self, text: &'a str) -> (&'a str, Span) {
        let index = (self.index as usize).min(text.len());

        let start = text[..index].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let end = text[index..].find('\n').map(|i| index + i + 1).unwrap_or(text.len());

        (&text[start..end], Span::new(start as u32, (end - start) as u32))
    }
}

/// Mnemonics and directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum Keyword {
    // ------------------------------------------------------------------------
    // Opcodes
    Move,           // MOVE
    Load,           // LOAD
    Store,          // STORE
    Push,           // PUSH
    Pop,            // POP
    Alu(AluOp),     // ADD SUB AND OR XOR
    Jump(Cond),     // JP, JP_cc
    Call(Cond),     // CALL, CALL_cc
    Return(Cond),   // RET, RET_cc
    Halt(Cond),     // HALT, HALT_cc

    // ------------------------------------------------------------------------
    // Directives
    DefineWord,     // DW
}

impl Keyword {
    /// Mnemonics are case insensitive. Control flow mnemonics
    /// take an optional `_cc` condition suffix.
    #[rustfmt::skip]
    pub fn parse(text: impl AsRef<str>) -> Option<Self> {
        let text = text.as_ref().to_ascii_uppercase();

        let (base, cond) = match text.split_once('_') {
            Some((base, suffix)) => (base, Some(Cond::parse(suffix)?)),
            None => (text.as_str(), None),
        };

        match (base, cond) {
            ("MOVE",  None) => Some(Self::Move),
            ("LOAD",  None) => Some(Self::Load),
            ("STORE", None) => Some(Self::Store),
            ("PUSH",  None) => Some(Self::Push),
            ("POP",   None) => Some(Self::Pop),
            ("ADD",   None) => Some(Self::Alu(AluOp::Add)),
            ("SUB",   None) => Some(Self::Alu(AluOp::Sub)),
            ("AND",   None) => Some(Self::Alu(AluOp::And)),
            ("OR",    None) => Some(Self::Alu(AluOp::Or)),
            ("XOR",   None) => Some(Self::Alu(AluOp::Xor)),
            ("DW",    None) => Some(Self::DefineWord),
            // ----------------------------------------------------------------
            ("JP",   cond) => Some(Self::Jump(cond.unwrap_or(Cond::Always))),
            ("CALL", cond) => Some(Self::Call(cond.unwrap_or(Cond::Always))),
            ("RET",  cond) => Some(Self::Return(cond.unwrap_or(Cond::Always))),
            ("HALT", cond) => Some(Self::Halt(cond.unwrap_or(Cond::Always))),
            // ----------------------------------------------------------------
            _ => None,
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (name, cond) = match self {
            Self::Move => ("MOVE", Cond::Always),
            Self::Load => ("LOAD", Cond::Always),
            Self::Store => ("STORE", Cond::Always),
            Self::Push => ("PUSH", Cond::Always),
            Self::Pop => ("POP", Cond::Always),
            Self::Alu(op) => return write!(f, "{op}"),
            Self::Jump(cond) => ("JP", *cond),
            Self::Call(cond) => ("CALL", *cond),
            Self::Return(cond) => ("RET", *cond),
            Self::Halt(cond) => ("HALT", *cond),
            Self::DefineWord => ("DW", Cond::Always),
        };

        match cond {
            Cond::Always => write!(f, "{name}"),
            cond => write!(f, "{name}_{cond}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_span_fragment() {
        const CODE: &str = "MOVE %D 12, R0";

        let spans = &[
            Span::new(0, 4),  // MOVE
            Span::new(5, 2),  // %D
            Span::new(8, 2),  // 12
            Span::new(10, 1), // ,
            Span::new(12, 2), // R0
        ];

        assert_eq!(spans[0].fragment(CODE), "MOVE");
        assert_eq!(spans[1].fragment(CODE), "%D");
        assert_eq!(spans[2].fragment(CODE), "12");
        assert_eq!(spans[3].fragment(CODE), ",");
        assert_eq!(spans[4].fragment(CODE), "R0");
    }

    #[test]
    fn test_span_line() {
        const CODE: &str = "  HALT\nV0  DW 0\n  JP V0";

        let span = Span::new(11, 2);
        assert_eq!(span.fragment(CODE), "DW");

        let (line, line_span) = span.surrounding_line(CODE);
        assert_eq!(line, "V0  DW 0\n");
        assert_eq!(line_span, Span::new(7, 9));

        // Last line has no line break.
        let (line, _) = Span::new(19, 2).surrounding_line(CODE);
        assert_eq!(line, "  JP V0");
    }

    #[test]
    fn test_keyword_conditions() {
        assert_eq!(Keyword::parse("JP_N"), Some(Keyword::Jump(Cond::N)));
        assert_eq!(Keyword::parse("jp_nn"), Some(Keyword::Jump(Cond::NN)));
        assert_eq!(Keyword::parse("CALL"), Some(Keyword::Call(Cond::Always)));
        assert_eq!(Keyword::parse("RET_Z"), Some(Keyword::Return(Cond::Z)));
        assert_eq!(Keyword::parse("ADD"), Some(Keyword::Alu(AluOp::Add)));
        // Conditions only apply to control flow.
        assert_eq!(Keyword::parse("ADD_Z"), None);
        // Labels that look like mnemonics with a suffix.
        assert_eq!(Keyword::parse("MUL_RET"), None);
        assert_eq!(Keyword::parse("JP_X"), None);

        assert_eq!(Keyword::Jump(Cond::NN).to_string(), "JP_NN");
        assert_eq!(Keyword::Halt(Cond::Always).to_string(), "HALT");
    }

    #[test]
    fn test_registers() {
        assert_eq!(parse_register("R0"), Some(0));
        assert_eq!(parse_register("r7"), Some(7));
        assert_eq!(parse_register("SP"), Some(7));
        assert_eq!(parse_register("R8"), None);
        assert_eq!(parse_register("R07"), None);
        assert_eq!(parse_register("RET"), None);
    }
}
