//! Assembler
mod assembler;
mod cursor;
mod lexer;
mod tokens;

use crate::{error::FriscResult, program::Program};

/// Assemble a FRISC listing into a program image.
pub fn assemble(source_code: impl AsRef<str>) -> FriscResult<Program> {
    let lexer = Lexer::new(source_code.as_ref());
    let asm = Assembler::new(lexer);
    asm.parse()
}

pub use self::{
    assembler::Assembler,
    lexer::Lexer,
    tokens::{Keyword, Span, Token, TokenKind},
};
