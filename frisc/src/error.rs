//! Result and errors.
use crate::{asm::Span, constants::Address};
use std::{
    fmt::{self, Display, Formatter},
    io,
};

pub type FriscResult<T> = std::result::Result<T, FriscError>;

#[derive(Debug)]
pub enum FriscError {
    /// Listing could not be assembled.
    Asm(AsmError),
    /// VM error during interpreter loop.
    Runtime { pc: Address, message: &'static str },
    /// Program did not halt within the given number of steps.
    StepLimit(usize),
    /// Program does not fit in VM memory.
    LargeProgram,
    Io(io::Error),
}

impl Display for FriscError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asm(err) => write!(f, "{}", err),
            Self::Runtime { pc, message } => write!(f, "runtime error at {:#X}: {}", pc, message),
            Self::StepLimit(steps) => write!(f, "program did not halt after {} steps", steps),
            Self::LargeProgram => write!(f, "program too large for VM memory"),
            Self::Io(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for FriscError {}

impl From<AsmError> for FriscError {
    fn from(err: AsmError) -> Self {
        FriscError::Asm(err)
    }
}

impl From<io::Error> for FriscError {
    fn from(err: io::Error) -> Self {
        FriscError::Io(err)
    }
}

/// Error in the assembly listing, with the offending line for context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsmError {
    pub message: String,
    /// 1-based line number.
    pub line_no: usize,
    /// Source text of the offending line, without the line break.
    pub line: String,
    pub span: Span,
}

impl AsmError {
    pub fn new(source_code: &str, span: Span, message: impl ToString) -> Self {
        let (line, _) = span.surrounding_line(source_code);
        let preceding = source_code.get(..span.index as usize).unwrap_or(source_code);
        let line_no = preceding.matches('\n').count() + 1;

        Self {
            message: message.to_string(),
            line_no,
            line: line.trim_end_matches(&['\r', '\n'][..]).to_owned(),
            span,
        }
    }
}

impl Display for AsmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "assembler error on line {}: {}", self.line_no, self.message)?;
        write!(f, "    {}", self.line)
    }
}

impl std::error::Error for AsmError {}
