mod ast;
mod builder;
mod codegen;
mod ir;
mod runtime;
mod scope;
mod storage;

pub use ast::{Assign, BinOp, BinaryExpr, Expr, ForLoop, Program, Reference, Stmt, UnaryOp, VarRef};
pub use builder::{AstBuilder, SemanticError, StructuralError};
pub use codegen::CodeGen;
pub use ir::{Cond, Instr, Reg};
pub use runtime::RUNTIME;
pub use scope::{ScopeEntry, ScopePolicy, ScopeTable};
pub use storage::{Slot, SlotKey, StorageMap};

use crate::{
    parsing::{DecodeError, SyntaxError},
    tokens::TokenError,
};
use serde::Deserialize;
use std::{error, fmt};

pub type CompileResult<T> = Result<T, CompileError>;

/// Options for one compilation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompilerConf {
    /// Variable whose value is left in R6 when the program halts.
    pub result_var: String,
    /// Initial stack pointer.
    pub stack_top: u32,
    pub scope_policy: ScopePolicy,
    /// Report references to undeclared names as errors.
    ///
    /// When disabled, such names are given global storage by the
    /// code generator instead.
    pub check_undefined: bool,
}

impl Default for CompilerConf {
    fn default() -> Self {
        Self {
            result_var: "rez".to_owned(),
            stack_top: 0x40000,
            scope_policy: ScopePolicy::default(),
            check_undefined: true,
        }
    }
}

/// State of a single compilation.
///
/// Owned by the caller and lent to each stage in turn, so
/// separate compilations never share any state.
#[derive(Debug, Default)]
pub struct CompilerContext {
    pub conf: CompilerConf,
    pub scopes: ScopeTable,
    pub storage: StorageMap,
    /// Number of loops that have been given labels.
    pub labels: u32,
}

impl CompilerContext {
    pub fn new(conf: CompilerConf) -> Self {
        Self {
            scopes: ScopeTable::new(conf.scope_policy),
            storage: StorageMap::new(),
            labels: 0,
            conf,
        }
    }

    /// Take the next loop label number.
    #[inline]
    pub fn next_label(&mut self) -> u32 {
        let label = self.labels;
        self.labels += 1;
        label
    }
}

#[derive(Debug)]
pub enum CompileError {
    Token(TokenError),
    Syntax(SyntaxError),
    Decode(DecodeError),
    Semantic(SemanticError),
    Structural(StructuralError),
}

impl CompileError {
    /// Single line diagnostic in the pipeline's output format,
    /// for the errors that have one.
    pub fn diagnostic(&self) -> Option<String> {
        match self {
            CompileError::Syntax(err) => Some(err.diagnostic()),
            CompileError::Semantic(err) => Some(err.diagnostic()),
            _ => None,
        }
    }
}

impl error::Error for CompileError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            CompileError::Token(err) => Some(err),
            CompileError::Syntax(err) => Some(err),
            CompileError::Decode(err) => Some(err),
            CompileError::Semantic(err) => Some(err),
            CompileError::Structural(err) => Some(err),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompileError::Token(err) => write!(f, "token error: {err}"),
            CompileError::Syntax(err) => fmt::Display::fmt(err, f),
            CompileError::Decode(err) => fmt::Display::fmt(err, f),
            CompileError::Semantic(err) => write!(f, "semantic error: {err}"),
            CompileError::Structural(err) => write!(f, "structural error: {err}"),
        }
    }
}

impl From<TokenError> for CompileError {
    fn from(err: TokenError) -> Self {
        CompileError::Token(err)
    }
}

impl From<SyntaxError> for CompileError {
    fn from(err: SyntaxError) -> Self {
        CompileError::Syntax(err)
    }
}

impl From<DecodeError> for CompileError {
    fn from(err: DecodeError) -> Self {
        CompileError::Decode(err)
    }
}

impl From<SemanticError> for CompileError {
    fn from(err: SemanticError) -> Self {
        CompileError::Semantic(err)
    }
}

impl From<StructuralError> for CompileError {
    fn from(err: StructuralError) -> Self {
        CompileError::Structural(err)
    }
}
