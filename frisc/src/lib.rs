//! Simulator for the FRISC processor, used to execute generated listings.
pub mod asm;
pub mod constants;
mod cpu;
mod error;
pub mod instr;
mod program;
mod vm;

pub use self::{
    asm::assemble,
    error::AsmError,
    program::Cell,
    vm::Flow,
};

use std::path::Path;

/// Read and assemble a listing file.
pub fn load_file(path: impl AsRef<Path>) -> error::FriscResult<program::Program> {
    let source = std::fs::read_to_string(path)?;
    assemble(source)
}

pub mod prelude {
    pub use super::{
        cpu::FriscCpu,
        error::{FriscError, FriscResult},
        program::Program,
        vm::{FriscConf, FriscVm},
    };
}
