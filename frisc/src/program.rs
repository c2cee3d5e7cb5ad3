//! Assembled program image.
use crate::{
    constants::{Address, WORD_SIZE},
    instr::Instr,
};
use std::collections::HashMap;

/// One machine word of the program image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Instr(Instr),
    Data(i32),
}

/// Program image, loaded at address 0.
#[derive(Debug, Default, Clone)]
pub struct Program {
    pub(crate) cells: Vec<Cell>,
    pub(crate) labels: HashMap<String, Address>,
}

impl Program {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Size of the image in bytes.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.cells.len() * WORD_SIZE as usize
    }

    /// Address of a label.
    pub fn label(&self, name: &str) -> Option<Address> {
        self.labels.get(name).copied()
    }

    /// Cell at a byte address.
    pub fn cell_at(&self, address: Address) -> Option<&Cell> {
        if address % WORD_SIZE != 0 {
            return None;
        }
        self.cells.get((address / WORD_SIZE) as usize)
    }
}
