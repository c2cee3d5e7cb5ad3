//! CPU and memory state.
use crate::{
    constants::*,
    instr::{Flags, Instr},
};

/// Core state for a FRISC interpreter.
pub struct FriscCpu {
    // ------------------------------------------------------------------------
    // Registers
    /// Program counter, the byte address of the next instruction.
    pub(crate) pc: Address,
    /// General purpose registers. R7 doubles as the stack pointer.
    pub(crate) registers: [i32; REGISTER_COUNT],
    /// Status register.
    pub(crate) flags: Flags,

    // ------------------------------------------------------------------------
    // Memory
    /// Main memory, one entry per word.
    pub(crate) ram: Box<[i32]>,
    /// Decoded instruction of every word of the loaded program.
    pub(crate) code: Vec<Option<Instr>>,

    // ------------------------------------------------------------------------
    // Control
    /// Set when a `HALT` instruction executes.
    pub(crate) halted: bool,
}

impl FriscCpu {
    pub fn new(mem_size: usize) -> Self {
        Self {
            pc: 0,
            registers: [0; REGISTER_COUNT],
            flags: Flags::default(),
            ram: vec![0; mem_size / WORD_SIZE as usize].into_boxed_slice(),
            code: vec![],
            halted: false,
        }
    }

    /// Erase memory and registers.
    pub(crate) fn clear(&mut self) {
        self.pc = 0;
        self.registers = [0; REGISTER_COUNT];
        self.flags = Flags::default();
        self.ram.fill(0);
        self.code.clear();
        self.halted = false;
    }

    /// Memory size in bytes.
    #[inline]
    pub fn mem_size(&self) -> usize {
        self.ram.len() * WORD_SIZE as usize
    }

    /// Word index of a byte address, if it's aligned and in range.
    #[inline]
    pub(crate) fn word_index(&self, address: Address) -> Option<usize> {
        let index = (address / WORD_SIZE) as usize;
        if address % WORD_SIZE == 0 && index < self.ram.len() {
            Some(index)
        } else {
            None
        }
    }

    pub fn read_word(&self, address: Address) -> Option<i32> {
        self.word_index(address).map(|index| self.ram[index])
    }

    pub(crate) fn write_word(&mut self, address: Address, value: i32) -> Option<()> {
        let index = self.word_index(address)?;
        self.ram[index] = value;
        Some(())
    }

    #[inline(always)]
    pub(crate) fn reg(&self, index: u8) -> i32 {
        self.registers[index as usize & 0x7]
    }

    #[inline(always)]
    pub(crate) fn set_reg(&mut self, index: u8, value: i32) {
        self.registers[index as usize & 0x7] = value;
    }

    #[inline(always)]
    pub(crate) fn sp(&self) -> Address {
        self.registers[SP] as Address
    }

    #[inline(always)]
    pub(crate) fn set_sp(&mut self, address: Address) {
        self.registers[SP] = address as i32;
    }
}
