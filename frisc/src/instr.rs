//! Decoded instructions.
use crate::constants::Address;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instr {
    /// `MOVE src, Rd`
    Move { src: Operand, dst: u8 },
    /// `op Rs, src, Rd`
    Alu { op: AluOp, lhs: u8, rhs: Operand, dst: u8 },
    /// `LOAD Rd, (addr)`
    Load { dst: u8, addr: Addr },
    /// `STORE Rs, (addr)`
    Store { src: u8, addr: Addr },
    /// `PUSH Rs`
    Push(u8),
    /// `POP Rd`
    Pop(u8),
    /// `JP_cc target`
    Jump { cond: Cond, target: Addr },
    /// `CALL_cc target`
    Call { cond: Cond, target: Addr },
    /// `RET_cc`
    Return(Cond),
    /// `HALT_cc`
    Halt(Cond),
}

impl Instr {
    /// Replace the memory address of an instruction that refers
    /// to a label, once the label's address is known.
    pub(crate) fn set_address(&mut self, address: Address) {
        match self {
            Instr::Load { addr, .. }
            | Instr::Store { addr, .. }
            | Instr::Jump { target: addr, .. }
            | Instr::Call { target: addr, .. } => *addr = Addr::Abs(address),
            _ => {}
        }
    }
}

/// Second source operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Reg(u8),
    Imm(i32),
}

/// Memory address operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addr {
    /// Absolute address, from a number or a resolved label.
    Abs(Address),
    /// Register plus signed offset.
    Reg(u8, i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Sub,
    And,
    Or,
    Xor,
}

impl fmt::Display for AluOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AluOp::Add => write!(f, "ADD"),
            AluOp::Sub => write!(f, "SUB"),
            AluOp::And => write!(f, "AND"),
            AluOp::Or => write!(f, "OR"),
            AluOp::Xor => write!(f, "XOR"),
        }
    }
}

/// Condition of a control flow instruction, tested against the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum Cond {
    Always,
    N,   // negative
    NN,  // not negative
    M,   // minus, same as N
    P,   // plus, same as NN
    Z,   // zero
    NZ,  // not zero
    C,   // carry
    NC,  // no carry
    V,   // overflow
    NV,  // no overflow
    EQ,  // equal
    NE,  // not equal
    ULT, // unsigned <
    ULE, // unsigned <=
    UGT, // unsigned >
    UGE, // unsigned >=
    SLT, // signed <
    SLE, // signed <=
    SGT, // signed >
    SGE, // signed >=
}

impl Cond {
    #[rustfmt::skip]
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "N"   => Some(Cond::N),
            "NN"  => Some(Cond::NN),
            "M"   => Some(Cond::M),
            "P"   => Some(Cond::P),
            "Z"   => Some(Cond::Z),
            "NZ"  => Some(Cond::NZ),
            "C"   => Some(Cond::C),
            "NC"  => Some(Cond::NC),
            "V"   => Some(Cond::V),
            "NV"  => Some(Cond::NV),
            "EQ"  => Some(Cond::EQ),
            "NE"  => Some(Cond::NE),
            "ULT" => Some(Cond::ULT),
            "ULE" => Some(Cond::ULE),
            "UGT" => Some(Cond::UGT),
            "UGE" => Some(Cond::UGE),
            "SLT" => Some(Cond::SLT),
            "SLE" => Some(Cond::SLE),
            "SGT" => Some(Cond::SGT),
            "SGE" => Some(Cond::SGE),
            _     => None,
        }
    }

    /// Evaluate the condition against the status flags.
    #[rustfmt::skip]
    pub fn test(&self, flags: Flags) -> bool {
        let Flags { n, z, c, v } = flags;
        match self {
            Cond::Always         => true,
            Cond::N   | Cond::M  => n,
            Cond::NN  | Cond::P  => !n,
            Cond::Z   | Cond::EQ => z,
            Cond::NZ  | Cond::NE => !z,
            Cond::C   | Cond::UGE => c,
            Cond::NC  | Cond::ULT => !c,
            Cond::V              => v,
            Cond::NV             => !v,
            Cond::ULE            => !c || z,
            Cond::UGT            => c && !z,
            Cond::SLT            => n != v,
            Cond::SGE            => n == v,
            Cond::SLE            => n != v || z,
            Cond::SGT            => n == v && !z,
        }
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Variant names are the mnemonic suffixes.
        match self {
            Cond::Always => Ok(()),
            cond => write!(f, "{cond:?}"),
        }
    }
}

/// Status register flags.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    /// Negative
    pub n: bool,
    /// Zero
    pub z: bool,
    /// Carry, set on subtraction when there was no borrow.
    pub c: bool,
    /// Signed overflow
    pub v: bool,
}
