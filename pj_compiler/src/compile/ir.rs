//! FRISC listing lines.
use super::storage::SlotKey;
use smol_str::SmolStr;
use std::fmt;

/// General purpose register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reg(pub u8);

impl Reg {
    pub const R0: Reg = Reg(0);
    pub const R1: Reg = Reg(1);
    pub const R2: Reg = Reg(2);
    /// Holds the program result on halt.
    pub const RESULT: Reg = Reg(6);
    /// Stack pointer.
    pub const SP: Reg = Reg(7);
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// Jump condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    /// Negative
    N,
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Cond::N => f.write_str("N"),
        }
    }
}

/// One line of the generated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    /// Banner comment separating listing sections.
    Banner(&'static str),
    /// `MOVE <hex>, R7` at the start of the program.
    InitStack(u32),
    /// Label on a line of its own, marking the next instruction.
    Label(SmolStr),
    /// `MOVE %D n, Rx`
    MoveDec(i32, Reg),
    /// `LOAD Rx, (label)`
    Load(Reg, SmolStr),
    /// `STORE Rx, (label)`
    Store(Reg, SmolStr),
    /// `LOAD Rx, (R7)`
    LoadTop(Reg),
    /// `STORE Rx, (R7)`
    StoreTop(Reg),
    /// `ADD Rx, Ry, Rz`
    Add(Reg, Reg, Reg),
    /// `SUB Rx, Ry, Rz`
    Sub(Reg, Reg, Reg),
    /// `ADD Rx, imm, Rz`
    AddImm(Reg, i32, Reg),
    /// `SUB Rx, imm, Rz`
    SubImm(Reg, i32, Reg),
    /// `XOR Rx, imm, Rz`
    XorImm(Reg, i32, Reg),
    /// `CALL label`
    Call(&'static str),
    /// `JP label` or `JP_cc label`
    Jump(Option<Cond>, SmolStr),
    Halt,
    /// Zeroed data word for a storage slot.
    Data(SmolStr, SlotKey),
}

/// Outputs the instruction as a listing line.
impl fmt::Display for Instr {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Instr::Banner(title)          => write!(f, "; ========== {title} ==========="),
            Instr::InitStack(top)         => write!(f, "    MOVE {top:X}, {}   ; init stack", Reg::SP),
            Instr::Label(label)           => write!(f, "{label}"),
            Instr::MoveDec(value, rx)     => write!(f, "  MOVE %D {value}, {rx}"),
            Instr::Load(rx, label)        => write!(f, "  LOAD {rx}, ({label})"),
            Instr::Store(rx, label)       => write!(f, "  STORE {rx}, ({label})"),
            Instr::LoadTop(rx)            => write!(f, "  LOAD {rx}, ({})", Reg::SP),
            Instr::StoreTop(rx)           => write!(f, "  STORE {rx}, ({})", Reg::SP),
            Instr::Add(rx, ry, rz)        => write!(f, "  ADD {rx}, {ry}, {rz}"),
            Instr::Sub(rx, ry, rz)        => write!(f, "  SUB {rx}, {ry}, {rz}"),
            Instr::AddImm(rx, imm, rz)    => write!(f, "  ADD {rx}, {imm}, {rz}"),
            Instr::SubImm(rx, imm, rz)    => write!(f, "  SUB {rx}, {imm}, {rz}"),
            Instr::XorImm(rx, imm, rz)    => write!(f, "  XOR {rx}, {imm}, {rz}"),
            Instr::Call(label)            => write!(f, "  CALL {label}"),
            Instr::Jump(None, label)      => write!(f, "  JP {label}"),
            Instr::Jump(Some(cc), label)  => write!(f, "  JP_{cc} {label}"),
            Instr::Halt                   => write!(f, "  HALT"),
            Instr::Data(label, key)       => write!(f, "{label}  DW 0   ; {key}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_listing_text() {
        assert_eq!(Instr::InitStack(0x40000).to_string(), "    MOVE 40000, R7   ; init stack");
        assert_eq!(Instr::MoveDec(-12, Reg::R0).to_string(), "  MOVE %D -12, R0");
        assert_eq!(Instr::StoreTop(Reg::R2).to_string(), "  STORE R2, (R7)");
        assert_eq!(Instr::SubImm(Reg::SP, 4, Reg::SP).to_string(), "  SUB R7, 4, R7");
        assert_eq!(Instr::XorImm(Reg::R0, -1, Reg::R0).to_string(), "  XOR R0, -1, R0");
        assert_eq!(Instr::Jump(Some(Cond::N), "END_0".into()).to_string(), "  JP_N END_0");
        assert_eq!(
            Instr::Data("V3".into(), SlotKey::new("i", 2)).to_string(),
            "V3  DW 0   ; var=i, scope=2"
        );
    }
}
