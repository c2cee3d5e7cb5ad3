//! Virtual machine.
use crate::{
    constants::*,
    cpu::FriscCpu,
    error::{FriscError, FriscResult},
    instr::{Addr, AluOp, Flags, Instr, Operand},
    program::{Cell, Program},
};

pub struct FriscVm {
    cpu: FriscCpu,
    /// Number of instructions executed since the program was loaded.
    steps: usize,
    conf: FriscConf,
}

/// VM Configuration Parameters.
#[derive(Debug, Clone)]
pub struct FriscConf {
    /// Memory size in bytes.
    pub mem_size: usize,
}

impl Default for FriscConf {
    fn default() -> Self {
        Self { mem_size: MEM_SIZE }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Ok,
    /// Program counter has jumped to a new address.
    ///
    /// Returned for taken `JP`, `CALL` and `RET` instructions.
    Jump,
    /// A `HALT` instruction executed, or the machine was already halted.
    Halt,
}

impl FriscVm {
    pub fn new(conf: FriscConf) -> Self {
        FriscVm {
            cpu: FriscCpu::new(conf.mem_size),
            steps: 0,
            conf,
        }
    }

    /// Configuration that was used to instantiate the VM.
    pub fn config(&self) -> &FriscConf {
        &self.conf
    }

    /// Load an assembled program at address 0 and reset the machine.
    pub fn load_program(&mut self, program: &Program) -> FriscResult<()> {
        if program.byte_len() > self.cpu.mem_size() {
            return Err(FriscError::LargeProgram);
        }

        // Start with clean memory to avoid leaking previous program.
        self.cpu.clear();
        self.steps = 0;

        for (index, cell) in program.cells().iter().enumerate() {
            match cell {
                Cell::Instr(instr) => {
                    self.cpu.code.push(Some(*instr));
                }
                Cell::Data(value) => {
                    self.cpu.code.push(None);
                    self.cpu.ram[index] = *value;
                }
            }
        }

        log::debug!("loaded program of {} bytes", program.byte_len());

        Ok(())
    }

    /// Value of a general purpose register.
    pub fn register(&self, index: u8) -> i32 {
        self.cpu.reg(index)
    }

    /// Word at a byte address, or `None` if the address is misaligned
    /// or outside memory.
    pub fn read_word(&self, address: Address) -> Option<i32> {
        self.cpu.read_word(address)
    }

    pub fn flags(&self) -> Flags {
        self.cpu.flags
    }

    pub fn pc(&self) -> Address {
        self.cpu.pc
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn is_halted(&self) -> bool {
        self.cpu.halted
    }
}

/// Interpreter
impl FriscVm {
    /// Run until the program halts.
    ///
    /// Returns the number of executed instructions, or an error if the
    /// program is still running after `step_limit` instructions.
    pub fn run(&mut self, step_limit: usize) -> FriscResult<usize> {
        while !self.cpu.halted {
            if self.steps >= step_limit {
                return Err(FriscError::StepLimit(step_limit));
            }
            self.step()?;
        }

        log::debug!("halted after {} steps", self.steps);

        Ok(self.steps)
    }

    /// Execute one instruction.
    pub fn step(&mut self) -> FriscResult<Flow> {
        if self.cpu.halted {
            return Ok(Flow::Halt);
        }

        let pc = self.cpu.pc;
        let instr = self.fetch(pc)?;

        #[cfg(feature = "op_trace")]
        op_trace(pc, &instr);

        self.cpu.pc = pc.wrapping_add(WORD_SIZE);
        self.steps += 1;

        let flow = match instr {
            Instr::Move { src, dst } => {
                let value = self.operand(src);
                self.cpu.set_reg(dst, value);
                Flow::Ok
            }
            Instr::Alu { op, lhs, rhs, dst } => {
                let (result, flags) = alu(op, self.cpu.reg(lhs), self.operand(rhs));
                self.cpu.set_reg(dst, result);
                self.cpu.flags = flags;
                Flow::Ok
            }
            Instr::Load { dst, addr } => {
                let address = self.address(addr);
                let value = self
                    .cpu
                    .read_word(address)
                    .ok_or_else(|| runtime_error(pc, "invalid memory read"))?;
                self.cpu.set_reg(dst, value);
                Flow::Ok
            }
            Instr::Store { src, addr } => {
                let address = self.address(addr);
                let value = self.cpu.reg(src);
                self.cpu
                    .write_word(address, value)
                    .ok_or_else(|| runtime_error(pc, "invalid memory write"))?;
                Flow::Ok
            }
            Instr::Push(src) => {
                let value = self.cpu.reg(src);
                self.push(pc, value)?;
                Flow::Ok
            }
            Instr::Pop(dst) => {
                let value = self.pop(pc)?;
                self.cpu.set_reg(dst, value);
                Flow::Ok
            }
            Instr::Jump { cond, target } => {
                if cond.test(self.cpu.flags) {
                    self.cpu.pc = self.address(target);
                    Flow::Jump
                } else {
                    Flow::Ok
                }
            }
            Instr::Call { cond, target } => {
                if cond.test(self.cpu.flags) {
                    let target = self.address(target);
                    self.push(pc, self.cpu.pc as i32)?;
                    self.cpu.pc = target;
                    Flow::Jump
                } else {
                    Flow::Ok
                }
            }
            Instr::Return(cond) => {
                if cond.test(self.cpu.flags) {
                    self.cpu.pc = self.pop(pc)? as Address;
                    Flow::Jump
                } else {
                    Flow::Ok
                }
            }
            Instr::Halt(cond) => {
                if cond.test(self.cpu.flags) {
                    self.cpu.halted = true;
                    Flow::Halt
                } else {
                    Flow::Ok
                }
            }
        };

        Ok(flow)
    }

    fn fetch(&self, pc: Address) -> FriscResult<Instr> {
        let index = self
            .cpu
            .word_index(pc)
            .ok_or_else(|| runtime_error(pc, "program counter out of range"))?;

        self.cpu
            .code
            .get(index)
            .copied()
            .flatten()
            .ok_or_else(|| runtime_error(pc, "no instruction at program counter"))
    }

    #[inline]
    fn operand(&self, operand: Operand) -> i32 {
        match operand {
            Operand::Reg(index) => self.cpu.reg(index),
            Operand::Imm(value) => value,
        }
    }

    #[inline]
    fn address(&self, addr: Addr) -> Address {
        match addr {
            Addr::Abs(address) => address,
            Addr::Reg(index, offset) => (self.cpu.reg(index) as Address).wrapping_add(offset as Address),
        }
    }

    fn push(&mut self, pc: Address, value: i32) -> FriscResult<()> {
        let sp = self.cpu.sp().wrapping_sub(WORD_SIZE);
        self.cpu
            .write_word(sp, value)
            .ok_or_else(|| runtime_error(pc, "stack overflow"))?;
        self.cpu.set_sp(sp);
        Ok(())
    }

    fn pop(&mut self, pc: Address) -> FriscResult<i32> {
        let sp = self.cpu.sp();
        let value = self
            .cpu
            .read_word(sp)
            .ok_or_else(|| runtime_error(pc, "stack underflow"))?;
        self.cpu.set_sp(sp.wrapping_add(WORD_SIZE));
        Ok(value)
    }
}

/// Arithmetic and logic unit.
///
/// Carry is the unsigned carry out of an addition, and is set on a
/// subtraction when no borrow occurred. Logic operations clear carry
/// and overflow.
fn alu(op: AluOp, lhs: i32, rhs: i32) -> (i32, Flags) {
    let (result, c, v) = match op {
        AluOp::Add => {
            let (_, carry) = (lhs as u32).overflowing_add(rhs as u32);
            let (result, overflow) = lhs.overflowing_add(rhs);
            (result, carry, overflow)
        }
        AluOp::Sub => {
            let (result, overflow) = lhs.overflowing_sub(rhs);
            (result, lhs as u32 >= rhs as u32, overflow)
        }
        AluOp::And => (lhs & rhs, false, false),
        AluOp::Or => (lhs | rhs, false, false),
        AluOp::Xor => (lhs ^ rhs, false, false),
    };

    let flags = Flags {
        n: result < 0,
        z: result == 0,
        c,
        v,
    };
    (result, flags)
}

#[cold]
fn runtime_error(pc: Address, message: &'static str) -> FriscError {
    FriscError::Runtime { pc, message }
}

#[cfg(feature = "op_trace")]
#[inline]
fn op_trace(pc: Address, instr: &Instr) {
    log::trace!("{pc:05X}: {instr:?}");
}
