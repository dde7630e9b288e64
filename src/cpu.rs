use std::{
    fmt::Write as _,
    io::{self, Stdout, Write},
};

use log::{debug, info, trace, warn};
use thiserror::Error;

use crate::{
    inst::{decode_inst, AluOp, Inst},
    mem::{Memory, MemoryError, RAM, RAM_SIZE},
    reg::{RegisterError, Registers},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Halted,
}

/// What the engine does with a byte that is not in the opcode table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownOpcodePolicy {
    /// Log it, then step over it using the operand count in its top bits.
    #[default]
    Skip,
    /// Abort the run with [`ExecutionError::UnknownOpcode`].
    Strict,
}

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error(transparent)]
    Register(#[from] RegisterError),
    #[error("unknown opcode {opcode:#010b} at {pc:#04x}")]
    UnknownOpcode { opcode: u8, pc: usize },
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

#[derive(Debug)]
pub struct CPU<W = Stdout> {
    pc: usize,
    ir: u8,
    fl: u8,
    regs: Registers,
    ram: RAM<RAM_SIZE>,
    state: State,
    policy: UnknownOpcodePolicy,
    out: W,
}
impl CPU<Stdout> {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}
impl Default for CPU<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}
impl<W: Write> CPU<W> {
    /// Creates a CPU whose PRN output goes to `out`.
    pub fn with_output(out: W) -> Self {
        Self {
            pc: 0,
            ir: 0,
            fl: 0,
            regs: Registers::new(),
            ram: RAM::new(),
            state: State::Running,
            policy: UnknownOpcodePolicy::default(),
            out,
        }
    }

    pub fn with_policy(mut self, policy: UnknownOpcodePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns registers, PC, flags and run state to their power-on values.
    /// Memory is left as is.
    pub fn reset(&mut self) {
        self.regs = Registers::new();
        self.pc = 0;
        self.ir = 0;
        self.fl = 0;
        self.state = State::Running;

        debug!("Setting stack pointer to {:#04x}...", self.regs.sp());
        debug!("Starting execution at {:#04x}...", self.pc);
    }

    pub fn load(&mut self, program: &[u8]) -> Result<(), MemoryError> {
        self.ram.load(program, 0)?;
        debug!("Loaded {} byte program", program.len());
        Ok(())
    }

    pub fn load_and_run(&mut self, program: &[u8]) -> Result<(), ExecutionError> {
        self.load(program)?;
        self.run()
    }

    pub fn run(&mut self) -> Result<(), ExecutionError> {
        while self.state == State::Running {
            self.step()?;
        }
        Ok(())
    }

    /// Executes one instruction cycle and returns the resulting run state.
    pub fn step(&mut self) -> Result<State, ExecutionError> {
        if self.state == State::Halted {
            return Ok(State::Halted);
        }

        self.ir = self.read_byte(self.pc)?;
        let operand_cnt = self.ir >> 6;
        let operand_a = self.read_operand(1, operand_cnt)?;
        let operand_b = self.read_operand(2, operand_cnt)?;

        trace!("{}", self.trace());

        let Some(op) = decode_inst(self.ir) else {
            match self.policy {
                UnknownOpcodePolicy::Skip => {
                    warn!(
                        "Skipping unknown opcode {:#010b} at {:#04x}",
                        self.ir, self.pc
                    );
                    self.pc += operand_cnt as usize + 1;
                    return Ok(self.state);
                }
                UnknownOpcodePolicy::Strict => {
                    return Err(ExecutionError::UnknownOpcode {
                        opcode: self.ir,
                        pc: self.pc,
                    });
                }
            }
        };

        match op.inst {
            Inst::HLT => {
                self.state = State::Halted;
                info!("Halted at {:#04x}", self.pc);
            }
            Inst::LDI => self.regs.set(operand_a, operand_b)?,
            Inst::PRN => {
                let value = self.regs.get(operand_a)?;
                writeln!(self.out, "{}", value)?;
            }
            Inst::ADD => self.alu(AluOp::Add, operand_a, operand_b)?,
            Inst::MUL => self.alu(AluOp::Mul, operand_a, operand_b)?,
            // SP moves before the register is read or written, so R7 as the
            // operand sees the updated stack pointer.
            Inst::PUSH => {
                let sp = self.dec_sp();
                let value = self.regs.get(operand_a)?;
                self.write_byte(sp as usize, value)?;
            }
            Inst::POP => {
                let value = self.read_byte(self.regs.sp() as usize)?;
                self.regs.set(operand_a, value)?;
                self.regs.set_sp(self.regs.sp().wrapping_add(1));
            }
            Inst::CALL => {
                let ret_addr = self.pc + op.len();
                let ret_addr =
                    u8::try_from(ret_addr).map_err(|_| MemoryError::OutOfRange(ret_addr))?;
                self.push_byte(ret_addr)?;
                self.pc = self.regs.get(operand_a)? as usize;
            }
            Inst::RET => {
                self.pc = self.pull_byte()? as usize;
            }
        };

        if !op.sets_pc {
            self.pc += op.len();
        }

        Ok(self.state)
    }

    /// reg_a := reg_a `op` reg_b, wrapping at 256.
    pub fn alu(&mut self, op: AluOp, reg_a: u8, reg_b: u8) -> Result<(), ExecutionError> {
        let a = self.regs.get(reg_a)?;
        let b = self.regs.get(reg_b)?;
        self.regs.set(reg_a, op.apply(a, b))?;
        Ok(())
    }

    /// Formats the current cycle as `TRACE: PC | IR A B | R0 .. R7`.
    pub fn trace(&self) -> String {
        let peek = |addr: usize| self.ram.read_byte(addr).unwrap_or(0);
        let mut line = format!(
            "TRACE: {:02X} | {:02X} {:02X} {:02X} |",
            self.pc,
            peek(self.pc),
            peek(self.pc + 1),
            peek(self.pc + 2)
        );
        for reg in self.regs.as_slice() {
            let _ = write!(line, " {:02X}", reg);
        }
        line
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_halted(&self) -> bool {
        self.state == State::Halted
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn ir(&self) -> u8 {
        self.ir
    }

    pub fn fl(&self) -> u8 {
        self.fl
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    pub fn memory(&self) -> &RAM<RAM_SIZE> {
        &self.ram
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    // Operands the opcode does not use may sit past the end of memory.
    fn read_operand(&self, offset: usize, operand_cnt: u8) -> Result<u8, MemoryError> {
        let addr = self.pc + offset;
        if offset <= operand_cnt as usize {
            self.read_byte(addr)
        } else {
            Ok(self.ram.read_byte(addr).unwrap_or(0))
        }
    }

    fn dec_sp(&mut self) -> u8 {
        let sp = self.regs.sp().wrapping_sub(1);
        self.regs.set_sp(sp);
        sp
    }

    fn push_byte(&mut self, data: u8) -> Result<(), MemoryError> {
        let sp = self.dec_sp();
        self.write_byte(sp as usize, data)
    }

    fn pull_byte(&mut self) -> Result<u8, MemoryError> {
        let sp = self.regs.sp();
        let data = self.read_byte(sp as usize)?;
        self.regs.set_sp(sp.wrapping_add(1));
        Ok(data)
    }

    fn read_byte(&self, addr: usize) -> Result<u8, MemoryError> {
        self.ram.read_byte(addr)
    }

    fn write_byte(&mut self, addr: usize, data: u8) -> Result<(), MemoryError> {
        self.ram.write_byte(addr, data)
    }
}
