//! The execution engine: fetch, decode, resolve, execute.

use std::fmt;
use std::sync::OnceLock;

use emu_core::{Bus, Cpu, Observable, Ticks, Value};

use crate::addressing::offset_address;
use crate::flags::Flag;
use crate::opcodes::{Opcode, Operation, Penalty};
use crate::{CpuError, Operand, Registers, Status, ops};

/// Vector the reset sequence loads PC from.
pub const RESET_VECTOR: u16 = 0xFFFC;

/// Where the engine is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Executing instructions.
    Ready,
    /// Stopped on request. `resume` continues from the same state.
    Halted,
    /// Stopped by a fault. Only `reset` leaves this state.
    Faulted(CpuError),
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => f.write_str("ready"),
            Self::Halted => f.write_str("halted"),
            Self::Faulted(error) => write!(f, "faulted: {error}"),
        }
    }
}

/// Outcome of one `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Cycles consumed, including penalties. Zero when nothing executed.
    pub cycles: u32,
    /// Engine state after the step.
    pub state: EngineState,
}

/// Outcome of `run` / `run_until`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub instructions: u64,
    pub cycles: Ticks,
    pub state: EngineState,
}

/// MOS 6502 CPU.
///
/// Executes one whole instruction per `step`. Memory is borrowed per call, so
/// the caller can inspect or patch it between steps.
#[derive(Debug, Clone)]
pub struct Mos6502 {
    /// CPU registers.
    pub regs: Registers,
    state: EngineState,
    total_cycles: Ticks,
}

impl Default for Mos6502 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mos6502 {
    /// Create a CPU in the power-on register state with PC at 0.
    ///
    /// Call `reset` to load PC from the reset vector, or set `regs.pc`
    /// directly.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            state: EngineState::Ready,
            total_cycles: Ticks::ZERO,
        }
    }

    /// Reset: registers to power-on values, PC from $FFFC/$FFFD.
    ///
    /// Clears a fault or halt. The running cycle total is kept.
    pub fn reset<B: Bus>(&mut self, bus: &mut B) {
        self.regs = Registers::new();
        self.regs.pc = bus.read_word(RESET_VECTOR);
        self.state = EngineState::Ready;
    }

    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Total cycles executed since creation.
    #[must_use]
    pub const fn total_cycles(&self) -> Ticks {
        self.total_cycles
    }

    /// Stop a running engine. Has no effect on a faulted one.
    pub fn halt(&mut self) {
        if self.state == EngineState::Ready {
            self.state = EngineState::Halted;
        }
    }

    /// Continue a halted engine.
    pub fn resume(&mut self) {
        if self.state == EngineState::Halted {
            self.state = EngineState::Ready;
        }
    }

    /// Execute one instruction.
    ///
    /// A step either completes or leaves the registers exactly as they were
    /// and moves the engine to `Faulted`.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> StepResult {
        if self.state != EngineState::Ready {
            return StepResult {
                cycles: 0,
                state: self.state,
            };
        }

        let before = self.regs;
        match self.execute(bus) {
            Ok((opcode, cycles)) => {
                if trace_enabled() {
                    trace(&before, opcode, self.total_cycles);
                }
                self.total_cycles += Ticks::from(cycles);
                StepResult {
                    cycles,
                    state: self.state,
                }
            }
            Err(error) => {
                self.regs = before;
                self.state = EngineState::Faulted(error);
                StepResult {
                    cycles: 0,
                    state: self.state,
                }
            }
        }
    }

    /// Step until the engine stops or `budget` cycles have been spent.
    ///
    /// The instruction that crosses the budget still runs to completion.
    pub fn run<B: Bus>(&mut self, bus: &mut B, budget: Ticks) -> RunSummary {
        self.run_until(bus, budget, |_| false)
    }

    /// Like `run`, but halts as soon as `predicate` returns true after a step.
    pub fn run_until<B, F>(&mut self, bus: &mut B, budget: Ticks, mut predicate: F) -> RunSummary
    where
        B: Bus,
        F: FnMut(&Self) -> bool,
    {
        let mut instructions = 0;
        let mut cycles = Ticks::ZERO;

        while self.state == EngineState::Ready && cycles < budget {
            let step = self.step(bus);
            if step.state != EngineState::Ready {
                break;
            }
            instructions += 1;
            cycles += Ticks::from(step.cycles);
            if predicate(self) {
                self.halt();
            }
        }

        RunSummary {
            instructions,
            cycles,
            state: self.state,
        }
    }

    fn execute<B: Bus>(&mut self, bus: &mut B) -> Result<(&'static Opcode, u32), CpuError> {
        let pc = self.regs.pc;
        let code = bus.read(pc);
        let opcode = Opcode::lookup(code);
        if !opcode.is_documented() {
            return Err(CpuError::IllegalOpcode { opcode: code, pc });
        }

        self.regs.pc = offset_address(pc, 1)?;
        let operand = opcode.mode.resolve(bus, &mut self.regs)?;
        let branch_cycles = self.dispatch(bus, opcode.operation, operand)?;

        let penalty = match opcode.penalty {
            Penalty::None => 0,
            Penalty::PageCross => u8::from(operand.page_crossed()),
            Penalty::Branch => branch_cycles,
        };
        Ok((opcode, u32::from(opcode.cycles) + u32::from(penalty)))
    }

    /// Run the operation. Returns extra cycles for taken branches.
    fn dispatch<B: Bus>(
        &mut self,
        bus: &mut B,
        operation: Operation,
        operand: Operand,
    ) -> Result<u8, CpuError> {
        let regs = &mut self.regs;
        match operation {
            // Loads and stores
            Operation::Lda => {
                let value = read(bus, regs, operand);
                ops::lda(regs, value);
            }
            Operation::Ldx => {
                let value = read(bus, regs, operand);
                ops::ldx(regs, value);
            }
            Operation::Ldy => {
                let value = read(bus, regs, operand);
                ops::ldy(regs, value);
            }
            Operation::Sta => store(bus, operand, regs.a),
            Operation::Stx => store(bus, operand, regs.x),
            Operation::Sty => store(bus, operand, regs.y),

            // Arithmetic and logic
            Operation::Adc => {
                let value = read(bus, regs, operand);
                ops::adc(regs, value);
            }
            Operation::Sbc => {
                let value = read(bus, regs, operand);
                ops::sbc(regs, value);
            }
            Operation::And => {
                let value = read(bus, regs, operand);
                ops::and(regs, value);
            }
            Operation::Ora => {
                let value = read(bus, regs, operand);
                ops::ora(regs, value);
            }
            Operation::Eor => {
                let value = read(bus, regs, operand);
                ops::eor(regs, value);
            }
            Operation::Bit => {
                let value = read(bus, regs, operand);
                ops::bit(regs, value);
            }
            Operation::Cmp => {
                let value = read(bus, regs, operand);
                ops::compare(&mut regs.p, regs.a, value);
            }
            Operation::Cpx => {
                let value = read(bus, regs, operand);
                ops::compare(&mut regs.p, regs.x, value);
            }
            Operation::Cpy => {
                let value = read(bus, regs, operand);
                ops::compare(&mut regs.p, regs.y, value);
            }

            // Read-modify-write
            Operation::Asl => modify(bus, regs, operand, ops::asl),
            Operation::Lsr => modify(bus, regs, operand, ops::lsr),
            Operation::Rol => modify(bus, regs, operand, ops::rol),
            Operation::Ror => modify(bus, regs, operand, ops::ror),
            Operation::Inc => modify(bus, regs, operand, ops::increment),
            Operation::Dec => modify(bus, regs, operand, ops::decrement),

            // Register increments
            Operation::Inx => regs.x = ops::increment(&mut regs.p, regs.x),
            Operation::Iny => regs.y = ops::increment(&mut regs.p, regs.y),
            Operation::Dex => regs.x = ops::decrement(&mut regs.p, regs.x),
            Operation::Dey => regs.y = ops::decrement(&mut regs.p, regs.y),

            // Transfers
            Operation::Tax => ops::tax(regs),
            Operation::Tay => ops::tay(regs),
            Operation::Txa => ops::txa(regs),
            Operation::Tya => ops::tya(regs),
            Operation::Tsx => ops::tsx(regs),
            Operation::Txs => ops::txs(regs),

            // Stack
            Operation::Pha => ops::pha(bus, regs),
            Operation::Php => ops::php(bus, regs),
            Operation::Pla => ops::pla(bus, regs),
            Operation::Plp => ops::plp(bus, regs),

            // Branches
            Operation::Bcc
            | Operation::Bcs
            | Operation::Bne
            | Operation::Beq
            | Operation::Bpl
            | Operation::Bmi
            | Operation::Bvc
            | Operation::Bvs => {
                let taken = branch_taken(operation, regs.p);
                return branch(regs, operand, taken);
            }

            // Jumps and interrupts
            Operation::Jmp => ops::jmp(regs, target(operand)),
            Operation::Jsr => ops::jsr(bus, regs, target(operand)),
            Operation::Rts => ops::rts(bus, regs)?,
            Operation::Brk => ops::brk(bus, regs)?,
            Operation::Rti => ops::rti(bus, regs),

            // Flags
            Operation::Clc => ops::set_flag(regs, Flag::Carry, false),
            Operation::Sec => ops::set_flag(regs, Flag::Carry, true),
            Operation::Cli => ops::set_flag(regs, Flag::InterruptDisable, false),
            Operation::Sei => ops::set_flag(regs, Flag::InterruptDisable, true),
            Operation::Clv => ops::set_flag(regs, Flag::Overflow, false),
            Operation::Cld => ops::set_flag(regs, Flag::Decimal, false),
            Operation::Sed => ops::set_flag(regs, Flag::Decimal, true),

            Operation::Nop => {}
            Operation::Illegal => unreachable!("illegal opcodes fault before dispatch"),
        }
        Ok(0)
    }
}

/// Value an operand names. The registry never pairs implied or relative
/// operands with a value-reading operation.
fn read<B: Bus>(bus: &mut B, regs: &Registers, operand: Operand) -> u8 {
    match operand {
        Operand::Immediate(value) => value,
        Operand::Address { address, .. } => bus.read(address),
        Operand::Accumulator => regs.a,
        Operand::Implied | Operand::Relative(_) => {
            unreachable!("{operand:?} has no value to read")
        }
    }
}

/// Effective address of a store, jump or memory operand.
fn target(operand: Operand) -> u16 {
    match operand.address() {
        Some(address) => address,
        None => unreachable!("{operand:?} names no address"),
    }
}

fn store<B: Bus>(bus: &mut B, operand: Operand, value: u8) {
    ops::store(bus, target(operand), value);
}

/// Read, transform, write back to the accumulator or memory.
fn modify<B: Bus>(
    bus: &mut B,
    regs: &mut Registers,
    operand: Operand,
    op: fn(&mut Status, u8) -> u8,
) {
    match operand {
        Operand::Accumulator => regs.a = op(&mut regs.p, regs.a),
        Operand::Address { address, .. } => {
            let value = bus.read(address);
            let result = op(&mut regs.p, value);
            bus.write(address, result);
        }
        Operand::Implied | Operand::Immediate(_) | Operand::Relative(_) => {
            unreachable!("{operand:?} cannot be modified")
        }
    }
}

const fn branch_taken(operation: Operation, p: Status) -> bool {
    match operation {
        Operation::Bcc => !p.carry,
        Operation::Bcs => p.carry,
        Operation::Bne => !p.zero,
        Operation::Beq => p.zero,
        Operation::Bpl => !p.negative,
        Operation::Bmi => p.negative,
        Operation::Bvc => !p.overflow,
        Operation::Bvs => p.overflow,
        _ => false,
    }
}

fn branch(regs: &mut Registers, operand: Operand, taken: bool) -> Result<u8, CpuError> {
    match operand {
        Operand::Relative(offset) => ops::branch(regs, offset, taken),
        _ => unreachable!("branch with {operand:?} operand"),
    }
}

fn trace_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var_os("MOS6502_TRACE").is_some())
}

/// One line per instruction, registers as they were before it ran.
fn trace(regs: &Registers, opcode: &Opcode, cycles: Ticks) {
    eprintln!(
        "[6502] {:04X}  {:02X}  {}  A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
        regs.pc,
        opcode.code,
        opcode.mnemonic,
        regs.a,
        regs.x,
        regs.y,
        regs.p.to_byte(),
        regs.s,
        cycles.get(),
    );
}

impl Cpu for Mos6502 {
    type Registers = Registers;
    type Step = StepResult;

    fn step<B: Bus>(&mut self, bus: &mut B) -> StepResult {
        Mos6502::step(self, bus)
    }

    fn reset<B: Bus>(&mut self, bus: &mut B) {
        Mos6502::reset(self, bus);
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.state != EngineState::Ready
    }
}

impl Observable for Mos6502 {
    fn query(&self, path: &str) -> Option<Value> {
        let p = self.regs.p;
        match path {
            "pc" => Some(self.regs.pc.into()),
            "a" => Some(self.regs.a.into()),
            "x" => Some(self.regs.x.into()),
            "y" => Some(self.regs.y.into()),
            "s" | "sp" => Some(self.regs.s.into()),
            "p" | "status" => Some(p.to_byte().into()),
            "flags.c" => Some(p.is_set(Flag::Carry).into()),
            "flags.z" => Some(p.is_set(Flag::Zero).into()),
            "flags.i" => Some(p.is_set(Flag::InterruptDisable).into()),
            "flags.d" => Some(p.is_set(Flag::Decimal).into()),
            "flags.b" => Some(p.is_set(Flag::Break).into()),
            "flags.v" => Some(p.is_set(Flag::Overflow).into()),
            "flags.n" => Some(p.is_set(Flag::Negative).into()),
            "cycles" => Some(self.total_cycles.get().into()),
            "state" => Some(self.state.to_string().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc", "a", "x", "y", "s", "p", "flags.c", "flags.z", "flags.i", "flags.d", "flags.b",
            "flags.v", "flags.n", "cycles", "state",
        ]
    }
}
