//! MOS 6502 CPU simulator.
//!
//! Executes the 151 documented NMOS 6502 instructions one whole instruction
//! per step against any [`emu_core::Bus`]. Opcodes are decoded through a
//! 256-entry registry of descriptors pairing an [`AddressingMode`] with an
//! [`Operation`]; the engine resolves the mode, then runs the operation.
//!
//! Undocumented opcodes are not emulated: they fault the engine with
//! [`CpuError::IllegalOpcode`]. Decimal mode is not implemented; with D set,
//! ADC and SBC still do binary arithmetic.
//!
//! ```
//! use emu_core::{Memory, Ticks};
//! use mos_6502::{EngineState, Mos6502};
//!
//! // LDA #$05; ADC #$03, then stop on the illegal $02
//! let mut memory = Memory::from_image(0x0200, &[0xA9, 0x05, 0x69, 0x03, 0x02]).unwrap();
//! let mut cpu = Mos6502::new();
//! cpu.regs.pc = 0x0200;
//!
//! let summary = cpu.run(&mut memory, Ticks::new(100));
//! assert_eq!(cpu.regs.a, 0x08);
//! assert_eq!(summary.instructions, 2);
//! assert!(matches!(summary.state, EngineState::Faulted(_)));
//! ```

mod addressing;
mod cpu;
mod error;
pub mod flags;
mod opcodes;
pub mod ops;
mod registers;

pub use addressing::{AddressingMode, Operand};
pub use cpu::{EngineState, Mos6502, RESET_VECTOR, RunSummary, StepResult};
pub use error::CpuError;
pub use flags::{Flag, Status};
pub use opcodes::{Opcode, Operation, Penalty, registry};
pub use registers::{Registers, STACK_PAGE};
