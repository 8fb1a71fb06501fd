//! CPU execution faults.

use std::fmt;

/// A fault that stops the engine.
///
/// Both kinds are deterministic: stepping again from the same state would
/// reproduce the same fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuError {
    /// The byte at `pc` is not a documented 6502 opcode.
    IllegalOpcode { opcode: u8, pc: u16 },
    /// An address computed from PC or an index fell outside $0000-$FFFF.
    /// Negative for branch targets below $0000.
    OutOfRangeAddress(i32),
}

impl fmt::Display for CpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IllegalOpcode { opcode, pc } => {
                write!(f, "illegal opcode ${opcode:02X} at ${pc:04X}")
            }
            Self::OutOfRangeAddress(address) if *address < 0 => write!(
                f,
                "address -${:04X} is outside $0000-$FFFF",
                address.unsigned_abs()
            ),
            Self::OutOfRangeAddress(address) => {
                write!(f, "address ${address:05X} is outside $0000-$FFFF")
            }
        }
    }
}

impl std::error::Error for CpuError {}
