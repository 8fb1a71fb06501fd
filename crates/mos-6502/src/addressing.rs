//! 6502 addressing modes.
//!
//! The 6502 has 13 addressing modes:
//! - Implicit: No operand (e.g., CLC, RTS)
//! - Accumulator: Operates on A register (e.g., ASL A)
//! - Immediate: #$nn (literal value)
//! - Zero Page: $nn (8-bit address in page zero)
//! - Zero Page,X: $nn,X (8-bit address + X, wraps in page zero)
//! - Zero Page,Y: $nn,Y (8-bit address + Y, wraps in page zero)
//! - Relative: Branch offset (-128 to +127)
//! - Absolute: $nnnn (16-bit address)
//! - Absolute,X: $nnnn,X (16-bit address + X, may cross page)
//! - Absolute,Y: $nnnn,Y (16-bit address + Y, may cross page)
//! - Indirect: ($nnnn) (JMP only, buggy page boundary behavior)
//! - Indexed Indirect: ($nn,X) (pointer in zero page indexed by X)
//! - Indirect Indexed: ($nn),Y (zero page pointer + Y)
//!
//! Resolving a mode consumes its operand bytes, so PC always ends up on the
//! next instruction's opcode.

use emu_core::Bus;

use crate::{CpuError, Registers};

/// 6502 addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    Implicit,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Relative,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    /// ($nn,X)
    IndexedIndirect,
    /// ($nn),Y
    IndirectIndexed,
}

/// What an addressing mode resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// No operand.
    Implied,
    /// The accumulator itself.
    Accumulator,
    /// A literal byte from the instruction stream.
    Immediate(u8),
    /// An effective address in memory.
    Address { address: u16, page_crossed: bool },
    /// A signed branch displacement from the next instruction.
    Relative(i8),
}

impl Operand {
    /// The effective address, if this operand names one.
    #[must_use]
    pub const fn address(self) -> Option<u16> {
        match self {
            Self::Address { address, .. } => Some(address),
            _ => None,
        }
    }

    /// True when indexing carried into a different page.
    #[must_use]
    pub const fn page_crossed(self) -> bool {
        matches!(
            self,
            Self::Address {
                page_crossed: true,
                ..
            }
        )
    }
}

impl AddressingMode {
    /// Number of operand bytes following the opcode.
    #[must_use]
    pub const fn operand_bytes(self) -> u8 {
        match self {
            Self::Implicit | Self::Accumulator => 0,
            Self::Immediate
            | Self::ZeroPage
            | Self::ZeroPageX
            | Self::ZeroPageY
            | Self::Relative
            | Self::IndexedIndirect
            | Self::IndirectIndexed => 1,
            Self::Absolute | Self::AbsoluteX | Self::AbsoluteY | Self::Indirect => 2,
        }
    }

    /// Resolve the operand for an instruction whose opcode has already been
    /// fetched. `regs.pc` must point at the first operand byte; on success it
    /// points at the next opcode.
    pub fn resolve<B: Bus>(self, bus: &mut B, regs: &mut Registers) -> Result<Operand, CpuError> {
        let operand = match self {
            Self::Implicit => Operand::Implied,
            Self::Accumulator => Operand::Accumulator,
            Self::Immediate => Operand::Immediate(fetch(bus, regs)?),
            Self::ZeroPage => zero_page(fetch(bus, regs)?),
            Self::ZeroPageX => zero_page(zero_page_indexed(fetch(bus, regs)?, regs.x)),
            Self::ZeroPageY => zero_page(zero_page_indexed(fetch(bus, regs)?, regs.y)),
            Self::Relative => Operand::Relative(fetch(bus, regs)? as i8),
            Self::Absolute => Operand::Address {
                address: fetch_word(bus, regs)?,
                page_crossed: false,
            },
            Self::AbsoluteX => {
                let base = fetch_word(bus, regs)?;
                indexed(base, regs.x)?
            }
            Self::AbsoluteY => {
                let base = fetch_word(bus, regs)?;
                indexed(base, regs.y)?
            }
            Self::Indirect => {
                let pointer = fetch_word(bus, regs)?;
                Operand::Address {
                    address: read_word_page_bug(bus, pointer),
                    page_crossed: false,
                }
            }
            Self::IndexedIndirect => {
                let pointer = zero_page_indexed(fetch(bus, regs)?, regs.x);
                Operand::Address {
                    address: read_zero_page_word(bus, pointer),
                    page_crossed: false,
                }
            }
            Self::IndirectIndexed => {
                let pointer = fetch(bus, regs)?;
                let base = read_zero_page_word(bus, pointer);
                indexed(base, regs.y)?
            }
        };
        Ok(operand)
    }
}

/// Fetch the next byte at PC and increment PC.
///
/// Fails when PC would step past $FFFF.
fn fetch<B: Bus>(bus: &mut B, regs: &mut Registers) -> Result<u8, CpuError> {
    let value = bus.read(regs.pc);
    regs.pc = offset_address(regs.pc, 1)?;
    Ok(value)
}

/// Fetch a 16-bit word (little-endian) at PC.
fn fetch_word<B: Bus>(bus: &mut B, regs: &mut Registers) -> Result<u16, CpuError> {
    let low = fetch(bus, regs)?;
    let high = fetch(bus, regs)?;
    Ok(u16::from_le_bytes([low, high]))
}

/// `base + offset`, which must land inside $0000-$FFFF.
///
/// Covers PC advances, branch targets and return addresses as well as
/// indexing; none of them wrap.
pub fn offset_address(base: u16, offset: i32) -> Result<u16, CpuError> {
    let target = i32::from(base) + offset;
    u16::try_from(target).map_err(|_| CpuError::OutOfRangeAddress(target))
}

fn zero_page(address: u8) -> Operand {
    Operand::Address {
        address: u16::from(address),
        page_crossed: false,
    }
}

/// Zero page base + index, wrapping within page zero.
#[must_use]
pub const fn zero_page_indexed(base: u8, index: u8) -> u8 {
    base.wrapping_add(index)
}

/// Full-width add of an index to a 16-bit base.
///
/// The sum must stay inside the address space; a carry out of bit 15 is an
/// out-of-range address.
pub fn indexed(base: u16, index: u8) -> Result<Operand, CpuError> {
    let address = offset_address(base, i32::from(index))?;
    Ok(Operand::Address {
        address,
        page_crossed: (base ^ address) & 0xFF00 != 0,
    })
}

/// Read a pointer from page zero. The high byte comes from `pointer + 1`
/// wrapped to page zero, so $FF reads its high byte from $00.
pub fn read_zero_page_word<B: Bus>(bus: &mut B, pointer: u8) -> u16 {
    let low = bus.read(u16::from(pointer));
    let high = bus.read(u16::from(pointer.wrapping_add(1)));
    u16::from_le_bytes([low, high])
}

/// Read a 16-bit word with 6502 page boundary bug (for indirect JMP).
/// If addr is $xxFF, high byte comes from $xx00 instead of $xx00+$100.
pub fn read_word_page_bug<B: Bus>(bus: &mut B, addr: u16) -> u16 {
    let low = bus.read(addr);
    let high_addr = (addr & 0xFF00) | (addr.wrapping_add(1) & 0x00FF);
    let high = bus.read(high_addr);
    u16::from_le_bytes([low, high])
}
