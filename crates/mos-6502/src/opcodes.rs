//! Opcode registry.
//!
//! All 256 opcode bytes map to an [`Opcode`] descriptor. The 151 documented
//! NMOS instructions carry their operation, addressing mode and base cycle
//! count; the remaining 105 bytes resolve to [`Operation::Illegal`] so the
//! engine can fault on them instead of guessing.
//!
//! The table is built once on first use and shared read-only afterwards.

use std::sync::OnceLock;

use crate::AddressingMode;
use crate::AddressingMode::{
    Absolute, AbsoluteX, AbsoluteY, Accumulator, Immediate, Implicit, IndexedIndirect, Indirect,
    IndirectIndexed, Relative, ZeroPage, ZeroPageX, ZeroPageY,
};
use Operation as Op;
use Penalty::{Branch as B, None as F, PageCross as P};

/// The behaviour bound to an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    /// No documented instruction has this opcode.
    Illegal,
}

impl Operation {
    /// Assembler mnemonic, `"???"` for illegal opcodes.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Adc => "ADC",
            Self::And => "AND",
            Self::Asl => "ASL",
            Self::Bcc => "BCC",
            Self::Bcs => "BCS",
            Self::Beq => "BEQ",
            Self::Bit => "BIT",
            Self::Bmi => "BMI",
            Self::Bne => "BNE",
            Self::Bpl => "BPL",
            Self::Brk => "BRK",
            Self::Bvc => "BVC",
            Self::Bvs => "BVS",
            Self::Clc => "CLC",
            Self::Cld => "CLD",
            Self::Cli => "CLI",
            Self::Clv => "CLV",
            Self::Cmp => "CMP",
            Self::Cpx => "CPX",
            Self::Cpy => "CPY",
            Self::Dec => "DEC",
            Self::Dex => "DEX",
            Self::Dey => "DEY",
            Self::Eor => "EOR",
            Self::Inc => "INC",
            Self::Inx => "INX",
            Self::Iny => "INY",
            Self::Jmp => "JMP",
            Self::Jsr => "JSR",
            Self::Lda => "LDA",
            Self::Ldx => "LDX",
            Self::Ldy => "LDY",
            Self::Lsr => "LSR",
            Self::Nop => "NOP",
            Self::Ora => "ORA",
            Self::Pha => "PHA",
            Self::Php => "PHP",
            Self::Pla => "PLA",
            Self::Plp => "PLP",
            Self::Rol => "ROL",
            Self::Ror => "ROR",
            Self::Rti => "RTI",
            Self::Rts => "RTS",
            Self::Sbc => "SBC",
            Self::Sec => "SEC",
            Self::Sed => "SED",
            Self::Sei => "SEI",
            Self::Sta => "STA",
            Self::Stx => "STX",
            Self::Sty => "STY",
            Self::Tax => "TAX",
            Self::Tay => "TAY",
            Self::Tsx => "TSX",
            Self::Txa => "TXA",
            Self::Txs => "TXS",
            Self::Tya => "TYA",
            Self::Illegal => "???",
        }
    }
}

/// Conditional extra cycles on top of an opcode's base count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Penalty {
    /// Fixed timing.
    None,
    /// +1 when indexing crosses a page (indexed reads only).
    PageCross,
    /// +1 when taken, +1 more when the target is on another page.
    Branch,
}

/// Descriptor for one opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    /// The opcode byte itself.
    pub code: u8,
    /// Assembler mnemonic (`"???"` for illegal opcodes).
    pub mnemonic: &'static str,
    pub mode: AddressingMode,
    pub operation: Operation,
    /// Cycles before any penalty. Zero for illegal opcodes.
    pub cycles: u8,
    pub penalty: Penalty,
}

impl Opcode {
    const fn illegal(code: u8) -> Self {
        Self {
            code,
            mnemonic: Operation::Illegal.mnemonic(),
            mode: Implicit,
            operation: Operation::Illegal,
            cycles: 0,
            penalty: Penalty::None,
        }
    }

    /// Look up the descriptor for an opcode byte.
    #[must_use]
    pub fn lookup(code: u8) -> &'static Opcode {
        &registry()[usize::from(code)]
    }

    /// True for the 151 documented instructions.
    #[must_use]
    pub const fn is_documented(&self) -> bool {
        !matches!(self.operation, Operation::Illegal)
    }

    /// Instruction length in bytes, opcode included.
    #[must_use]
    pub const fn size(&self) -> u8 {
        1 + self.mode.operand_bytes()
    }
}

/// The full 256-entry table, built on first use.
#[must_use]
pub fn registry() -> &'static [Opcode; 256] {
    static REGISTRY: OnceLock<[Opcode; 256]> = OnceLock::new();
    REGISTRY.get_or_init(build)
}

fn build() -> [Opcode; 256] {
    let mut table: [Opcode; 256] = std::array::from_fn(|code| Opcode::illegal(code as u8));
    for &(code, operation, mode, cycles, penalty) in DOCUMENTED {
        table[usize::from(code)] = Opcode {
            code,
            mnemonic: operation.mnemonic(),
            mode,
            operation,
            cycles,
            penalty,
        };
    }
    table
}

/// (opcode, operation, mode, base cycles, penalty) for every documented opcode.
#[rustfmt::skip]
const DOCUMENTED: &[(u8, Operation, AddressingMode, u8, Penalty)] = &[
    // Load/store
    (0xA9, Op::Lda, Immediate, 2, F),
    (0xA5, Op::Lda, ZeroPage, 3, F),
    (0xB5, Op::Lda, ZeroPageX, 4, F),
    (0xAD, Op::Lda, Absolute, 4, F),
    (0xBD, Op::Lda, AbsoluteX, 4, P),
    (0xB9, Op::Lda, AbsoluteY, 4, P),
    (0xA1, Op::Lda, IndexedIndirect, 6, F),
    (0xB1, Op::Lda, IndirectIndexed, 5, P),
    (0xA2, Op::Ldx, Immediate, 2, F),
    (0xA6, Op::Ldx, ZeroPage, 3, F),
    (0xB6, Op::Ldx, ZeroPageY, 4, F),
    (0xAE, Op::Ldx, Absolute, 4, F),
    (0xBE, Op::Ldx, AbsoluteY, 4, P),
    (0xA0, Op::Ldy, Immediate, 2, F),
    (0xA4, Op::Ldy, ZeroPage, 3, F),
    (0xB4, Op::Ldy, ZeroPageX, 4, F),
    (0xAC, Op::Ldy, Absolute, 4, F),
    (0xBC, Op::Ldy, AbsoluteX, 4, P),
    (0x85, Op::Sta, ZeroPage, 3, F),
    (0x95, Op::Sta, ZeroPageX, 4, F),
    (0x8D, Op::Sta, Absolute, 4, F),
    (0x9D, Op::Sta, AbsoluteX, 5, F),
    (0x99, Op::Sta, AbsoluteY, 5, F),
    (0x81, Op::Sta, IndexedIndirect, 6, F),
    (0x91, Op::Sta, IndirectIndexed, 6, F),
    (0x86, Op::Stx, ZeroPage, 3, F),
    (0x96, Op::Stx, ZeroPageY, 4, F),
    (0x8E, Op::Stx, Absolute, 4, F),
    (0x84, Op::Sty, ZeroPage, 3, F),
    (0x94, Op::Sty, ZeroPageX, 4, F),
    (0x8C, Op::Sty, Absolute, 4, F),

    // Register transfers
    (0xAA, Op::Tax, Implicit, 2, F),
    (0xA8, Op::Tay, Implicit, 2, F),
    (0x8A, Op::Txa, Implicit, 2, F),
    (0x98, Op::Tya, Implicit, 2, F),
    (0xBA, Op::Tsx, Implicit, 2, F),
    (0x9A, Op::Txs, Implicit, 2, F),

    // Stack
    (0x48, Op::Pha, Implicit, 3, F),
    (0x08, Op::Php, Implicit, 3, F),
    (0x68, Op::Pla, Implicit, 4, F),
    (0x28, Op::Plp, Implicit, 4, F),

    // Logical
    (0x29, Op::And, Immediate, 2, F),
    (0x25, Op::And, ZeroPage, 3, F),
    (0x35, Op::And, ZeroPageX, 4, F),
    (0x2D, Op::And, Absolute, 4, F),
    (0x3D, Op::And, AbsoluteX, 4, P),
    (0x39, Op::And, AbsoluteY, 4, P),
    (0x21, Op::And, IndexedIndirect, 6, F),
    (0x31, Op::And, IndirectIndexed, 5, P),
    (0x49, Op::Eor, Immediate, 2, F),
    (0x45, Op::Eor, ZeroPage, 3, F),
    (0x55, Op::Eor, ZeroPageX, 4, F),
    (0x4D, Op::Eor, Absolute, 4, F),
    (0x5D, Op::Eor, AbsoluteX, 4, P),
    (0x59, Op::Eor, AbsoluteY, 4, P),
    (0x41, Op::Eor, IndexedIndirect, 6, F),
    (0x51, Op::Eor, IndirectIndexed, 5, P),
    (0x09, Op::Ora, Immediate, 2, F),
    (0x05, Op::Ora, ZeroPage, 3, F),
    (0x15, Op::Ora, ZeroPageX, 4, F),
    (0x0D, Op::Ora, Absolute, 4, F),
    (0x1D, Op::Ora, AbsoluteX, 4, P),
    (0x19, Op::Ora, AbsoluteY, 4, P),
    (0x01, Op::Ora, IndexedIndirect, 6, F),
    (0x11, Op::Ora, IndirectIndexed, 5, P),
    (0x24, Op::Bit, ZeroPage, 3, F),
    (0x2C, Op::Bit, Absolute, 4, F),

    // Arithmetic
    (0x69, Op::Adc, Immediate, 2, F),
    (0x65, Op::Adc, ZeroPage, 3, F),
    (0x75, Op::Adc, ZeroPageX, 4, F),
    (0x6D, Op::Adc, Absolute, 4, F),
    (0x7D, Op::Adc, AbsoluteX, 4, P),
    (0x79, Op::Adc, AbsoluteY, 4, P),
    (0x61, Op::Adc, IndexedIndirect, 6, F),
    (0x71, Op::Adc, IndirectIndexed, 5, P),
    (0xE9, Op::Sbc, Immediate, 2, F),
    (0xE5, Op::Sbc, ZeroPage, 3, F),
    (0xF5, Op::Sbc, ZeroPageX, 4, F),
    (0xED, Op::Sbc, Absolute, 4, F),
    (0xFD, Op::Sbc, AbsoluteX, 4, P),
    (0xF9, Op::Sbc, AbsoluteY, 4, P),
    (0xE1, Op::Sbc, IndexedIndirect, 6, F),
    (0xF1, Op::Sbc, IndirectIndexed, 5, P),
    (0xC9, Op::Cmp, Immediate, 2, F),
    (0xC5, Op::Cmp, ZeroPage, 3, F),
    (0xD5, Op::Cmp, ZeroPageX, 4, F),
    (0xCD, Op::Cmp, Absolute, 4, F),
    (0xDD, Op::Cmp, AbsoluteX, 4, P),
    (0xD9, Op::Cmp, AbsoluteY, 4, P),
    (0xC1, Op::Cmp, IndexedIndirect, 6, F),
    (0xD1, Op::Cmp, IndirectIndexed, 5, P),
    (0xE0, Op::Cpx, Immediate, 2, F),
    (0xE4, Op::Cpx, ZeroPage, 3, F),
    (0xEC, Op::Cpx, Absolute, 4, F),
    (0xC0, Op::Cpy, Immediate, 2, F),
    (0xC4, Op::Cpy, ZeroPage, 3, F),
    (0xCC, Op::Cpy, Absolute, 4, F),

    // Increments and decrements
    (0xE6, Op::Inc, ZeroPage, 5, F),
    (0xF6, Op::Inc, ZeroPageX, 6, F),
    (0xEE, Op::Inc, Absolute, 6, F),
    (0xFE, Op::Inc, AbsoluteX, 7, F),
    (0xE8, Op::Inx, Implicit, 2, F),
    (0xC8, Op::Iny, Implicit, 2, F),
    (0xC6, Op::Dec, ZeroPage, 5, F),
    (0xD6, Op::Dec, ZeroPageX, 6, F),
    (0xCE, Op::Dec, Absolute, 6, F),
    (0xDE, Op::Dec, AbsoluteX, 7, F),
    (0xCA, Op::Dex, Implicit, 2, F),
    (0x88, Op::Dey, Implicit, 2, F),

    // Shifts and rotates
    (0x0A, Op::Asl, Accumulator, 2, F),
    (0x06, Op::Asl, ZeroPage, 5, F),
    (0x16, Op::Asl, ZeroPageX, 6, F),
    (0x0E, Op::Asl, Absolute, 6, F),
    (0x1E, Op::Asl, AbsoluteX, 7, F),
    (0x4A, Op::Lsr, Accumulator, 2, F),
    (0x46, Op::Lsr, ZeroPage, 5, F),
    (0x56, Op::Lsr, ZeroPageX, 6, F),
    (0x4E, Op::Lsr, Absolute, 6, F),
    (0x5E, Op::Lsr, AbsoluteX, 7, F),
    (0x2A, Op::Rol, Accumulator, 2, F),
    (0x26, Op::Rol, ZeroPage, 5, F),
    (0x36, Op::Rol, ZeroPageX, 6, F),
    (0x2E, Op::Rol, Absolute, 6, F),
    (0x3E, Op::Rol, AbsoluteX, 7, F),
    (0x6A, Op::Ror, Accumulator, 2, F),
    (0x66, Op::Ror, ZeroPage, 5, F),
    (0x76, Op::Ror, ZeroPageX, 6, F),
    (0x6E, Op::Ror, Absolute, 6, F),
    (0x7E, Op::Ror, AbsoluteX, 7, F),

    // Jumps and calls
    (0x4C, Op::Jmp, Absolute, 3, F),
    (0x6C, Op::Jmp, Indirect, 5, F),
    (0x20, Op::Jsr, Absolute, 6, F),
    (0x60, Op::Rts, Implicit, 6, F),

    // Branches
    (0x90, Op::Bcc, Relative, 2, B),
    (0xB0, Op::Bcs, Relative, 2, B),
    (0xF0, Op::Beq, Relative, 2, B),
    (0x30, Op::Bmi, Relative, 2, B),
    (0xD0, Op::Bne, Relative, 2, B),
    (0x10, Op::Bpl, Relative, 2, B),
    (0x50, Op::Bvc, Relative, 2, B),
    (0x70, Op::Bvs, Relative, 2, B),

    // Status flag changes
    (0x18, Op::Clc, Implicit, 2, F),
    (0xD8, Op::Cld, Implicit, 2, F),
    (0x58, Op::Cli, Implicit, 2, F),
    (0xB8, Op::Clv, Implicit, 2, F),
    (0x38, Op::Sec, Implicit, 2, F),
    (0xF8, Op::Sed, Implicit, 2, F),
    (0x78, Op::Sei, Implicit, 2, F),

    // System
    (0x00, Op::Brk, Implicit, 7, F),
    (0xEA, Op::Nop, Implicit, 2, F),
    (0x40, Op::Rti, Implicit, 6, F),
];
