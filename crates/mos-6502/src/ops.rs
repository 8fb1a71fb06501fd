//! Instruction semantics.
//!
//! One function per mnemonic (or per family where the only difference is
//! the register involved). Each takes the resolved operand value or address
//! and mutates registers, flags and memory. Only the flags listed for an
//! instruction are touched; everything else in P is left alone.
//!
//! Control-flow instructions set PC themselves. Everything else relies on
//! the addressing resolver having already moved PC past the operand.

use emu_core::Bus;

use crate::addressing::offset_address;
use crate::flags::Flag;
use crate::{CpuError, Registers, Status};

/// Vector BRK loads PC from.
pub const IRQ_VECTOR: u16 = 0xFFFE;

// ============================================================================
// Loads and stores
// ============================================================================

pub fn lda(regs: &mut Registers, value: u8) {
    regs.a = value;
    regs.p.update_nz(value);
}

pub fn ldx(regs: &mut Registers, value: u8) {
    regs.x = value;
    regs.p.update_nz(value);
}

pub fn ldy(regs: &mut Registers, value: u8) {
    regs.y = value;
    regs.p.update_nz(value);
}

/// STA/STX/STY: store a register. No flags.
pub fn store<B: Bus>(bus: &mut B, address: u16, value: u8) {
    bus.write(address, value);
}

// ============================================================================
// Arithmetic and logic
// ============================================================================

/// ADC - Add with Carry.
///
/// Binary arithmetic regardless of the D flag.
pub fn adc(regs: &mut Registers, value: u8) {
    let sum = u16::from(regs.a) + u16::from(value) + u16::from(regs.p.carry);
    let result = sum as u8;

    regs.p.carry = sum > 0xFF;
    regs.p.overflow = (regs.a ^ result) & (value ^ result) & 0x80 != 0;
    regs.p.update_nz(result);
    regs.a = result;
}

/// SBC - Subtract with Carry (borrow).
///
/// A - M - (1 - C) is the same as A + !M + C.
pub fn sbc(regs: &mut Registers, value: u8) {
    adc(regs, !value);
}

pub fn and(regs: &mut Registers, value: u8) {
    regs.a &= value;
    regs.p.update_nz(regs.a);
}

pub fn ora(regs: &mut Registers, value: u8) {
    regs.a |= value;
    regs.p.update_nz(regs.a);
}

pub fn eor(regs: &mut Registers, value: u8) {
    regs.a ^= value;
    regs.p.update_nz(regs.a);
}

/// BIT - Bit Test. A is not modified.
pub fn bit(regs: &mut Registers, value: u8) {
    regs.p.zero = regs.a & value == 0;
    regs.p.negative = value & 0x80 != 0;
    regs.p.overflow = value & 0x40 != 0;
}

/// CMP/CPX/CPY - compare `register` with `value`.
pub fn compare(p: &mut Status, register: u8, value: u8) {
    p.carry = register >= value;
    p.update_nz(register.wrapping_sub(value));
}

// ============================================================================
// Shifts, rotates, increments
//
// These only touch flags and return the new value; the caller writes it
// back to A, X, Y or memory.
// ============================================================================

/// ASL - Arithmetic Shift Left.
pub fn asl(p: &mut Status, value: u8) -> u8 {
    p.carry = value & 0x80 != 0;
    let result = value << 1;
    p.update_nz(result);
    result
}

/// LSR - Logical Shift Right.
pub fn lsr(p: &mut Status, value: u8) -> u8 {
    p.carry = value & 0x01 != 0;
    let result = value >> 1;
    p.update_nz(result);
    result
}

/// ROL - Rotate Left through carry.
pub fn rol(p: &mut Status, value: u8) -> u8 {
    let carry_in = u8::from(p.carry);
    p.carry = value & 0x80 != 0;
    let result = (value << 1) | carry_in;
    p.update_nz(result);
    result
}

/// ROR - Rotate Right through carry.
pub fn ror(p: &mut Status, value: u8) -> u8 {
    let carry_in = if p.carry { 0x80 } else { 0 };
    p.carry = value & 0x01 != 0;
    let result = (value >> 1) | carry_in;
    p.update_nz(result);
    result
}

/// INC/INX/INY.
pub fn increment(p: &mut Status, value: u8) -> u8 {
    let result = value.wrapping_add(1);
    p.update_nz(result);
    result
}

/// DEC/DEX/DEY.
pub fn decrement(p: &mut Status, value: u8) -> u8 {
    let result = value.wrapping_sub(1);
    p.update_nz(result);
    result
}

// ============================================================================
// Register transfers
// ============================================================================

pub fn tax(regs: &mut Registers) {
    regs.x = regs.a;
    regs.p.update_nz(regs.x);
}

pub fn tay(regs: &mut Registers) {
    regs.y = regs.a;
    regs.p.update_nz(regs.y);
}

pub fn txa(regs: &mut Registers) {
    regs.a = regs.x;
    regs.p.update_nz(regs.a);
}

pub fn tya(regs: &mut Registers) {
    regs.a = regs.y;
    regs.p.update_nz(regs.a);
}

pub fn tsx(regs: &mut Registers) {
    regs.x = regs.s;
    regs.p.update_nz(regs.x);
}

/// TXS does not affect flags.
pub fn txs(regs: &mut Registers) {
    regs.s = regs.x;
}

// ============================================================================
// Stack
// ============================================================================

/// Push a byte onto the stack.
pub fn push<B: Bus>(bus: &mut B, regs: &mut Registers, value: u8) {
    let addr = regs.push();
    bus.write(addr, value);
}

/// Pull a byte from the stack.
pub fn pull<B: Bus>(bus: &mut B, regs: &mut Registers) -> u8 {
    let addr = regs.pop();
    bus.read(addr)
}

/// Push a 16-bit word onto the stack (high byte first).
pub fn push_word<B: Bus>(bus: &mut B, regs: &mut Registers, value: u16) {
    let [low, high] = value.to_le_bytes();
    push(bus, regs, high);
    push(bus, regs, low);
}

/// Pull a 16-bit word from the stack (low byte first).
pub fn pull_word<B: Bus>(bus: &mut B, regs: &mut Registers) -> u16 {
    let low = pull(bus, regs);
    let high = pull(bus, regs);
    u16::from_le_bytes([low, high])
}

pub fn pha<B: Bus>(bus: &mut B, regs: &mut Registers) {
    let value = regs.a;
    push(bus, regs, value);
}

/// PHP pushes P with B and bit 5 set.
pub fn php<B: Bus>(bus: &mut B, regs: &mut Registers) {
    let value = regs.p.to_byte_brk();
    push(bus, regs, value);
}

pub fn pla<B: Bus>(bus: &mut B, regs: &mut Registers) {
    regs.a = pull(bus, regs);
    regs.p.update_nz(regs.a);
}

/// PLP replaces every flag with the pulled byte.
pub fn plp<B: Bus>(bus: &mut B, regs: &mut Registers) {
    let value = pull(bus, regs);
    regs.p = Status::from_byte(value);
}

// ============================================================================
// Control flow
// ============================================================================

/// Conditional branch. `regs.pc` already points past the offset byte.
///
/// Returns the extra cycles: 0 when not taken, 1 when taken, 2 when the
/// target is on a different page from the next instruction. A taken branch
/// whose target leaves $0000-$FFFF is an out-of-range address.
pub fn branch(regs: &mut Registers, offset: i8, taken: bool) -> Result<u8, CpuError> {
    if !taken {
        return Ok(0);
    }
    let target = offset_address(regs.pc, i32::from(offset))?;
    let page_crossed = (regs.pc ^ target) & 0xFF00 != 0;
    regs.pc = target;
    Ok(if page_crossed { 2 } else { 1 })
}

pub fn jmp(regs: &mut Registers, address: u16) {
    regs.pc = address;
}

/// JSR pushes the address of its own last byte, then jumps.
pub fn jsr<B: Bus>(bus: &mut B, regs: &mut Registers, address: u16) {
    let return_addr = regs.pc.wrapping_sub(1);
    push_word(bus, regs, return_addr);
    regs.pc = address;
}

/// RTS pulls the address pushed by JSR and resumes one byte past it.
pub fn rts<B: Bus>(bus: &mut B, regs: &mut Registers) -> Result<(), CpuError> {
    let pulled = pull_word(bus, regs);
    regs.pc = offset_address(pulled, 1)?;
    Ok(())
}

/// BRK - software interrupt.
///
/// `regs.pc` points one past the BRK opcode; the pushed return address skips
/// the padding byte that follows it.
pub fn brk<B: Bus>(bus: &mut B, regs: &mut Registers) -> Result<(), CpuError> {
    let return_addr = offset_address(regs.pc, 1)?;
    push_word(bus, regs, return_addr);
    let status = regs.p.to_byte_brk();
    push(bus, regs, status);
    regs.p.interrupt_disable = true;
    regs.pc = bus.read_word(IRQ_VECTOR);
    Ok(())
}

/// RTI - pull P, then PC. No +1, unlike RTS.
pub fn rti<B: Bus>(bus: &mut B, regs: &mut Registers) {
    plp(bus, regs);
    regs.pc = pull_word(bus, regs);
}

// ============================================================================
// Flags
// ============================================================================

/// CLC/SEC/CLI/SEI/CLV/CLD/SED.
pub fn set_flag(regs: &mut Registers, flag: Flag, value: bool) {
    regs.p.set(flag, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::Memory;

    fn regs_with_a(a: u8) -> Registers {
        let mut regs = Registers::new();
        regs.a = a;
        regs.p = Status::new();
        regs
    }

    #[test]
    fn adc_signed_overflow() {
        let mut regs = regs_with_a(0x50);
        adc(&mut regs, 0x50);
        assert_eq!(regs.a, 0xA0);
        assert!(regs.p.negative);
        assert!(regs.p.overflow);
        assert!(!regs.p.carry);
        assert!(!regs.p.zero);
    }

    #[test]
    fn adc_unsigned_carry_to_zero() {
        let mut regs = regs_with_a(0xFF);
        adc(&mut regs, 0x01);
        assert_eq!(regs.a, 0x00);
        assert!(regs.p.carry);
        assert!(regs.p.zero);
        assert!(!regs.p.overflow);
        assert!(!regs.p.negative);
    }

    #[test]
    fn adc_adds_carry_in() {
        let mut regs = regs_with_a(0x10);
        regs.p.carry = true;
        adc(&mut regs, 0x20);
        assert_eq!(regs.a, 0x31);
        assert!(!regs.p.carry);
    }

    #[test]
    fn adc_leaves_unrelated_flags_alone() {
        let mut regs = regs_with_a(0x01);
        regs.p.interrupt_disable = true;
        regs.p.decimal = true;
        adc(&mut regs, 0x01);
        assert!(regs.p.interrupt_disable);
        assert!(regs.p.decimal);
    }

    #[test]
    fn sbc_without_borrow() {
        let mut regs = regs_with_a(0x50);
        regs.p.carry = true;
        sbc(&mut regs, 0x10);
        assert_eq!(regs.a, 0x40);
        assert!(regs.p.carry);
        assert!(!regs.p.overflow);
    }

    #[test]
    fn sbc_borrow_clears_carry() {
        let mut regs = regs_with_a(0x10);
        regs.p.carry = true;
        sbc(&mut regs, 0x20);
        assert_eq!(regs.a, 0xF0);
        assert!(!regs.p.carry);
        assert!(regs.p.negative);
    }

    #[test]
    fn sbc_signed_overflow() {
        // -128 - 1 = +127 with overflow
        let mut regs = regs_with_a(0x80);
        regs.p.carry = true;
        sbc(&mut regs, 0x01);
        assert_eq!(regs.a, 0x7F);
        assert!(regs.p.overflow);
        assert!(regs.p.carry);
    }

    #[test]
    fn sbc_carry_clear_subtracts_one_more() {
        let mut regs = regs_with_a(0x05);
        sbc(&mut regs, 0x05);
        assert_eq!(regs.a, 0xFF);
        assert!(!regs.p.carry);
    }

    #[test]
    fn compare_equal_and_less() {
        let mut regs = regs_with_a(0);
        compare(&mut regs.p, 0x10, 0x10);
        assert!(regs.p.carry && regs.p.zero && !regs.p.negative);

        compare(&mut regs.p, 0x05, 0x10);
        assert!(!regs.p.carry && !regs.p.zero && regs.p.negative);
    }

    #[test]
    fn bit_copies_high_bits_of_memory() {
        let mut regs = regs_with_a(0x0F);
        bit(&mut regs, 0xC0);
        assert!(regs.p.zero);
        assert!(regs.p.negative);
        assert!(regs.p.overflow);
        assert_eq!(regs.a, 0x0F);
    }

    #[test]
    fn asl_shifts_existing_value() {
        let mut regs = regs_with_a(0);
        assert_eq!(asl(&mut regs.p, 0x81), 0x02);
        assert!(regs.p.carry);
        assert!(!regs.p.zero);
    }

    #[test]
    fn rotates_move_carry_through() {
        let mut regs = regs_with_a(0);
        regs.p.carry = true;
        assert_eq!(rol(&mut regs.p, 0x80), 0x01);
        assert!(regs.p.carry);
        assert_eq!(ror(&mut regs.p, 0x01), 0x80);
        assert!(regs.p.carry);
        assert!(regs.p.negative);
        assert_eq!(lsr(&mut regs.p, 0x01), 0x00);
        assert!(regs.p.carry && regs.p.zero);
    }

    #[test]
    fn increment_and_decrement_wrap() {
        let mut regs = regs_with_a(0);
        assert_eq!(increment(&mut regs.p, 0xFF), 0x00);
        assert!(regs.p.zero);
        assert_eq!(decrement(&mut regs.p, 0x00), 0xFF);
        assert!(regs.p.negative);
    }

    #[test]
    fn txs_leaves_flags() {
        let mut regs = regs_with_a(0);
        regs.x = 0x00;
        txs(&mut regs);
        assert_eq!(regs.s, 0x00);
        assert!(!regs.p.zero);
    }

    #[test]
    fn branch_not_taken_keeps_pc() {
        let mut regs = regs_with_a(0);
        regs.pc = 0x0402;
        assert_eq!(branch(&mut regs, -2, false), Ok(0));
        assert_eq!(regs.pc, 0x0402);
    }

    #[test]
    fn branch_taken_costs_extra_across_page() {
        let mut regs = regs_with_a(0);
        regs.pc = 0x0402;
        assert_eq!(branch(&mut regs, 0x10, true), Ok(1));
        assert_eq!(regs.pc, 0x0412);

        regs.pc = 0x0402;
        assert_eq!(branch(&mut regs, -128, true), Ok(2));
        assert_eq!(regs.pc, 0x0382);
    }

    #[test]
    fn branch_target_outside_memory_is_out_of_range() {
        let mut regs = regs_with_a(0);
        regs.pc = 0xFFF2;
        assert_eq!(
            branch(&mut regs, 0x7F, true),
            Err(CpuError::OutOfRangeAddress(0x1_0071))
        );
        regs.pc = 0x0002;
        assert_eq!(
            branch(&mut regs, -128, true),
            Err(CpuError::OutOfRangeAddress(-126))
        );
        // Not taken never computes the target
        assert_eq!(branch(&mut regs, -128, false), Ok(0));
    }

    #[test]
    fn rts_to_ffff_is_out_of_range() {
        let mut bus = Memory::new();
        let mut regs = regs_with_a(0);
        regs.s = 0xFD;
        bus.poke(0x01FE, 0xFF);
        bus.poke(0x01FF, 0xFF);
        assert_eq!(
            rts(&mut bus, &mut regs),
            Err(CpuError::OutOfRangeAddress(0x1_0000))
        );
    }

    #[test]
    fn jsr_then_rts_round_trip() {
        let mut bus = Memory::new();
        let mut regs = regs_with_a(0);
        regs.s = 0xFF;
        regs.pc = 0x0603;
        jsr(&mut bus, &mut regs, 0x1000);
        assert_eq!(regs.pc, 0x1000);
        assert_eq!(bus.peek(0x01FF), 0x06);
        assert_eq!(bus.peek(0x01FE), 0x02);
        rts(&mut bus, &mut regs).expect("return address in range");
        assert_eq!(regs.pc, 0x0603);
        assert_eq!(regs.s, 0xFF);
    }

    #[test]
    fn brk_then_rti() {
        let mut bus = Memory::new();
        bus.poke(0xFFFE, 0x00);
        bus.poke(0xFFFF, 0x90);
        let mut regs = regs_with_a(0);
        regs.s = 0xFF;
        regs.p.carry = true;
        regs.pc = 0x0401; // BRK at $0400 already fetched

        brk(&mut bus, &mut regs).expect("return address in range");
        assert_eq!(regs.pc, 0x9000);
        assert!(regs.p.interrupt_disable);
        assert_eq!(bus.peek(0x01FF), 0x04);
        assert_eq!(bus.peek(0x01FE), 0x02);
        assert_eq!(bus.peek(0x01FD), 0x31); // C, B, bit 5

        rti(&mut bus, &mut regs);
        assert_eq!(regs.pc, 0x0402);
        assert_eq!(regs.s, 0xFF);
        assert!(regs.p.carry);
        assert!(!regs.p.interrupt_disable);
    }

    #[test]
    fn php_plp_restore_flags() {
        let mut bus = Memory::new();
        let mut regs = regs_with_a(0);
        regs.p.overflow = true;
        regs.p.decimal = true;
        php(&mut bus, &mut regs);
        assert_eq!(bus.peek(0x01FD), 0x78); // V, bit 5, B, D
        regs.p = Status::new();
        plp(&mut bus, &mut regs);
        assert!(regs.p.overflow && regs.p.decimal && regs.p.brk);
        assert!(!regs.p.carry);
    }

    #[test]
    fn set_flag_touches_one_flag() {
        let mut regs = regs_with_a(0);
        set_flag(&mut regs, Flag::Decimal, true);
        assert_eq!(regs.p.to_byte(), 0x28);
        set_flag(&mut regs, Flag::Decimal, false);
        assert_eq!(regs.p.to_byte(), 0x20);
    }
}
