//! 6502 processor status register (P).
//!
//! Each flag is a named field. The packed byte form only exists when the
//! status is pushed to or pulled from the stack, so the bit positions below
//! are used for that conversion and nothing else.

/// Carry flag - set if operation resulted in carry/borrow.
pub const C: u8 = 0x01;

/// Zero flag - set if result is zero.
pub const Z: u8 = 0x02;

/// Interrupt disable - when set, IRQ interrupts are ignored.
pub const I: u8 = 0x04;

/// Decimal mode.
pub const D: u8 = 0x08;

/// Break flag - set in the byte pushed by BRK and PHP.
pub const B: u8 = 0x10;

/// Unused bit - always reads as 1 in a pushed status byte.
pub const U: u8 = 0x20;

/// Overflow flag - set if signed arithmetic overflowed.
pub const V: u8 = 0x40;

/// Negative flag - set if result has bit 7 set.
pub const N: u8 = 0x80;

/// A single status flag, for code that picks a flag at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Carry,
    Zero,
    InterruptDisable,
    Decimal,
    Break,
    Overflow,
    Negative,
}

impl Flag {
    /// Every flag, in bit order.
    pub const ALL: [Self; 7] = [
        Self::Carry,
        Self::Zero,
        Self::InterruptDisable,
        Self::Decimal,
        Self::Break,
        Self::Overflow,
        Self::Negative,
    ];

    /// Bit position of this flag in the packed status byte.
    #[must_use]
    pub const fn mask(self) -> u8 {
        match self {
            Self::Carry => C,
            Self::Zero => Z,
            Self::InterruptDisable => I,
            Self::Decimal => D,
            Self::Break => B,
            Self::Overflow => V,
            Self::Negative => N,
        }
    }
}

/// Processor status register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Status {
    pub carry: bool,
    pub zero: bool,
    pub interrupt_disable: bool,
    pub decimal: bool,
    pub brk: bool,
    pub overflow: bool,
    pub negative: bool,
}

impl Status {
    /// Create a status register with every flag clear.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            carry: false,
            zero: false,
            interrupt_disable: false,
            decimal: false,
            brk: false,
            overflow: false,
            negative: false,
        }
    }

    /// Unpack a status byte. Bit 5 is ignored.
    #[must_use]
    pub fn from_byte(value: u8) -> Self {
        let mut status = Self::new();
        for flag in Flag::ALL {
            status.set(flag, value & flag.mask() != 0);
        }
        status
    }

    /// Pack into a byte with the unused bit set and B taken from `brk`.
    #[must_use]
    pub fn to_byte(self) -> u8 {
        Flag::ALL
            .into_iter()
            .filter(|&flag| self.is_set(flag))
            .fold(U, |value, flag| value | flag.mask())
    }

    /// Packed value for BRK/PHP (break and unused both set).
    #[must_use]
    pub fn to_byte_brk(self) -> u8 {
        self.to_byte() | B
    }

    /// Check if a flag is set.
    #[must_use]
    pub const fn is_set(self, flag: Flag) -> bool {
        match flag {
            Flag::Carry => self.carry,
            Flag::Zero => self.zero,
            Flag::InterruptDisable => self.interrupt_disable,
            Flag::Decimal => self.decimal,
            Flag::Break => self.brk,
            Flag::Overflow => self.overflow,
            Flag::Negative => self.negative,
        }
    }

    /// Set or clear a flag.
    pub fn set(&mut self, flag: Flag, value: bool) {
        let field = match flag {
            Flag::Carry => &mut self.carry,
            Flag::Zero => &mut self.zero,
            Flag::InterruptDisable => &mut self.interrupt_disable,
            Flag::Decimal => &mut self.decimal,
            Flag::Break => &mut self.brk,
            Flag::Overflow => &mut self.overflow,
            Flag::Negative => &mut self.negative,
        };
        *field = value;
    }

    /// Update N and Z flags based on a value.
    pub fn update_nz(&mut self, value: u8) {
        self.negative = value & 0x80 != 0;
        self.zero = value == 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_round_trip_keeps_every_flag() {
        for value in 0..=0xFF_u8 {
            assert_eq!(Status::from_byte(value).to_byte(), value | U);
        }
    }

    #[test]
    fn brk_byte_forces_break_bit() {
        let status = Status::new();
        assert_eq!(status.to_byte(), U);
        assert_eq!(status.to_byte_brk(), U | B);
    }

    #[test]
    fn set_touches_only_the_named_flag() {
        let mut status = Status::from_byte(0xFF);
        status.set(Flag::Overflow, false);
        assert_eq!(status.to_byte(), 0xFF & !V);
        assert!(!status.is_set(Flag::Overflow));
        assert!(status.is_set(Flag::Carry));
    }

    #[test]
    fn update_nz() {
        let mut status = Status::new();
        status.update_nz(0x00);
        assert!(status.zero && !status.negative);
        status.update_nz(0x80);
        assert!(!status.zero && status.negative);
        status.update_nz(0x01);
        assert!(!status.zero && !status.negative);
    }

    #[test]
    fn each_flag_owns_its_mask_bit() {
        for flag in Flag::ALL {
            let status = Status::from_byte(flag.mask());
            assert!(status.is_set(flag), "{flag:?}");
            let mut others = Flag::ALL.into_iter().filter(|&other| other != flag);
            assert!(others.all(|other| !status.is_set(other)), "{flag:?}");
            assert_eq!(status.to_byte(), flag.mask() | U, "{flag:?}");
        }
    }

    #[test]
    fn flag_masks_match_hardware_layout() {
        assert_eq!(Flag::Carry.mask(), 0x01);
        assert_eq!(Flag::Break.mask(), 0x10);
        assert_eq!(Flag::Negative.mask(), 0x80);
    }
}
