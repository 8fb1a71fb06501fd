//! Memory and I/O bus interface.

/// Memory and I/O bus interface.
///
/// CPU cores access memory through this trait. The bus decides what lives at
/// each address; for the plain 64KB case see [`crate::Memory`].
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);

    /// Read a little-endian word from `address` and `address + 1`.
    ///
    /// The second address wraps at $FFFF.
    fn read_word(&mut self, address: u16) -> u16 {
        let low = self.read(address);
        let high = self.read(address.wrapping_add(1));
        u16::from_le_bytes([low, high])
    }
}
