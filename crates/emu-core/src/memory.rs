//! Flat 64KB memory.

use std::fmt;

use crate::Bus;

/// Number of addressable bytes on a 16-bit address bus.
pub const MEMORY_SIZE: usize = 0x1_0000;

/// A rejected [`Memory::load`] request. Memory is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The image alone is larger than the whole address space.
    ImageTooLarge(usize),
    /// The image fits in memory but not when placed at `base`.
    OutOfBounds { base: u16, len: usize },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageTooLarge(len) => write!(
                f,
                "invalid load request: image is {len} bytes, memory holds {MEMORY_SIZE}"
            ),
            Self::OutOfBounds { base, len } => write!(
                f,
                "invalid load request: {len} bytes at ${base:04X} runs past $FFFF"
            ),
        }
    }
}

impl std::error::Error for LoadError {}

/// 64KB of flat RAM covering the whole address space.
///
/// Every address is backed by a byte, so reads and writes never fail. The
/// buffer is allocated once and never resized.
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    ram: Box<[u8]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memory").field("size", &self.ram.len()).finish()
    }
}

impl Memory {
    /// Create zero-filled memory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: vec![0; MEMORY_SIZE].into_boxed_slice(),
        }
    }

    /// Create zero-filled memory with `image` copied in at `base`.
    pub fn from_image(base: u16, image: &[u8]) -> Result<Self, LoadError> {
        let mut memory = Self::new();
        memory.load(base, image)?;
        Ok(memory)
    }

    /// Copy `image` into memory starting at `base`.
    ///
    /// The whole image must fit between `base` and $FFFF; otherwise nothing
    /// is written.
    pub fn load(&mut self, base: u16, image: &[u8]) -> Result<(), LoadError> {
        if image.len() > MEMORY_SIZE {
            return Err(LoadError::ImageTooLarge(image.len()));
        }
        let start = usize::from(base);
        let end = start + image.len();
        if end > MEMORY_SIZE {
            return Err(LoadError::OutOfBounds {
                base,
                len: image.len(),
            });
        }
        self.ram[start..end].copy_from_slice(image);
        Ok(())
    }

    /// Read a byte without going through the [`Bus`] trait.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.ram[usize::from(address)]
    }

    /// Write a byte without going through the [`Bus`] trait.
    pub fn poke(&mut self, address: u16, value: u8) {
        self.ram[usize::from(address)] = value;
    }

    /// The full 64KB contents.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.ram
    }
}

impl Bus for Memory {
    fn read(&mut self, address: u16) -> u8 {
        self.peek(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        self.poke(address, value);
    }
}
