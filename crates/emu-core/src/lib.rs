//! Core traits and types for instruction-stepped emulation.
//!
//! A CPU core executes whole instructions against a [`Bus`] and reports how
//! many cycles each one took. Everything a host needs to drive or inspect a
//! core lives here; the chips themselves live in their own crates.

mod bus;
mod cpu;
mod memory;
mod observable;
mod ticks;

pub use bus::Bus;
pub use cpu::Cpu;
pub use memory::{LoadError, MEMORY_SIZE, Memory};
pub use observable::{Observable, Value};
pub use ticks::Ticks;
