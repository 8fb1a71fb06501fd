//! CPU core trait.

use crate::Bus;

/// A CPU core that executes one instruction per step.
///
/// The bus is passed in, not owned, so the caller keeps exclusive ownership of
/// memory between steps and can inspect or patch it freely.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Outcome of a single step (cycles consumed plus engine status).
    type Step;

    /// Execute exactly one instruction.
    fn step<B: Bus>(&mut self, bus: &mut B) -> Self::Step;

    /// Reset the CPU, loading the program counter from the reset vector.
    fn reset<B: Bus>(&mut self, bus: &mut B);

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true while the CPU is stopped (halted or faulted).
    fn is_halted(&self) -> bool;
}
