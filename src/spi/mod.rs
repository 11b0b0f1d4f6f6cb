//! Bus transaction types and the `SpiBus` seam
//!
//! A transaction is one chip-select bracket around a sequence of
//! [`Chunk`] legs. Exactly one target is asserted for the duration of the
//! call; the bus is released unconditionally on return.

mod engine;
pub mod regs;

pub use engine::{BusConfig, SpiEngine, WaitPolicy};

use crate::error::Result;

/// Peripherals sharing the bus, by chip-select line number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipSelect {
    /// The NOR flash device
    Flash = 0,
    /// The external RAM device
    Ram = 1,
}

/// One leg of a duplex exchange
///
/// Each variant covers one combination of the read/write capture flags:
/// a leg either transmits real data, captures received data, does both in
/// place, or just clocks filler bytes (used for mandatory dummy bytes).
pub enum Chunk<'a> {
    /// Transmit the bytes; discard whatever is received
    Write(&'a [u8]),
    /// Transmit zero filler; store each received byte into the buffer
    Read(&'a mut [u8]),
    /// Full duplex in place: transmit `buf[i]`, then overwrite it with
    /// the received byte
    Transfer(&'a mut [u8]),
    /// Clock this many zero filler bytes; nothing is captured
    Delay(usize),
}

/// Synchronous, blocking SPI bus
///
/// Not reentrant: implementations assume a single logical caller and must
/// never be invoked while a transaction is already in flight. The
/// chip-select bracket inside `transact` is the only mutual-exclusion
/// mechanism on the shared bus.
pub trait SpiBus {
    /// Run one bracketed transaction against the selected target.
    ///
    /// Processes the chunks in order, then deasserts every chip-select
    /// line, including when `chunks` is empty.
    fn transact(&mut self, cs: ChipSelect, chunks: &mut [Chunk<'_>]) -> Result<()>;
}
