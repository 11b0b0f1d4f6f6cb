//! SPI controller register map
//!
//! Byte offsets and field encodings for the synchronous serial controller
//! block. The chip-select register is active-low, one bit per line.

use bitflags::bitflags;

/// Interrupt status register
pub const IRQ: usize = 0x18;
/// Interrupt enable register
pub const IRQEN: usize = 0x1C;
/// Control register 0 - inter-byte timing
pub const CR0: usize = 0x20;
/// Control register 1 - core enable
pub const CR1: usize = 0x24;
/// Control register 2 - mode configuration
pub const CR2: usize = 0x28;
/// Baud rate register - clock divider
pub const BR: usize = 0x2C;
/// Status register
pub const SR: usize = 0x30;
/// Transmit data register
pub const TXDR: usize = 0x34;
/// Receive data register
pub const RXDR: usize = 0x38;
/// Chip select register (active low)
pub const CSR: usize = 0x3C;

/// All chip-select lines deasserted
pub const CS_IDLE: u32 = 0xF;

/// CR0 idle-time field (2 bits, shifted to [7:6])
#[inline]
pub const fn cr0_tidle(count: u32) -> u32 {
    (count & 3) << 6
}

/// CR0 trail-time field (3 bits, shifted to [5:3])
#[inline]
pub const fn cr0_ttrail(count: u32) -> u32 {
    (count & 7) << 3
}

/// CR0 lead-time field (3 bits, [2:0])
#[inline]
pub const fn cr0_tlead(count: u32) -> u32 {
    count & 7
}

bitflags! {
    /// Control register 1 fields
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Cr1: u32 {
        /// Core enable
        const ENABLE = 1 << 7;
        /// Wake on user event
        const WKUPEN_USER = 1 << 6;
        /// Transmit on alternate clock edge
        const TXEDGE = 1 << 4;
    }
}

bitflags! {
    /// Control register 2 fields
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Cr2: u32 {
        /// Master mode
        const MASTER = 1 << 7;
        /// Manual chip-select hold (CS driven via CSR, not per-byte)
        const MCSH = 1 << 6;
        /// Slave dummy-byte response enable
        const SDBRE = 1 << 5;
        /// Clock polarity
        const CPOL = 1 << 2;
        /// Clock phase
        const CPHA = 1 << 1;
        /// Least-significant-bit-first data order
        const LSBF = 1 << 0;
    }
}

bitflags! {
    /// Status register fields
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Sr: u32 {
        /// Transfer in progress
        const TIP = 1 << 7;
        /// Core busy
        const BUSY = 1 << 6;
        /// Transmit ready
        const TRDY = 1 << 4;
        /// Receive ready - a captured byte is waiting in RXDR
        const RRDY = 1 << 3;
        /// Transmit overrun
        const TOE = 1 << 2;
        /// Receive overrun
        const ROE = 1 << 1;
        /// Mode fault
        const MDF = 1 << 0;
    }
}
