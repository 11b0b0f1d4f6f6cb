//! Flash command codec
//!
//! Translates flash-semantic operations into command-byte sequences run as
//! chunked transactions on the [`SpiBus`]. Each operation is one
//! chip-select bracket.
//!
//! The codec does not poll for completion: after a program or erase the
//! device stays busy until the operation finishes, and the caller is
//! expected to poll the busy bit of status register 1 before issuing the
//! next flash command.

pub mod opcodes;

use crate::error::{Error, Result};
use crate::spi::{ChipSelect, Chunk, SpiBus};

/// One of the three flash status registers
///
/// The register index is closed at the type level: an out-of-range index
/// is only representable as a failed [`StatusRegister::from_index`]
/// conversion, never as a silently ignored command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusRegister {
    /// Status register 1 (busy bit, write-enable latch, protection bits)
    Sr1,
    /// Status register 2
    Sr2,
    /// Status register 3
    Sr3,
}

impl StatusRegister {
    /// Convert a 1-based register index as carried on the wire
    pub fn from_index(index: u8) -> Result<Self> {
        match index {
            1 => Ok(Self::Sr1),
            2 => Ok(Self::Sr2),
            3 => Ok(Self::Sr3),
            _ => Err(Error::InvalidStatusRegister),
        }
    }

    fn read_opcode(self) -> u8 {
        match self {
            Self::Sr1 => opcodes::RDSR,
            Self::Sr2 => opcodes::RDSR2,
            Self::Sr3 => opcodes::RDSR3,
        }
    }

    fn write_opcode(self) -> u8 {
        match self {
            Self::Sr1 => opcodes::WRSR,
            Self::Sr2 => opcodes::WRSR2,
            Self::Sr3 => opcodes::WRSR3,
        }
    }
}

/// Encode an opcode plus 3-byte big-endian address header
#[inline]
fn cmd_addr(opcode: u8, addr: u32) -> [u8; 4] {
    [
        opcode,
        (addr >> 16) as u8,
        (addr >> 8) as u8,
        addr as u8,
    ]
}

/// Flash command codec over a SPI bus
///
/// Owns the bus for the process lifetime; the flash device sits on the
/// `Flash` chip-select line.
pub struct Flash<B: SpiBus> {
    bus: B,
}

impl<B: SpiBus> Flash<B> {
    /// Wrap an initialized bus
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Issue a bare single-byte command
    fn command(&mut self, opcode: u8) -> Result<()> {
        self.bus
            .transact(ChipSelect::Flash, &mut [Chunk::Write(&[opcode])])
    }

    /// Read the 3-byte JEDEC manufacturer/device ID
    pub fn manufacturer_id(&mut self) -> Result<[u8; 3]> {
        let mut id = [0u8; 3];
        self.bus.transact(
            ChipSelect::Flash,
            &mut [Chunk::Write(&[opcodes::RDID]), Chunk::Read(&mut id)],
        )?;
        Ok(id)
    }

    /// Read the 8-byte factory-programmed unique ID
    ///
    /// The command requires 4 dummy bytes between the opcode and the ID.
    pub fn unique_id(&mut self) -> Result<[u8; 8]> {
        let mut id = [0u8; 8];
        self.bus.transact(
            ChipSelect::Flash,
            &mut [
                Chunk::Write(&[opcodes::RDUID]),
                Chunk::Delay(4),
                Chunk::Read(&mut id),
            ],
        )?;
        Ok(id)
    }

    /// Read one status register
    pub fn read_status(&mut self, sr: StatusRegister) -> Result<u8> {
        let mut value = [0u8; 1];
        self.bus.transact(
            ChipSelect::Flash,
            &mut [Chunk::Write(&[sr.read_opcode()]), Chunk::Read(&mut value)],
        )?;
        Ok(value[0])
    }

    /// Write one status register
    pub fn write_status(&mut self, sr: StatusRegister, value: u8) -> Result<()> {
        self.bus.transact(
            ChipSelect::Flash,
            &mut [Chunk::Write(&[sr.write_opcode(), value])],
        )
    }

    /// Set the write-enable latch
    ///
    /// The flash clears the latch itself after completing any program or
    /// erase, so this must be reissued immediately before each one.
    pub fn write_enable(&mut self) -> Result<()> {
        self.command(opcodes::WREN)
    }

    /// Clear the write-enable latch
    pub fn write_disable(&mut self) -> Result<()> {
        self.command(opcodes::WRDI)
    }

    /// Enable writes to the volatile status register copy
    pub fn write_enable_volatile(&mut self) -> Result<()> {
        self.command(opcodes::WREN_VOLATILE)
    }

    /// Enter deep power down
    pub fn deep_power_down(&mut self) -> Result<()> {
        self.command(opcodes::DP)
    }

    /// Release from deep power down
    pub fn wake_up(&mut self) -> Result<()> {
        self.command(opcodes::RDP)
    }

    /// Read `dst.len()` bytes starting at `addr`
    pub fn read(&mut self, addr: u32, dst: &mut [u8]) -> Result<()> {
        let cmd = cmd_addr(opcodes::READ, addr);
        self.bus.transact(
            ChipSelect::Flash,
            &mut [Chunk::Write(&cmd), Chunk::Read(dst)],
        )
    }

    /// Program `src` starting at `addr`
    ///
    /// The caller must keep the data within one physical page; the codec
    /// does not split or check page boundaries.
    pub fn page_program(&mut self, addr: u32, src: &[u8]) -> Result<()> {
        let cmd = cmd_addr(opcodes::PP, addr);
        self.bus.transact(
            ChipSelect::Flash,
            &mut [Chunk::Write(&cmd), Chunk::Write(src)],
        )
    }

    fn erase(&mut self, opcode: u8, addr: u32) -> Result<()> {
        let cmd = cmd_addr(opcode, addr);
        self.bus
            .transact(ChipSelect::Flash, &mut [Chunk::Write(&cmd)])
    }

    /// Erase the 4 KiB sector containing `addr`
    pub fn sector_erase(&mut self, addr: u32) -> Result<()> {
        self.erase(opcodes::SE, addr)
    }

    /// Erase the 32 KiB block containing `addr`
    pub fn block_erase_32k(&mut self, addr: u32) -> Result<()> {
        self.erase(opcodes::BE_32K, addr)
    }

    /// Erase the 64 KiB block containing `addr`
    pub fn block_erase_64k(&mut self, addr: u32) -> Result<()> {
        self.erase(opcodes::BE_64K, addr)
    }

    /// Raw full-duplex passthrough for diagnostic command injection
    ///
    /// Transmits the buffer as-is and overwrites it with the captured
    /// bytes, bypassing the codec entirely.
    pub fn raw(&mut self, buf: &mut [u8]) -> Result<()> {
        self.bus
            .transact(ChipSelect::Flash, &mut [Chunk::Transfer(buf)])
    }

    /// Access the underlying bus
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}
