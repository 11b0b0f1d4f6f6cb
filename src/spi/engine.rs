//! Bus transaction engine
//!
//! Drives the synchronous serial controller byte at a time: push a byte
//! into TXDR, busy-wait for the receive-ready flag, pull the captured byte
//! out of RXDR. The whole transaction runs under one chip-select bracket.

use crate::error::{Error, Result};
use crate::mmio::RegisterFile;
use crate::spi::regs::{self, Cr1, Cr2, Sr};
use crate::spi::{Chunk, ChipSelect, SpiBus};

/// Bus timing and mode configuration
///
/// Defaults match the bootloader's controller setup: maximum inter-byte
/// spacing, divide-by-3 clock, mode 0, MSB first.
#[derive(Debug, Clone, Copy)]
pub struct BusConfig {
    /// Clock cycles of lead time before the first bit of a byte (0..=7)
    pub lead: u32,
    /// Clock cycles of trail time after the last bit of a byte (0..=7)
    pub trail: u32,
    /// Clock cycles of idle time between bytes (0..=3)
    pub idle: u32,
    /// Clock divider
    pub divider: u32,
    /// Clock polarity: idle-high when set
    pub cpol: bool,
    /// Clock phase: sample on second edge when set
    pub cpha: bool,
    /// Shift data least-significant bit first when set
    pub lsb_first: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            lead: 7,
            trail: 7,
            idle: 3,
            divider: 3,
            cpol: false,
            cpha: false,
            lsb_first: false,
        }
    }
}

/// Retry budget for the receive-ready wait
///
/// The wait is unbounded by default, matching the fail-stop contract: a
/// wedged bus hangs the caller and only an external watchdog recovers.
/// A bounded policy turns a stall into [`Error::BusStall`] instead.
#[derive(Debug, Clone, Copy)]
pub struct WaitPolicy {
    max_polls: Option<u32>,
}

impl WaitPolicy {
    /// Spin forever until the flag comes up
    pub const fn unbounded() -> Self {
        Self { max_polls: None }
    }

    /// Give up after `max_polls` status reads
    pub const fn bounded(max_polls: u32) -> Self {
        Self {
            max_polls: Some(max_polls),
        }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Hardware bus transaction engine
///
/// Owns the controller register block. Construct exactly one per bus.
pub struct SpiEngine<R: RegisterFile> {
    regs: R,
    wait: WaitPolicy,
}

impl<R: RegisterFile> SpiEngine<R> {
    /// Initialize the controller and release every chip-select line.
    ///
    /// Must run before any transaction is attempted.
    pub fn new(mut regs: R, config: BusConfig, wait: WaitPolicy) -> Self {
        regs.write32(
            regs::CR0,
            regs::cr0_tidle(config.idle)
                | regs::cr0_ttrail(config.trail)
                | regs::cr0_tlead(config.lead),
        );
        regs.write32(regs::CR1, Cr1::ENABLE.bits());

        let mut cr2 = Cr2::MASTER | Cr2::MCSH;
        cr2.set(Cr2::CPOL, config.cpol);
        cr2.set(Cr2::CPHA, config.cpha);
        cr2.set(Cr2::LSBF, config.lsb_first);
        regs.write32(regs::CR2, cr2.bits());

        regs.write32(regs::BR, config.divider);
        regs.write32(regs::CSR, regs::CS_IDLE);

        Self { regs, wait }
    }

    /// Exchange one byte: transmit, wait for receive-ready, capture.
    fn exchange(&mut self, tx: u8) -> Result<u8> {
        self.regs.write32(regs::TXDR, tx as u32);
        self.wait_rx_ready()?;
        Ok(self.regs.read32(regs::RXDR) as u8)
    }

    fn wait_rx_ready(&mut self) -> Result<()> {
        let mut polls = 0u32;
        loop {
            let sr = Sr::from_bits_truncate(self.regs.read32(regs::SR));
            if sr.contains(Sr::RRDY) {
                return Ok(());
            }
            if let Some(max) = self.wait.max_polls {
                polls += 1;
                if polls >= max {
                    return Err(Error::BusStall);
                }
            }
        }
    }

    fn run_chunk(&mut self, chunk: &mut Chunk<'_>) -> Result<()> {
        match chunk {
            Chunk::Write(buf) => {
                for &byte in buf.iter() {
                    self.exchange(byte)?;
                }
            }
            Chunk::Read(buf) => {
                for byte in buf.iter_mut() {
                    *byte = self.exchange(0x00)?;
                }
            }
            Chunk::Transfer(buf) => {
                for byte in buf.iter_mut() {
                    *byte = self.exchange(*byte)?;
                }
            }
            Chunk::Delay(n) => {
                for _ in 0..*n {
                    self.exchange(0x00)?;
                }
            }
        }
        Ok(())
    }
}

impl<R: RegisterFile> SpiBus for SpiEngine<R> {
    fn transact(&mut self, cs: ChipSelect, chunks: &mut [Chunk<'_>]) -> Result<()> {
        self.regs
            .write32(regs::CSR, regs::CS_IDLE ^ (1 << cs as u32));

        let mut result = Ok(());
        for chunk in chunks.iter_mut() {
            result = self.run_chunk(chunk);
            if result.is_err() {
                break;
            }
        }

        // Release the bus unconditionally, stall or not
        self.regs.write32(regs::CSR, regs::CS_IDLE);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    /// Scripted register file: records every write, serves RXDR from a
    /// queue, and reports receive-ready after a configurable number of
    /// status polls.
    struct FakeRegs {
        writes: Vec<(usize, u32)>,
        rx: RefCell<VecDeque<u8>>,
        rrdy_after: u32,
        sr_reads: Cell<u32>,
    }

    impl FakeRegs {
        fn new() -> Self {
            Self {
                writes: Vec::new(),
                rx: RefCell::new(VecDeque::new()),
                rrdy_after: 0,
                sr_reads: Cell::new(0),
            }
        }

        fn with_rx(bytes: &[u8]) -> Self {
            let regs = Self::new();
            regs.rx.borrow_mut().extend(bytes.iter().copied());
            regs
        }

        fn csr_writes(&self) -> Vec<u32> {
            self.writes
                .iter()
                .filter(|(off, _)| *off == regs::CSR)
                .map(|(_, v)| *v)
                .collect()
        }

        fn tx_bytes(&self) -> Vec<u8> {
            self.writes
                .iter()
                .filter(|(off, _)| *off == regs::TXDR)
                .map(|(_, v)| *v as u8)
                .collect()
        }
    }

    impl RegisterFile for FakeRegs {
        fn read32(&self, offset: usize) -> u32 {
            match offset {
                regs::SR => {
                    self.sr_reads.set(self.sr_reads.get() + 1);
                    if self.sr_reads.get() > self.rrdy_after {
                        Sr::RRDY.bits()
                    } else {
                        0
                    }
                }
                regs::RXDR => self.rx.borrow_mut().pop_front().unwrap_or(0xFF) as u32,
                _ => 0,
            }
        }

        fn write32(&mut self, offset: usize, value: u32) {
            self.writes.push((offset, value));
        }
    }

    fn engine(regs: FakeRegs) -> SpiEngine<FakeRegs> {
        SpiEngine::new(regs, BusConfig::default(), WaitPolicy::unbounded())
    }

    #[test]
    fn init_programs_controller_and_releases_cs() {
        let eng = engine(FakeRegs::new());
        let writes = &eng.regs.writes;

        assert!(writes.contains(&(regs::CR0, 0xFF)));
        assert!(writes.contains(&(regs::CR1, Cr1::ENABLE.bits())));
        assert!(writes.contains(&(regs::CR2, (Cr2::MASTER | Cr2::MCSH).bits())));
        assert!(writes.contains(&(regs::BR, 3)));
        assert_eq!(writes.last(), Some(&(regs::CSR, regs::CS_IDLE)));
    }

    #[test]
    fn transact_brackets_chip_select() {
        let mut eng = engine(FakeRegs::new());
        let mut chunks = [Chunk::Write(&[0xAB])];
        eng.transact(ChipSelect::Flash, &mut chunks).unwrap();

        let csr = eng.regs.csr_writes();
        // init release, assert flash (bit 0 low), final release
        assert_eq!(csr, vec![0xF, 0xE, 0xF]);
    }

    #[test]
    fn transact_selects_requested_target() {
        let mut eng = engine(FakeRegs::new());
        eng.transact(ChipSelect::Ram, &mut []).unwrap();
        assert_eq!(eng.regs.csr_writes(), vec![0xF, 0xD, 0xF]);
    }

    #[test]
    fn zero_chunk_transact_still_releases_cs() {
        let mut eng = engine(FakeRegs::new());
        eng.transact(ChipSelect::Flash, &mut []).unwrap();
        assert_eq!(eng.regs.csr_writes().last(), Some(&regs::CS_IDLE));
        assert!(eng.regs.tx_bytes().is_empty());
    }

    #[test]
    fn read_and_delay_legs_transmit_zero_filler() {
        let mut regs = FakeRegs::with_rx(&[0x11, 0x22, 0x33]);
        regs.rrdy_after = 0;
        let mut eng = engine(regs);

        let mut buf = [0u8; 2];
        let mut chunks = [Chunk::Delay(1), Chunk::Read(&mut buf)];
        eng.transact(ChipSelect::Flash, &mut chunks).unwrap();

        assert_eq!(eng.regs.tx_bytes(), vec![0x00, 0x00, 0x00]);
        assert_eq!(buf, [0x22, 0x33]);
    }

    #[test]
    fn transfer_leg_is_full_duplex_in_place() {
        let mut eng = engine(FakeRegs::with_rx(&[0xA0, 0xA1]));
        let mut buf = [0x50, 0x51];
        let mut chunks = [Chunk::Transfer(&mut buf)];
        eng.transact(ChipSelect::Flash, &mut chunks).unwrap();

        assert_eq!(eng.regs.tx_bytes(), vec![0x50, 0x51]);
        assert_eq!(buf, [0xA0, 0xA1]);
    }

    #[test]
    fn bounded_wait_surfaces_stall_and_releases_cs() {
        let mut regs = FakeRegs::new();
        regs.rrdy_after = u32::MAX; // never ready
        let mut eng = SpiEngine::new(regs, BusConfig::default(), WaitPolicy::bounded(8));

        let mut chunks = [Chunk::Write(&[0x00])];
        let err = eng.transact(ChipSelect::Flash, &mut chunks);
        assert_eq!(err, Err(Error::BusStall));
        assert_eq!(eng.regs.csr_writes().last(), Some(&regs::CS_IDLE));
    }
}
