//! Firmware-update backend
//!
//! Bridges the external update-protocol engine to the flash codec. Every
//! erase/program/read request is validated against the zone table before
//! any hardware access; rejected requests never touch the bus.
//!
//! Completion is caller-polled: program and erase return as soon as the
//! command is on the wire, and the engine is expected to poll
//! [`UpdateBackend::is_busy`] before issuing the next flash operation.

use crate::boot::{BootControl, BootImage};
use crate::error::{Error, Result};
use crate::flash::{opcodes, Flash, StatusRegister};
use crate::spi::SpiBus;
use crate::zone::ZoneTable;

/// Supported erase granularities, keyed by request size
///
/// Dispatch is a closed match: one request selects exactly one erase
/// command, never a cascade of granularities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseGranularity {
    /// 4 KiB sector erase
    Sector4k,
    /// 32 KiB block erase
    Block32k,
    /// 64 KiB block erase
    Block64k,
}

impl EraseGranularity {
    /// Map a request size to its granularity
    pub fn from_size(size: u32) -> Result<Self> {
        match size {
            4096 => Ok(Self::Sector4k),
            32768 => Ok(Self::Block32k),
            65536 => Ok(Self::Block64k),
            _ => Err(Error::UnsupportedEraseSize),
        }
    }

    /// Number of bytes this granularity erases
    pub const fn size(self) -> u32 {
        match self {
            Self::Sector4k => 4096,
            Self::Block32k => 32768,
            Self::Block64k => 65536,
        }
    }
}

/// Update backend: flash codec plus zone table plus boot handoff
///
/// Constructed once at boot, before any update-protocol traffic, and
/// alive until [`UpdateBackend::reboot`] ends the process.
pub struct UpdateBackend<B: SpiBus, C: BootControl> {
    flash: Flash<B>,
    zones: ZoneTable,
    boot: C,
}

impl<B: SpiBus, C: BootControl> UpdateBackend<B, C> {
    /// Build the backend over an initialized codec and a fixed zone table
    pub fn new(flash: Flash<B>, zones: ZoneTable, boot: C) -> Self {
        Self { flash, zones, boot }
    }

    /// The configured zone table
    pub fn zones(&self) -> &ZoneTable {
        &self.zones
    }

    /// Report whether the flash is still working on a program or erase
    ///
    /// Reads the busy bit of status register 1; never waits.
    pub fn is_busy(&mut self) -> Result<bool> {
        let sr1 = self.flash.read_status(StatusRegister::Sr1)?;
        Ok(sr1 & opcodes::SR1_BUSY != 0)
    }

    /// Returns true if bootloader-zone updates are allowed
    ///
    /// The bootloader's own zones are only updatable while every
    /// protection bit in status register 1 is clear.
    pub fn bootloader_update_allowed(&mut self) -> Result<bool> {
        let sr1 = self.flash.read_status(StatusRegister::Sr1)?;
        Ok(sr1 & opcodes::SR1_PROTECT_MASK == 0)
    }

    /// Erase one sector or block at `addr`
    ///
    /// `size` selects the granularity (4096, 32768 or 65536); anything
    /// else is rejected before any hardware access, as is a range not
    /// contained in a single zone. Emits write-enable immediately before
    /// the single erase command.
    pub fn erase(&mut self, addr: u32, size: u32) -> Result<()> {
        let granularity = EraseGranularity::from_size(size)?;
        self.zones.check(addr, granularity.size()).map_err(|e| {
            log::warn!("erase of {} B at {:#010x} rejected: out of zone", size, addr);
            e
        })?;

        log::debug!("erase {:?} at {:#010x}", granularity, addr);
        self.flash.write_enable()?;
        match granularity {
            EraseGranularity::Sector4k => self.flash.sector_erase(addr),
            EraseGranularity::Block32k => self.flash.block_erase_32k(addr),
            EraseGranularity::Block64k => self.flash.block_erase_64k(addr),
        }
    }

    /// Program `data` starting at `addr`
    ///
    /// The range must sit in a single zone and within one flash page.
    /// Does not poll completion.
    pub fn program(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        self.zones.check(addr, data.len() as u32).map_err(|e| {
            log::warn!(
                "program of {} B at {:#010x} rejected: out of zone",
                data.len(),
                addr
            );
            e
        })?;

        log::trace!("program {} B at {:#010x}", data.len(), addr);
        self.flash.write_enable()?;
        self.flash.page_program(addr, data)
    }

    /// Read `dst.len()` bytes starting at `addr`
    ///
    /// Reads need no write-enable latch.
    pub fn read(&mut self, addr: u32, dst: &mut [u8]) -> Result<()> {
        self.zones.check(addr, dst.len() as u32)?;
        self.flash.read(addr, dst)
    }

    /// Raw full-duplex passthrough, bypassing zone validation
    ///
    /// Low-level diagnostics only.
    pub fn raw(&mut self, buf: &mut [u8]) -> Result<()> {
        self.flash.raw(buf)
    }

    /// Hand off execution to the application image
    ///
    /// Disconnects the update transport, then arms the boot word. Never
    /// returns; no flash operation is observable afterwards.
    pub fn reboot(self) -> ! {
        self.boot.reboot(BootImage::Application)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flash::tests::MockBus;
    use crate::zone::Zone;

    /// Test boot control; reboot is never reached in these tests.
    struct PanicBoot;

    impl BootControl for PanicBoot {
        fn reboot(self, _image: BootImage) -> ! {
            panic!("reboot in test");
        }
    }

    fn backend(bus: MockBus) -> UpdateBackend<MockBus, PanicBoot> {
        let zones = ZoneTable::new(&[
            Zone::new(0x0008_0000, 0x000A_0000),
            Zone::new(0x000A_0000, 0x000C_0000),
        ])
        .unwrap();
        UpdateBackend::new(Flash::new(bus), zones, PanicBoot)
    }

    /// The full bootloader layout: application bitstream/firmware pair
    /// followed by the bootloader's own bitstream/firmware pair.
    fn four_zone_backend(bus: MockBus) -> UpdateBackend<MockBus, PanicBoot> {
        let zones = ZoneTable::new(&[
            Zone::new(0x0008_0000, 0x000A_0000),
            Zone::new(0x000A_0000, 0x000C_0000),
            Zone::new(0x0004_0000, 0x0006_0000),
            Zone::new(0x0006_0000, 0x0008_0000),
        ])
        .unwrap();
        UpdateBackend::new(Flash::new(bus), zones, PanicBoot)
    }

    fn transactions(backend: &mut UpdateBackend<MockBus, PanicBoot>) -> &Vec<Vec<u8>> {
        &backend.flash.bus_mut().transactions
    }

    #[test]
    fn accepted_program_emits_wren_then_page_program() {
        let mut backend = backend(MockBus::new());
        let data = [0xAAu8; 256];
        backend.program(0x0008_5000, &data).unwrap();

        let txs = transactions(&mut backend);
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0], vec![0x06]); // WREN, nothing in between
        assert_eq!(&txs[1][..4], &[0x02, 0x08, 0x50, 0x00]);
        assert_eq!(txs[1].len(), 4 + 256);
    }

    #[test]
    fn boundary_crossing_program_is_rejected_without_bus_traffic() {
        let mut backend = backend(MockBus::new());
        let data = [0xAAu8; 256];
        let err = backend.program(0x0009_FF80, &data);

        assert_eq!(err, Err(Error::AddressOutOfZone));
        assert!(transactions(&mut backend).is_empty());
    }

    #[test]
    fn erase_dispatches_exactly_one_command_per_granularity() {
        for (size, opcode) in [(4096u32, 0x20u8), (32768, 0x52), (65536, 0xD8)] {
            let mut backend = backend(MockBus::new());
            backend.erase(0x0008_0000, size).unwrap();

            let txs = transactions(&mut backend);
            assert_eq!(txs.len(), 2, "size {}", size);
            assert_eq!(txs[0], vec![0x06]);
            assert_eq!(txs[1], vec![opcode, 0x08, 0x00, 0x00]);
        }
    }

    #[test]
    fn unsupported_erase_size_is_surfaced_without_bus_traffic() {
        let mut backend = backend(MockBus::new());
        // 32678 is a plausible transposition of 32768
        for size in [0u32, 4095, 32678, 8192, 65537] {
            assert_eq!(
                backend.erase(0x0008_0000, size),
                Err(Error::UnsupportedEraseSize)
            );
        }
        assert!(transactions(&mut backend).is_empty());
    }

    #[test]
    fn out_of_zone_erase_is_rejected() {
        let mut backend = backend(MockBus::new());
        assert_eq!(
            backend.erase(0x0000_0000, 4096),
            Err(Error::AddressOutOfZone)
        );
        assert!(transactions(&mut backend).is_empty());
    }

    #[test]
    fn read_does_not_write_enable() {
        let mut backend = backend(MockBus::new());
        let mut buf = [0u8; 16];
        backend.read(0x000A_0000, &mut buf).unwrap();

        let txs = transactions(&mut backend);
        assert_eq!(txs.len(), 1);
        assert_eq!(&txs[0][..4], &[0x03, 0x0A, 0x00, 0x00]);
    }

    #[test]
    fn out_of_zone_read_is_rejected() {
        let mut backend = backend(MockBus::new());
        let mut buf = [0u8; 16];
        assert_eq!(
            backend.read(0x000C_0000, &mut buf),
            Err(Error::AddressOutOfZone)
        );
        assert!(transactions(&mut backend).is_empty());
    }

    #[test]
    fn raw_bypasses_zone_validation() {
        let mut backend = backend(MockBus::new());
        let mut buf = [0x9F, 0x00, 0x00, 0x00];
        backend.raw(&mut buf).unwrap();

        assert_eq!(transactions(&mut backend).len(), 1);
    }

    #[test]
    fn is_busy_reports_sr1_bit0() {
        let mut backend = backend(MockBus::with_rx(&[0x01, 0x02]));
        assert!(backend.is_busy().unwrap());
        assert!(!backend.is_busy().unwrap());
    }

    #[test]
    fn unlocked_flash_allows_bootloader_zone_update() {
        // SR1 reads 0x00: every protection bit clear
        let mut backend = four_zone_backend(MockBus::with_rx(&[0x00]));
        assert!(backend.bootloader_update_allowed().unwrap());

        backend.erase(0x0004_0000, 4096).unwrap();
        let page = [0x55u8; 256];
        backend.program(0x0006_0000, &page).unwrap();

        let txs = transactions(&mut backend);
        assert_eq!(txs.len(), 5);
        assert_eq!(txs[0][0], 0x05); // the protection check
        assert_eq!(txs[1], vec![0x06]);
        assert_eq!(txs[2], vec![0x20, 0x04, 0x00, 0x00]);
        assert_eq!(txs[3], vec![0x06]);
        assert_eq!(&txs[4][..4], &[0x02, 0x06, 0x00, 0x00]);
    }

    #[test]
    fn locked_flash_reports_bootloader_update_disallowed() {
        // SR1 with block-protect bits set; the caller is expected to
        // stop advertising the bootloader zones on this answer
        let mut backend = four_zone_backend(MockBus::with_rx(&[0x1C]));
        assert!(!backend.bootloader_update_allowed().unwrap());
    }

    #[test]
    fn bootloader_update_allowed_checks_protection_bits() {
        let mut backend = backend(MockBus::with_rx(&[0x00, 0x0C]));
        assert!(backend.bootloader_update_allowed().unwrap());
        assert!(!backend.bootloader_update_allowed().unwrap());
    }

    #[test]
    fn erase_granularity_round_trip() {
        assert_eq!(
            EraseGranularity::from_size(4096),
            Ok(EraseGranularity::Sector4k)
        );
        assert_eq!(EraseGranularity::Block64k.size(), 65536);
        assert_eq!(
            EraseGranularity::from_size(1024),
            Err(Error::UnsupportedEraseSize)
        );
    }
}
