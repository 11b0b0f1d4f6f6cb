//! Boot control interface
//!
//! One hardware control word selects which stored image executes after the
//! next reset. Writing the word with the arm bit set triggers the reset
//! immediately, so the handoff never returns: it is a one-way state
//! transition, and the type system says so.

use crate::mmio::RegisterFile;

/// Boot word register, at the base of the misc block
///
/// The status-indicator register occupies the next word (0x04); driving
/// it is outside this crate.
pub const BOOT: usize = 0x00;

/// Arm bit: the image select takes effect and the reset fires when this
/// is written together with the selection bits
const BOOT_ARM: u32 = 1 << 2;

/// Stored images selectable through the boot word
///
/// The low two bits of the boot word index the image slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootImage {
    /// The bootloader's own image pair
    Bootloader = 0,
    /// The application image pair
    Application = 2,
}

impl BootImage {
    /// Encode the armed boot word for this image
    pub const fn select_word(self) -> u32 {
        BOOT_ARM | self as u32
    }
}

/// Seam to the external update transport
///
/// `disconnect` must make an attached host observe a clean removal; it is
/// called strictly before the device disappears in a reset.
pub trait Transport {
    /// Signal the transport to detach from the host
    fn disconnect(&mut self);
}

/// Boot handoff
///
/// Divergent by contract: implementations switch execution to the selected
/// image and never return.
pub trait BootControl {
    /// Disconnect the transport, then reset into the selected image
    fn reboot(self, image: BootImage) -> !;
}

/// Hardware boot control over the misc register block
pub struct MiscBoot<R: RegisterFile, T: Transport> {
    regs: R,
    transport: T,
}

impl<R: RegisterFile, T: Transport> MiscBoot<R, T> {
    /// Take ownership of the misc block and the transport handle
    pub fn new(regs: R, transport: T) -> Self {
        Self { regs, transport }
    }

    /// Detach the transport, then arm the boot word
    fn handoff(&mut self, image: BootImage) {
        // Host must see a clean detach before the device disappears
        self.transport.disconnect();
        self.regs.write32(BOOT, image.select_word());
    }
}

impl<R: RegisterFile, T: Transport> BootControl for MiscBoot<R, T> {
    fn reboot(mut self, image: BootImage) -> ! {
        log::info!("rebooting into {:?}", image);
        self.handoff(image);

        // The write resets the device; parking here keeps the divergence
        // honest if the reset takes a cycle to land.
        loop {
            core::hint::spin_loop();
        }
    }
}
