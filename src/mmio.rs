//! Memory-mapped register access
//!
//! Each peripheral block is driven through a [`RegisterFile`] handle that is
//! constructed once at boot and handed to exactly one driver component. The
//! trait is the seam that lets the drivers run against a fake register file
//! in tests.

/// 32-bit register window over one peripheral block
///
/// Offsets are in bytes from the block base and must be 4-byte aligned.
pub trait RegisterFile {
    /// Read a 32-bit register at the given byte offset
    fn read32(&self, offset: usize) -> u32;

    /// Write a 32-bit register at the given byte offset
    fn write32(&mut self, offset: usize, value: u32);
}

/// A mapped peripheral register block
///
/// # Safety
///
/// The caller of [`Mmio::new`] must ensure the address range is a valid
/// MMIO region and that no other handle covers the same block. The accessors
/// use volatile operations so the compiler never elides or reorders them.
pub struct Mmio {
    base: *mut u32,
    size: usize,
}

impl Mmio {
    /// Create a register window of `size` bytes at a physical base address.
    ///
    /// # Safety
    ///
    /// `base` must point to a device register block of at least `size`
    /// bytes, 4-byte aligned, and the caller must guarantee exclusive
    /// ownership of that block.
    pub unsafe fn new(base: usize, size: usize) -> Self {
        debug_assert!(base & 3 == 0, "unaligned register base");
        Self {
            base: base as *mut u32,
            size,
        }
    }
}

impl RegisterFile for Mmio {
    #[inline]
    fn read32(&self, offset: usize) -> u32 {
        debug_assert!(offset + 4 <= self.size);
        debug_assert!(offset & 3 == 0, "unaligned 32-bit read");
        unsafe { core::ptr::read_volatile(self.base.add(offset / 4)) }
    }

    #[inline]
    fn write32(&mut self, offset: usize, value: u32) {
        debug_assert!(offset + 4 <= self.size);
        debug_assert!(offset & 3 == 0, "unaligned 32-bit write");
        unsafe { core::ptr::write_volatile(self.base.add(offset / 4), value) }
    }
}

// MMIO registers do not have the usual aliasing concerns
unsafe impl Send for Mmio {}
