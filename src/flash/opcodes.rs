//! Standard JEDEC SPI NOR flash opcodes
//!
//! Single-byte command set used by the codec. Address-bearing commands
//! take a 3-byte big-endian address.

// ============================================================================
// Write control
// ============================================================================

/// Write Enable - required before any program/erase operation
pub const WREN: u8 = 0x06;
/// Write Disable - clears the write-enable latch
pub const WRDI: u8 = 0x04;
/// Write Enable for Volatile Status Register
pub const WREN_VOLATILE: u8 = 0x50;

// ============================================================================
// Status register operations
// ============================================================================

/// Read Status Register 1
pub const RDSR: u8 = 0x05;
/// Read Status Register 2
pub const RDSR2: u8 = 0x35;
/// Read Status Register 3
pub const RDSR3: u8 = 0x15;
/// Write Status Register 1
pub const WRSR: u8 = 0x01;
/// Write Status Register 2
pub const WRSR2: u8 = 0x31;
/// Write Status Register 3
pub const WRSR3: u8 = 0x11;

// ============================================================================
// Identification
// ============================================================================

/// Read JEDEC ID (manufacturer + device ID)
pub const RDID: u8 = 0x9F;
/// Read Unique ID (4 dummy bytes, then 8 ID bytes)
pub const RDUID: u8 = 0x4B;

// ============================================================================
// Data access
// ============================================================================

/// Read Data
pub const READ: u8 = 0x03;
/// Page Program
pub const PP: u8 = 0x02;

// ============================================================================
// Erase
// ============================================================================

/// Sector Erase (4 KiB)
pub const SE: u8 = 0x20;
/// Block Erase (32 KiB)
pub const BE_32K: u8 = 0x52;
/// Block Erase (64 KiB)
pub const BE_64K: u8 = 0xD8;

// ============================================================================
// Power management
// ============================================================================

/// Deep Power Down
pub const DP: u8 = 0xB9;
/// Release from Deep Power Down
pub const RDP: u8 = 0xAB;

// ============================================================================
// Status register bit definitions
// ============================================================================

/// Status Register 1: Write In Progress / Busy
pub const SR1_BUSY: u8 = 0x01;
/// Status Register 1: Write Enable Latch
pub const SR1_WEL: u8 = 0x02;
/// Status Register 1: block/sector protection bits (BP0-BP2, TB, SEC)
pub const SR1_PROTECT_MASK: u8 = 0x7C;
