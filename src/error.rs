//! Error types for dfuflash
//!
//! This module provides a no_std compatible error type that is used
//! throughout the crate.

use core::fmt;

/// Crate error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Bus errors
    /// Receive-ready wait exhausted its bounded poll budget
    BusStall,

    // Codec errors
    /// Status register index outside 1..=3
    InvalidStatusRegister,

    // Backend errors
    /// Requested range is not fully contained in a single configured zone
    AddressOutOfZone,
    /// Erase size does not match any supported granularity
    UnsupportedEraseSize,

    // Zone table construction errors
    /// Zone has `start >= end`
    InvalidZone,
    /// More zones than the table can hold
    TooManyZones,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusStall => write!(f, "SPI bus stalled waiting for receive-ready"),
            Self::InvalidStatusRegister => write!(f, "status register index must be 1, 2 or 3"),
            Self::AddressOutOfZone => write!(f, "address range not contained in a configured zone"),
            Self::UnsupportedEraseSize => write!(f, "unsupported erase size"),
            Self::InvalidZone => write!(f, "zone start must be below zone end"),
            Self::TooManyZones => write!(f, "too many zones for the table"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the crate Error type
pub type Result<T> = core::result::Result<T, Error>;
