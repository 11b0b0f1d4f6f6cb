//! dfuflash - SPI NOR flash driver and firmware-update backend
//!
//! This crate is the storage core of a field-updatable embedded
//! bootloader: a bus transaction engine for the memory-mapped SPI
//! controller, a NOR flash command codec on top of it, a zone table that
//! scopes what the external update-protocol engine may touch, and the
//! boot handoff that switches execution to a stored image. It is
//! `no_std` and allocation-free; the host-facing protocol engine,
//! transport and console are external collaborators behind the seam
//! traits.
//!
//! # Example
//!
//! ```ignore
//! use dfuflash::backend::UpdateBackend;
//! use dfuflash::boot::MiscBoot;
//! use dfuflash::flash::Flash;
//! use dfuflash::mmio::Mmio;
//! use dfuflash::spi::{BusConfig, SpiEngine, WaitPolicy};
//! use dfuflash::zone::{Zone, ZoneTable};
//!
//! let spi_regs = unsafe { Mmio::new(SPI_BASE, 0x40) };
//! let engine = SpiEngine::new(spi_regs, BusConfig::default(), WaitPolicy::unbounded());
//!
//! let zones = ZoneTable::new(&[
//!     Zone::new(0x0008_0000, 0x000A_0000), // application bitstream
//!     Zone::new(0x000A_0000, 0x000C_0000), // application firmware
//! ])?;
//!
//! let misc_regs = unsafe { Mmio::new(MISC_BASE, 0x08) };
//! let boot = MiscBoot::new(misc_regs, transport);
//! let mut backend = UpdateBackend::new(Flash::new(engine), zones, boot);
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod backend;
pub mod boot;
pub mod error;
pub mod flash;
pub mod mmio;
pub mod spi;
pub mod zone;

pub use error::{Error, Result};
