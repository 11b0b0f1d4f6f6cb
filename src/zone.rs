//! Update zones
//!
//! A zone is one independently updatable address range in the flash's
//! linear address space; the table index is the update-target index the
//! host-facing engine advertises. The table is built once at boot and
//! never mutated afterwards.

use heapless::Vec;

use crate::error::{Error, Result};

/// Maximum number of configured zones
pub const MAX_ZONES: usize = 8;

/// A half-open `[start, end)` range of flash addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zone {
    /// First byte offset covered by the zone
    pub start: u32,
    /// One past the last byte offset covered by the zone
    pub end: u32,
}

impl Zone {
    /// Create a zone covering `[start, end)`
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Returns true if `[addr, addr + len)` lies fully inside the zone
    pub fn contains(&self, addr: u32, len: u32) -> bool {
        let Some(end) = addr.checked_add(len) else {
            return false;
        };
        addr >= self.start && end <= self.end
    }
}

/// Ordered, fixed-size table of update zones
///
/// Zones may be adjacent but must not overlap; the table does not check
/// overlap, that is an integrator precondition.
#[derive(Debug, Clone)]
pub struct ZoneTable {
    zones: Vec<Zone, MAX_ZONES>,
}

impl ZoneTable {
    /// Build the table from an ordered zone list.
    ///
    /// Rejects zones with `start >= end` and lists longer than
    /// [`MAX_ZONES`].
    pub fn new(zones: &[Zone]) -> Result<Self> {
        let mut table = Vec::new();
        for &zone in zones {
            if zone.start >= zone.end {
                return Err(Error::InvalidZone);
            }
            table.push(zone).map_err(|_| Error::TooManyZones)?;
        }
        Ok(Self { zones: table })
    }

    /// Number of configured zones
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Returns true if no zones are configured
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// The configured zones, in table order
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Index of the zone fully containing `[addr, addr + len)`, if any
    ///
    /// Zero-length requests match no zone.
    pub fn find(&self, addr: u32, len: u32) -> Option<usize> {
        if len == 0 {
            return None;
        }
        self.zones.iter().position(|z| z.contains(addr, len))
    }

    /// Validate that `[addr, addr + len)` is contained in a single zone
    pub fn check(&self, addr: u32, len: u32) -> Result<usize> {
        self.find(addr, len).ok_or(Error::AddressOutOfZone)
    }
}
