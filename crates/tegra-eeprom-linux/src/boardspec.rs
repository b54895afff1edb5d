//! Board spec strings
//!
//! Vendor part numbers have the shape `699-8bbbb-ssss-fff RRR` (board id,
//! SKU, fab, board revision). Flashing and update tooling identifies a
//! module by a board spec built from those pieces plus the production mode
//! fuse and chip revision.

use std::fmt;

use log::debug;
use tegra_eeprom_core::{DeviceClass, LogicalRecord, PartNumberKind};

use crate::error::{LinuxEepromError, Result};
use crate::location::{EepromLocation, LinuxConfig};
use crate::soc::{self, SocType};

/// Identification of a module for update tooling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSpec {
    /// Board id (4 characters)
    pub board_id: String,
    /// Fab (3 characters)
    pub fab: String,
    /// Board SKU (4 characters)
    pub sku: String,
    /// Board revision, empty if the part number has none
    pub board_rev: String,
    /// Production mode fuse
    pub prod_mode: u64,
    /// Chip revision
    pub chip_rev: u32,
}

/// Up to `width` bytes of `pn` starting at `start`, stopping at a NUL
fn slice(pn: &[u8], start: usize, width: usize) -> String {
    let bytes = pn.get(start..).unwrap_or_default();
    let bytes = &bytes[..bytes.len().min(width)];
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

impl BoardSpec {
    /// Build the board spec from a decoded module record
    ///
    /// Fails if the part number was written by a customer, since it then
    /// does not follow the vendor format.
    pub fn from_record(record: &LogicalRecord, soc: SocType, prod_mode: u64) -> Result<Self> {
        if record.partnumber_kind() != PartNumberKind::Vendor {
            return Err(LinuxEepromError::NotVendorPartNumber);
        }
        let pn = record.partnumber().as_bytes();

        // Some parts have a short or missing revision; require the
        // separating blank and a printable first character
        let board_rev = match pn.get(18..20) {
            Some(&[b' ', c]) if c == b' ' || c.is_ascii_graphic() => slice(pn, 19, 3),
            _ => String::new(),
        };

        Ok(Self {
            board_id: slice(pn, 5, 4),
            fab: slice(pn, 15, 3),
            sku: slice(pn, 10, 4),
            board_rev,
            prod_mode,
            chip_rev: soc.chip_revision(),
        })
    }
}

impl fmt::Display for BoardSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<4}-{:<3}-{:<4}-{}-{}-{}",
            self.board_id, self.fab, self.sku, self.board_rev, self.prod_mode, self.chip_rev
        )
    }
}

/// Read the module EEPROM of the running system
pub fn read_module_record(config: &LinuxConfig) -> Result<(SocType, LogicalRecord)> {
    let soc = SocType::detect(config)?;
    let location = EepromLocation::I2c(soc.module_eeprom());
    debug!("Reading module EEPROM at {}", location);
    let handle = location.open_handle(DeviceClass::Module, config)?;
    let record = handle.read()?;
    Ok((soc, record))
}

/// Board spec of the running system
///
/// Unlike the `tegra-boardspec` tool this fails if the production mode
/// fuse cannot be read.
pub fn system_boardspec(config: &LinuxConfig) -> Result<BoardSpec> {
    let prod_mode = soc::prod_mode(config)?;
    let (soc, record) = read_module_record(config)?;
    BoardSpec::from_record(&record, soc, prod_mode)
}
