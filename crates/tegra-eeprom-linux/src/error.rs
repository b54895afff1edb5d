//! Error types for Linux EEPROM access

use std::io;
use thiserror::Error;

/// Linux-specific errors
#[derive(Debug, Error)]
pub enum LinuxEepromError {
    /// Error from the EEPROM codec or handle
    #[error(transparent)]
    Eeprom(#[from] tegra_eeprom_core::Error),

    /// Failed to open the device node or file
    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Failed to bind the I2C address on an i2c-dev node
    #[error("Failed to bind I2C address {addr:#04x} on {path}: {source}")]
    I2cBindFailed {
        path: String,
        addr: u16,
        #[source]
        source: nix::errno::Errno,
    },

    /// Failed to read sysfs attribute
    #[error("Failed to read sysfs attribute '{path}': {source}")]
    SysfsRead {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Failed to parse sysfs attribute
    #[error("Failed to parse sysfs attribute '{path}': {value}")]
    SysfsParse { path: String, value: String },

    /// The SoC is not one we know the module EEPROM location for
    #[error("Unrecognized Tegra SoC (chip id {0:#x})")]
    UnknownSoc(u64),

    /// Board spec requested for a customer part number
    #[error("Part number is not a vendor part number")]
    NotVendorPartNumber,
}

/// Result type for Linux EEPROM operations
pub type Result<T> = std::result::Result<T, LinuxEepromError>;
