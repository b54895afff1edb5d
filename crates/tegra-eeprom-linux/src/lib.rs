//! tegra-eeprom-linux - Linux access to Tegra identification EEPROMs
//!
//! This crate opens identification EEPROMs on a running Jetson system and
//! hands them to the core codec as `embedded_io` transports.
//!
//! # Overview
//!
//! EEPROMs are reached in one of two ways:
//!
//! - Through the kernel `at24` driver, which exposes each EEPROM as
//!   `/sys/bus/i2c/devices/<bus>-<addr>/eeprom`. This is preferred and
//!   allows writing.
//! - Through raw `/dev/i2c-N` access with the address bound by
//!   `I2C_SLAVE_FORCE`, for modules whose EEPROM has no driver bound. This
//!   is read-only.
//!
//! Plain files holding an EEPROM image are handled like driver nodes.
//!
//! # Example
//!
//! ```ignore
//! use tegra_eeprom_core::DeviceClass;
//! use tegra_eeprom_linux::{EepromLocation, LinuxConfig};
//!
//! let config = LinuxConfig::default();
//! let location = EepromLocation::parse("1-0050");
//! let handle = location.open_handle(DeviceClass::Board, &config)?;
//! println!("{}", handle.read()?.partnumber());
//! ```
//!
//! # Module EEPROM location
//!
//! The module EEPROM address depends on the SoC, which is identified from
//! `/sys/module/tegra_fuse/parameters/tegra_chip_id`:
//!
//! | SoC      | Bus | Address |
//! |----------|-----|---------|
//! | Tegra186 | 7   | 0x50    |
//! | Tegra194 | 0   | 0x50    |
//! | Tegra210 | 2   | 0x50    |

pub mod boardspec;
pub mod device;
pub mod error;
pub mod location;
pub mod soc;

// Re-exports
pub use boardspec::{read_module_record, system_boardspec, BoardSpec};
pub use device::{EepromFile, FileError};
pub use error::{LinuxEepromError, Result};
pub use location::{EepromLocation, I2cAddress, LinuxConfig};
pub use soc::{prod_mode, SocType};

/// Location of the module EEPROM on the running system
pub fn module_location(config: &LinuxConfig) -> Result<EepromLocation> {
    let soc = SocType::detect(config)?;
    Ok(EepromLocation::I2c(soc.module_eeprom()))
}
