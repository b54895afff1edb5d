//! Tegra SoC identification
//!
//! The `tegra_fuse` driver exposes the chip id and production mode fuse as
//! module parameters in sysfs. The chip id tells us where the module
//! EEPROM sits.

use std::fmt;

use log::debug;

use crate::error::{LinuxEepromError, Result};
use crate::location::{I2cAddress, LinuxConfig};

/// I2C address of the module EEPROM on every supported SoC
const MODULE_EEPROM_ADDR: u16 = 0x50;

/// Supported Tegra SoC families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocType {
    /// Tegra186 (Jetson TX2)
    Tegra186,
    /// Tegra194 (Jetson AGX Xavier, Xavier NX)
    Tegra194,
    /// Tegra210 (Jetson TX1, Nano)
    Tegra210,
}

impl SocType {
    /// Map a `tegra_chip_id` value
    pub fn from_chip_id(chip_id: u64) -> Option<Self> {
        match chip_id {
            0x18 => Some(Self::Tegra186),
            0x19 => Some(Self::Tegra194),
            0x21 => Some(Self::Tegra210),
            _ => None,
        }
    }

    /// Identify the running SoC
    pub fn detect(config: &LinuxConfig) -> Result<Self> {
        let chip_id = read_fuse_param(config, "tegra_chip_id")?;
        let soc = Self::from_chip_id(chip_id).ok_or(LinuxEepromError::UnknownSoc(chip_id))?;
        debug!("Detected {} (chip id {:#x})", soc, chip_id);
        Ok(soc)
    }

    /// Where the module EEPROM lives on this SoC
    pub fn module_eeprom(&self) -> I2cAddress {
        let bus = match self {
            Self::Tegra186 => 7,
            Self::Tegra194 => 0,
            Self::Tegra210 => 2,
        };
        I2cAddress {
            bus,
            addr: MODULE_EEPROM_ADDR,
        }
    }

    /// Chip revision reported in board specs
    ///
    /// Not read from the hardware: the kernel only exposes it as an enum
    /// whose values are not stable.
    pub fn chip_revision(&self) -> u32 {
        match self {
            Self::Tegra194 => 2,
            Self::Tegra186 | Self::Tegra210 => 0,
        }
    }
}

impl fmt::Display for SocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tegra186 => write!(f, "Tegra186"),
            Self::Tegra194 => write!(f, "Tegra194"),
            Self::Tegra210 => write!(f, "Tegra210"),
        }
    }
}

/// Read the production mode fuse
pub fn prod_mode(config: &LinuxConfig) -> Result<u64> {
    read_fuse_param(config, "tegra_prod_mode")
}

/// Read a decimal `tegra_fuse` module parameter
fn read_fuse_param(config: &LinuxConfig, name: &str) -> Result<u64> {
    let path = config.fuse_param(name);
    let path_str = path.display().to_string();
    let content = std::fs::read_to_string(&path).map_err(|e| LinuxEepromError::SysfsRead {
        path: path_str.clone(),
        source: e,
    })?;

    let value = content.trim_end_matches('\n');
    value.parse::<u64>().map_err(|_| LinuxEepromError::SysfsParse {
        path: path_str,
        value: value.to_string(),
    })
}
