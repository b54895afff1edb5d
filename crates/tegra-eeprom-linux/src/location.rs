//! Device location resolution
//!
//! An EEPROM is named either by a file path or by an I2C bus/address pair
//! written as `<bus>-<hexaddr>`, the way the kernel names I2C devices. An
//! I2C address is served by the kernel EEPROM driver's sysfs node when one
//! is bound, and by raw i2c-dev access otherwise.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info};
use tegra_eeprom_core::{DeviceClass, EepromHandle};

use crate::device::EepromFile;
use crate::error::Result;

/// Filesystem roots used to find devices
///
/// The defaults point at the real system; tests point them at a temporary
/// directory.
#[derive(Debug, Clone)]
pub struct LinuxConfig {
    /// Where sysfs is mounted
    pub sysfs_root: PathBuf,
    /// Where device nodes live
    pub dev_root: PathBuf,
}

impl Default for LinuxConfig {
    fn default() -> Self {
        Self {
            sysfs_root: PathBuf::from("/sys"),
            dev_root: PathBuf::from("/dev"),
        }
    }
}

impl LinuxConfig {
    /// Directory of the `tegra_fuse` module parameters
    pub fn fuse_params_dir(&self) -> PathBuf {
        self.sysfs_root.join("module/tegra_fuse/parameters")
    }

    /// Path of one `tegra_fuse` module parameter
    pub fn fuse_param(&self, name: &str) -> PathBuf {
        self.fuse_params_dir().join(name)
    }

    /// Driver-provided EEPROM node for an I2C device
    pub fn i2c_sysfs_eeprom(&self, addr: I2cAddress) -> PathBuf {
        self.sysfs_root
            .join("bus/i2c/devices")
            .join(addr.to_string())
            .join("eeprom")
    }

    /// i2c-dev node for a bus
    pub fn i2c_dev(&self, bus: u32) -> PathBuf {
        self.dev_root.join(format!("i2c-{}", bus))
    }
}

/// An I2C bus number and 7-bit device address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cAddress {
    /// Bus number
    pub bus: u32,
    /// Device address
    pub addr: u16,
}

impl I2cAddress {
    /// Parse `<bus>-<hexaddr>`: a decimal bus number, a dash and one to
    /// four hex digits, nothing else
    pub fn parse(spec: &str) -> Option<Self> {
        let (bus, addr) = spec.split_once('-')?;
        if bus.is_empty()
            || !bus.bytes().all(|b| b.is_ascii_digit())
            || addr.is_empty()
            || addr.len() > 4
            || !addr.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return None;
        }
        Some(Self {
            bus: bus.parse().ok()?,
            addr: u16::from_str_radix(addr, 16).ok()?,
        })
    }
}

impl fmt::Display for I2cAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:04x}", self.bus, self.addr)
    }
}

/// Where an EEPROM lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EepromLocation {
    /// A file or an `eeprom` node
    Path(PathBuf),
    /// A device on an I2C bus
    I2c(I2cAddress),
}

impl EepromLocation {
    /// Interpret a device spec: an I2C address if it looks like one,
    /// otherwise a path
    pub fn parse(spec: &str) -> Self {
        match I2cAddress::parse(spec) {
            Some(addr) => Self::I2c(addr),
            None => Self::Path(PathBuf::from(spec)),
        }
    }

    /// Open the device
    ///
    /// Returns the transport and whether it must be treated as read-only.
    pub fn open(&self, config: &LinuxConfig) -> Result<(EepromFile, bool)> {
        match self {
            Self::Path(path) => Ok((EepromFile::open(path)?, false)),
            Self::I2c(addr) => {
                let node = config.i2c_sysfs_eeprom(*addr);
                if node.exists() {
                    debug!("Using EEPROM driver node {}", node.display());
                    return Ok((EepromFile::open(&node)?, false));
                }
                info!("No EEPROM driver bound for {}, using i2c-dev (read-only)", addr);
                let eeprom = EepromFile::open_i2c(&config.i2c_dev(addr.bus), addr.addr)?;
                Ok((eeprom, true))
            }
        }
    }

    /// Open the device and read it into a handle
    pub fn open_handle(
        &self,
        class: DeviceClass,
        config: &LinuxConfig,
    ) -> Result<EepromHandle<EepromFile>> {
        let (eeprom, readonly) = self.open(config)?;
        Ok(EepromHandle::open(eeprom, class, readonly)?)
    }
}

impl From<&Path> for EepromLocation {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl fmt::Display for EepromLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::I2c(addr) => write!(f, "{}", addr),
        }
    }
}
