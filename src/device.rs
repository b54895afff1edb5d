//! Device spec resolution
//!
//! Turns the `-d` argument into an open handle. The transports differ in
//! type, so the result is an enum the caller matches on to run commands
//! generically.

use log::{debug, info};
use tegra_eeprom_core::{DeviceClass, EepromHandle};
use tegra_eeprom_dummy::DummyEeprom;
use tegra_eeprom_linux::{module_location, EepromFile, EepromLocation, LinuxConfig};

/// Device spec selecting the in-memory emulator
pub const DUMMY_DEVICE: &str = "dummy";

/// An open EEPROM of any supported kind
pub enum OpenDevice {
    /// File, sysfs node or i2c-dev
    Linux(EepromHandle<EepromFile>),
    /// In-memory emulator
    Dummy(EepromHandle<DummyEeprom>),
}

/// Open the EEPROM named by `spec`
///
/// Without a spec the module EEPROM of the running system is used and the
/// device is always treated as a module.
pub fn open_device(
    spec: Option<&str>,
    cvm: bool,
    config: &LinuxConfig,
) -> Result<OpenDevice, Box<dyn std::error::Error>> {
    let class = if cvm {
        DeviceClass::Module
    } else {
        DeviceClass::Board
    };

    let location = match spec {
        None => {
            let location = module_location(config).map_err(|e| {
                format!(
                    "no EEPROM device specified and cannot identify module EEPROM location: {}",
                    e
                )
            })?;
            info!("Using module EEPROM at {}", location);
            return Ok(OpenDevice::Linux(
                location.open_handle(DeviceClass::Module, config)?,
            ));
        }
        Some(DUMMY_DEVICE) => {
            debug!("Using in-memory dummy EEPROM");
            let handle = EepromHandle::open(DummyEeprom::new_default(), class, false)?;
            return Ok(OpenDevice::Dummy(handle));
        }
        Some(spec) => EepromLocation::parse(spec),
    };

    debug!("Opening {} EEPROM at {}", class, location);
    Ok(OpenDevice::Linux(location.open_handle(class, config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_device() {
        let config = LinuxConfig::default();
        match open_device(Some("dummy"), true, &config).unwrap() {
            OpenDevice::Dummy(handle) => {
                assert_eq!(handle.class(), DeviceClass::Module);
                assert!(!handle.is_readonly());
            }
            OpenDevice::Linux(_) => panic!("expected dummy device"),
        }
    }

    #[test]
    fn test_file_device_uses_board_class() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eeprom.bin");
        std::fs::write(&path, [0u8; 256]).unwrap();
        let config = LinuxConfig::default();
        match open_device(path.to_str(), false, &config).unwrap() {
            OpenDevice::Linux(handle) => assert_eq!(handle.class(), DeviceClass::Board),
            OpenDevice::Dummy(_) => panic!("expected file device"),
        }
    }

    #[test]
    fn test_no_device_without_soc() {
        let dir = tempfile::tempdir().unwrap();
        let config = LinuxConfig {
            sysfs_root: dir.path().to_path_buf(),
            dev_root: dir.path().to_path_buf(),
        };
        let err = open_device(None, false, &config).err().unwrap();
        assert!(err.to_string().starts_with("no EEPROM device specified"));
    }
}
