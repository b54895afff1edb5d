//! EEPROM device nodes
//!
//! [`EepromFile`] adapts a `std::fs::File` to the `embedded_io` traits the
//! core handle consumes. It backs both the kernel driver's sysfs `eeprom`
//! node (or a plain image file) and raw `/dev/i2c-N` access.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use embedded_io::{ErrorKind, ErrorType, SeekFrom};
use log::{debug, info};

use crate::error::{LinuxEepromError, Result};

/// i2c-dev ioctl constants
mod ioctl {
    /// Use this slave address, even if it is already in use by a driver
    const I2C_SLAVE_FORCE: u32 = 0x0706;

    nix::ioctl_write_int_bad!(i2c_slave_force, I2C_SLAVE_FORCE);
}

/// I/O error from a device node, carrying the OS error
#[derive(Debug)]
pub struct FileError(pub io::Error);

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for FileError {}

impl embedded_io::Error for FileError {
    fn kind(&self) -> ErrorKind {
        match self.0.kind() {
            io::ErrorKind::NotFound => ErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            io::ErrorKind::InvalidInput => ErrorKind::InvalidInput,
            io::ErrorKind::InvalidData => ErrorKind::InvalidData,
            io::ErrorKind::TimedOut => ErrorKind::TimedOut,
            io::ErrorKind::Interrupted => ErrorKind::Interrupted,
            io::ErrorKind::Unsupported => ErrorKind::Unsupported,
            io::ErrorKind::OutOfMemory => ErrorKind::OutOfMemory,
            _ => ErrorKind::Other,
        }
    }
}

/// An open EEPROM device node or image file
#[derive(Debug)]
pub struct EepromFile {
    file: File,
    path: PathBuf,
}

impl EepromFile {
    /// Open a file or a driver-backed `eeprom` node for reading and writing
    pub fn open(path: &Path) -> Result<Self> {
        debug!("Opening {}", path.display());
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| LinuxEepromError::OpenFailed {
                path: path.display().to_string(),
                source: e,
            })?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Open an i2c-dev node and bind it to the EEPROM at `addr`
    ///
    /// The address is bound with `I2C_SLAVE_FORCE` so it works even while a
    /// kernel driver claims the device. Reads go through the chip's internal
    /// address counter, so handles opened this way should be read-only.
    pub fn open_i2c(dev_path: &Path, addr: u16) -> Result<Self> {
        let eeprom = Self::open(dev_path)?;
        let fd = eeprom.file.as_raw_fd();

        unsafe {
            ioctl::i2c_slave_force(fd, addr as nix::libc::c_int).map_err(|e| {
                LinuxEepromError::I2cBindFailed {
                    path: dev_path.display().to_string(),
                    addr,
                    source: e,
                }
            })?;
        }

        info!("Bound I2C address {:#04x} on {}", addr, dev_path.display());
        Ok(eeprom)
    }

    /// Path the device was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ErrorType for EepromFile {
    type Error = FileError;
}

impl embedded_io::Read for EepromFile {
    fn read(&mut self, buf: &mut [u8]) -> std::result::Result<usize, FileError> {
        io::Read::read(&mut self.file, buf).map_err(|e| {
            debug!("{}: read failed: {}", self.path.display(), e);
            FileError(e)
        })
    }
}

impl embedded_io::Write for EepromFile {
    fn write(&mut self, buf: &[u8]) -> std::result::Result<usize, FileError> {
        io::Write::write(&mut self.file, buf).map_err(|e| {
            debug!("{}: write failed: {}", self.path.display(), e);
            FileError(e)
        })
    }

    fn flush(&mut self) -> std::result::Result<(), FileError> {
        io::Write::flush(&mut self.file).map_err(FileError)
    }
}

impl embedded_io::Seek for EepromFile {
    fn seek(&mut self, pos: SeekFrom) -> std::result::Result<u64, FileError> {
        let pos = match pos {
            SeekFrom::Start(off) => io::SeekFrom::Start(off),
            SeekFrom::End(off) => io::SeekFrom::End(off),
            SeekFrom::Current(off) => io::SeekFrom::Current(off),
        };
        io::Seek::seek(&mut self.file, pos).map_err(FileError)
    }
}
