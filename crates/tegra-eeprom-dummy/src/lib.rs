//! tegra-eeprom-dummy - In-memory EEPROM emulator for testing
//!
//! This crate provides a dummy EEPROM that lives in memory and implements the
//! `embedded_io` transport traits. It can hand out data in small chunks to
//! exercise short-read/short-write handling, and can be told to fail after a
//! given number of bytes to exercise error paths.

use embedded_io::{ErrorKind, ErrorType, Read, Seek, SeekFrom, Write};
use log::trace;

/// Size of an identification EEPROM
pub const DEFAULT_SIZE: usize = 256;

/// Configuration for the dummy EEPROM
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Device size in bytes
    pub size: usize,
    /// Maximum bytes transferred per read call
    pub max_read_chunk: usize,
    /// Maximum bytes accepted per write call
    pub max_write_chunk: usize,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            max_read_chunk: usize::MAX,
            max_write_chunk: usize::MAX,
        }
    }
}

/// Error reported by the dummy EEPROM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DummyError(pub ErrorKind);

impl embedded_io::Error for DummyError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Dummy EEPROM
///
/// Emulates an EEPROM device node in memory. Freshly created devices read as
/// erased (all 0xFF).
#[derive(Debug, Clone)]
pub struct DummyEeprom {
    config: DummyConfig,
    data: Vec<u8>,
    pos: usize,
    fail_reads_after: Option<usize>,
    fail_writes_after: Option<usize>,
    bytes_read: usize,
    bytes_written: usize,
    write_calls: usize,
}

impl DummyEeprom {
    /// Create a new erased EEPROM with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let data = vec![0xFF; config.size];
        Self {
            config,
            data,
            pos: 0,
            fail_reads_after: None,
            fail_writes_after: None,
            bytes_read: 0,
            bytes_written: 0,
            write_calls: 0,
        }
    }

    /// Create a new erased 256-byte EEPROM
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a dummy EEPROM with pre-filled data
    pub fn with_data(config: DummyConfig, initial_data: &[u8]) -> Self {
        let mut eeprom = Self::new(config);
        let len = core::cmp::min(initial_data.len(), eeprom.data.len());
        eeprom.data[..len].copy_from_slice(&initial_data[..len]);
        eeprom
    }

    /// Fail every read once `n` bytes have been read in total
    pub fn fail_reads_after(mut self, n: usize) -> Self {
        self.fail_reads_after = Some(n);
        self
    }

    /// Fail every write once `n` bytes have been written in total
    pub fn fail_writes_after(mut self, n: usize) -> Self {
        self.fail_writes_after = Some(n);
        self
    }

    /// Get a reference to the EEPROM data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the EEPROM data
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Current position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of write calls that transferred data
    pub fn write_calls(&self) -> usize {
        self.write_calls
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }
}

impl ErrorType for DummyEeprom {
    type Error = DummyError;
}

impl Read for DummyEeprom {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if matches!(self.fail_reads_after, Some(n) if self.bytes_read >= n) {
            return Err(DummyError(ErrorKind::Other));
        }
        if self.pos >= self.data.len() {
            trace!("dummy read at {}, past the end", self.pos);
            return Ok(0);
        }
        let mut len = buf
            .len()
            .min(self.config.max_read_chunk)
            .min(self.data.len().saturating_sub(self.pos));
        if let Some(n) = self.fail_reads_after {
            len = len.min(n - self.bytes_read);
        }
        buf[..len].copy_from_slice(&self.data[self.pos..self.pos + len]);
        self.pos += len;
        self.bytes_read += len;
        trace!("dummy read {} bytes, now at {}", len, self.pos);
        Ok(len)
    }
}

impl Write for DummyEeprom {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if matches!(self.fail_writes_after, Some(n) if self.bytes_written >= n) {
            return Err(DummyError(ErrorKind::Other));
        }
        if self.pos >= self.data.len() {
            trace!("dummy write at {}, past the end", self.pos);
            return Ok(0);
        }
        let mut len = buf
            .len()
            .min(self.config.max_write_chunk)
            .min(self.data.len().saturating_sub(self.pos));
        if let Some(n) = self.fail_writes_after {
            len = len.min(n - self.bytes_written);
        }
        self.data[self.pos..self.pos + len].copy_from_slice(&buf[..len]);
        self.pos += len;
        self.bytes_written += len;
        if len > 0 {
            self.write_calls += 1;
        }
        trace!("dummy wrote {} bytes, now at {}", len, self.pos);
        Ok(len)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Seek for DummyEeprom {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, Self::Error> {
        let target = match pos {
            SeekFrom::Start(off) => i64::try_from(off).ok(),
            SeekFrom::End(off) => (self.data.len() as i64).checked_add(off),
            SeekFrom::Current(off) => (self.pos as i64).checked_add(off),
        };
        match target {
            Some(t) if t >= 0 => {
                self.pos = t as usize;
                Ok(t as u64)
            }
            _ => Err(DummyError(ErrorKind::InvalidInput)),
        }
    }
}
