//! Device handle
//!
//! An [`EepromHandle`] owns the transport for its lifetime and keeps a copy
//! of the 256-byte record read at open time. Reads decode that cache; writes
//! build a full new record from it and overwrite the whole device.

use embedded_io::{Error as _, Read, Seek, SeekFrom, Write};
use log::{debug, trace};

use crate::codec::{decode, encode_and_prepare};
use crate::error::{Error, Result, TransportFailure, TransportOp};
use crate::layout::{RawRecord, RECORD_SIZE};
use crate::record::{DeviceClass, LogicalRecord};
use crate::validate::validate;

/// Fill `buf` from the transport, looping over short reads
fn read_full<T: Read>(transport: &mut T, buf: &mut [u8]) -> Result<()> {
    let mut offset = 0;
    while offset < buf.len() {
        match transport.read(&mut buf[offset..]) {
            Ok(0) => return Err(TransportFailure::UnexpectedEof { offset }.into()),
            Ok(n) => {
                trace!("read {} bytes at offset {}", n, offset);
                offset += n;
            }
            Err(e) => {
                return Err(TransportFailure::Io {
                    op: TransportOp::Read,
                    kind: e.kind(),
                    offset,
                }
                .into())
            }
        }
    }
    Ok(())
}

/// Write all of `buf` to the transport, looping over short writes
fn write_full<T: Write>(transport: &mut T, buf: &[u8]) -> Result<()> {
    let mut offset = 0;
    while offset < buf.len() {
        match transport.write(&buf[offset..]) {
            Ok(0) => return Err(TransportFailure::WriteZero { offset }.into()),
            Ok(n) => {
                trace!("wrote {} bytes at offset {}", n, offset);
                offset += n;
            }
            Err(e) => {
                return Err(TransportFailure::Io {
                    op: TransportOp::Write,
                    kind: e.kind(),
                    offset,
                }
                .into())
            }
        }
    }
    Ok(())
}

/// An open identification EEPROM
///
/// Only one handle should address a given device at a time; nothing here
/// detects a second opener.
#[derive(Debug)]
pub struct EepromHandle<T> {
    transport: T,
    class: DeviceClass,
    readonly: bool,
    cache: RawRecord,
}

impl<T: Read + Write + Seek> EepromHandle<T> {
    /// Take ownership of `transport` and read the record from it
    ///
    /// Reading starts at the transport's current position. The contents are
    /// not validated here; a blank or foreign device opens fine and only
    /// fails on [`read`](Self::read).
    pub fn open(mut transport: T, class: DeviceClass, readonly: bool) -> Result<Self> {
        let mut cache = RawRecord::zeroed();
        read_full(&mut transport, cache.as_bytes_mut())?;
        debug!(
            "Opened {} EEPROM{}",
            class,
            if readonly { " (read-only)" } else { "" }
        );
        Ok(Self {
            transport,
            class,
            readonly,
            cache,
        })
    }

    /// Decode the cached record
    pub fn read(&self) -> Result<LogicalRecord> {
        decode(&self.cache, self.class).inspect_err(|e| debug!("Decode failed: {}", e))
    }

    /// Write `record` to the device
    ///
    /// The whole record is rewritten from offset 0. The cache is updated
    /// only once the device has accepted every byte; after a transport
    /// error the device contents are unspecified.
    pub fn write(&mut self, record: &LogicalRecord) -> Result<()> {
        if self.readonly {
            return Err(Error::ReadOnly);
        }
        let raw = encode_and_prepare(record, &self.cache, self.class)?;

        self.transport
            .seek(SeekFrom::Start(0))
            .map_err(|e| TransportFailure::Io {
                op: TransportOp::Seek,
                kind: e.kind(),
                offset: 0,
            })?;
        write_full(&mut self.transport, raw.as_bytes())?;
        self.transport.flush().map_err(|e| TransportFailure::Io {
            op: TransportOp::Flush,
            kind: e.kind(),
            offset: RECORD_SIZE,
        })?;

        debug!("Wrote {} bytes, crc8 0x{:02X}", RECORD_SIZE, raw.crc8());
        self.cache = raw;
        Ok(())
    }

    /// Check the cached record without decoding it
    pub fn verify(&self) -> Result<()> {
        validate(&self.cache, self.class).map_err(Error::from)
    }
}

impl<T> EepromHandle<T> {
    /// Release the transport
    pub fn close(self) -> T {
        debug!("Closing {} EEPROM", self.class);
        self.transport
    }

    /// Device class the handle was opened with
    pub fn class(&self) -> DeviceClass {
        self.class
    }

    /// Whether writes are rejected
    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    /// Cached raw record
    pub fn raw(&self) -> &RawRecord {
        &self.cache
    }

    /// Borrow the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationFailure;
    use crate::layout::fields;
    use crate::record::{MacAddress, MacSlot, PartNumberKind};
    use embedded_io::ErrorKind;
    use tegra_eeprom_dummy::{DummyConfig, DummyEeprom};

    fn chunked(read: usize, write: usize) -> DummyConfig {
        DummyConfig {
            max_read_chunk: read,
            max_write_chunk: write,
            ..Default::default()
        }
    }

    fn sample_record() -> LogicalRecord {
        let mut record = LogicalRecord::new();
        record
            .set_partnumber(PartNumberKind::Vendor, "699-13668-0001-301 B.0")
            .unwrap();
        record.set_asset_id("1422519000123").unwrap();
        record.set_mac(
            MacSlot::FactoryEthernet,
            MacAddress([0x00, 0x04, 0x4B, 0xA5, 0x10, 0x01]),
        );
        record
    }

    #[test]
    fn test_open_reads_through_short_reads() {
        let data: [u8; 256] = core::array::from_fn(|i| i as u8);
        let eeprom = DummyEeprom::with_data(chunked(7, usize::MAX), &data);
        let handle = EepromHandle::open(eeprom, DeviceClass::Module, true).unwrap();
        assert_eq!(handle.raw().as_bytes(), &data);
    }

    #[test]
    fn test_open_short_device() {
        let eeprom = DummyEeprom::new(DummyConfig {
            size: 100,
            ..Default::default()
        });
        let err = EepromHandle::open(eeprom, DeviceClass::Module, false).unwrap_err();
        assert_eq!(
            err,
            Error::Transport(TransportFailure::UnexpectedEof { offset: 100 })
        );
    }

    #[test]
    fn test_open_read_error() {
        let eeprom = DummyEeprom::new(chunked(16, usize::MAX)).fail_reads_after(32);
        let err = EepromHandle::open(eeprom, DeviceClass::Board, false).unwrap_err();
        assert_eq!(
            err,
            Error::Transport(TransportFailure::Io {
                op: TransportOp::Read,
                kind: ErrorKind::Other,
                offset: 32
            })
        );
    }

    #[test]
    fn test_blank_device_opens_but_does_not_decode() {
        let handle =
            EepromHandle::open(DummyEeprom::new_default(), DeviceClass::Module, false).unwrap();
        assert!(matches!(
            handle.read(),
            Err(Error::Validation(ValidationFailure::ChecksumMismatch { .. }))
        ));
    }

    #[test]
    fn test_write_then_reopen() {
        let eeprom = DummyEeprom::new(chunked(5, 3));
        let mut handle = EepromHandle::open(eeprom, DeviceClass::Module, false).unwrap();
        handle.write(&sample_record()).unwrap();
        assert_eq!(handle.read().unwrap(), sample_record());

        let eeprom = handle.close();
        assert_eq!(eeprom.write_calls(), 86);
        let reopened = DummyEeprom::with_data(DummyConfig::default(), eeprom.data());
        let handle = EepromHandle::open(reopened, DeviceClass::Module, true).unwrap();
        assert_eq!(handle.read().unwrap(), sample_record());
        handle.verify().unwrap();
    }

    #[test]
    fn test_readonly_write_changes_nothing() {
        let eeprom = DummyEeprom::new_default();
        let mut handle = EepromHandle::open(eeprom, DeviceClass::Module, true).unwrap();
        let before = handle.raw().clone();

        assert_eq!(handle.write(&sample_record()), Err(Error::ReadOnly));
        assert_eq!(handle.raw(), &before);
        let eeprom = handle.close();
        assert_eq!(eeprom.write_calls(), 0);
        assert!(eeprom.data().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_failed_write_keeps_cache() {
        let eeprom = DummyEeprom::new_default().fail_writes_after(64);
        let mut handle = EepromHandle::open(eeprom, DeviceClass::Board, false).unwrap();
        let before = handle.raw().clone();

        let err = handle.write(&sample_record()).unwrap_err();
        assert_eq!(
            err,
            Error::Transport(TransportFailure::Io {
                op: TransportOp::Write,
                kind: ErrorKind::Other,
                offset: 64
            })
        );
        assert_eq!(handle.raw(), &before);
    }

    #[test]
    fn test_write_zero() {
        // A 200-byte device stops accepting data at its end
        let eeprom = DummyEeprom::new(DummyConfig {
            size: 200,
            ..Default::default()
        });
        let mut data = [0xFFu8; 256];
        data[..200].copy_from_slice(eeprom.data());
        let mut handle = EepromHandle {
            transport: eeprom,
            class: DeviceClass::Board,
            readonly: false,
            cache: RawRecord::from_bytes(data),
        };
        assert_eq!(
            handle.write(&sample_record()),
            Err(Error::Transport(TransportFailure::WriteZero { offset: 200 }))
        );
    }

    #[test]
    fn test_board_write_uses_placeholders() {
        let eeprom = DummyEeprom::new_default();
        let mut handle = EepromHandle::open(eeprom, DeviceClass::Board, false).unwrap();
        handle.write(&sample_record()).unwrap();
        assert_eq!(handle.raw().field(fields::FACTORY_ETHER_MAC), &[0xFF; 6]);
        assert_eq!(
            handle.read().unwrap().mac(MacSlot::FactoryEthernet),
            MacAddress([0xFF; 6])
        );
    }
}
