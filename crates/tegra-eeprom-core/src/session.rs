//! Editing session
//!
//! A [`Session`] pairs an open handle with the logical record being edited
//! and tracks whether the device held valid data and whether anything has
//! changed since. This is the state the command-line tool works on.

use embedded_io::{Read, Seek, Write};
use log::{debug, info};

use crate::error::{Error, Result};
use crate::handle::EepromHandle;
use crate::record::{FieldId, LogicalRecord, MacAddress, MacSlot, PartNumberKind};

/// Edits to one EEPROM
#[derive(Debug)]
pub struct Session<T> {
    handle: EepromHandle<T>,
    record: LogicalRecord,
    has_data: bool,
    modified: bool,
}

impl<T: Read + Write + Seek> Session<T> {
    /// Start a session, decoding the handle's cached record
    ///
    /// A device whose contents do not decode starts out with an empty
    /// record and no data.
    pub fn new(handle: EepromHandle<T>) -> Self {
        let (record, has_data) = match handle.read() {
            Ok(record) => (record, true),
            Err(e) => {
                info!("No valid EEPROM contents ({})", e);
                (LogicalRecord::new(), false)
            }
        };
        Self {
            handle,
            record,
            has_data,
            modified: false,
        }
    }

    /// The record, if the device held valid data or it has been edited
    pub fn record(&self) -> Result<&LogicalRecord> {
        if self.has_data || self.modified {
            Ok(&self.record)
        } else {
            Err(Error::NoData)
        }
    }

    fn check_settable(&self, field: FieldId) -> Result<()> {
        if self.handle.is_readonly() {
            return Err(Error::ReadOnly);
        }
        if !field.supported_by(self.handle.class()) {
            return Err(Error::FieldNotSupported(field));
        }
        Ok(())
    }

    /// Set the part number and its kind
    pub fn set_partnumber(&mut self, kind: PartNumberKind, value: &str) -> Result<()> {
        self.check_settable(FieldId::PartNumber)?;
        self.record.set_partnumber(kind, value)?;
        self.modified = true;
        Ok(())
    }

    /// Set the asset id
    pub fn set_asset_id(&mut self, value: &str) -> Result<()> {
        self.check_settable(FieldId::AssetId)?;
        self.record.set_asset_id(value)?;
        self.modified = true;
        Ok(())
    }

    /// Set a MAC address (module devices only)
    pub fn set_mac(&mut self, slot: MacSlot, mac: MacAddress) -> Result<()> {
        self.check_settable(FieldId::Mac(slot))?;
        self.record.set_mac(slot, mac);
        self.modified = true;
        Ok(())
    }

    /// Set a field from its text arguments
    ///
    /// The part number takes a kind and a value, every other field a single
    /// value. Extra arguments are ignored.
    pub fn set_field(&mut self, field: FieldId, args: &[&str]) -> Result<()> {
        self.check_settable(field)?;
        match field {
            FieldId::PartNumber => {
                let [kind, value, ..] = args else {
                    return Err(Error::MissingValue(field));
                };
                let kind = kind
                    .parse::<PartNumberKind>()
                    .map_err(|()| Error::InvalidValue(field))?;
                self.set_partnumber(kind, value)
            }
            FieldId::AssetId => {
                let value = args.first().ok_or(Error::MissingValue(field))?;
                self.set_asset_id(value)
            }
            FieldId::Mac(slot) => {
                let value = args.first().ok_or(Error::MissingValue(field))?;
                let mac = value
                    .parse::<MacAddress>()
                    .map_err(|_| Error::InvalidValue(field))?;
                self.set_mac(slot, mac)
            }
        }
    }

    /// Validate the device contents
    ///
    /// Refused while edits are pending, since they have not reached the
    /// device yet.
    pub fn verify(&self) -> Result<()> {
        if self.modified {
            return Err(Error::PendingChanges);
        }
        self.handle.verify()
    }

    /// Write the record to the device
    ///
    /// A device without valid data is always written, initializing it;
    /// otherwise there must be changes to write.
    pub fn commit(&mut self) -> Result<()> {
        if self.handle.is_readonly() {
            return Err(Error::ReadOnly);
        }
        if self.has_data && !self.modified {
            return Err(Error::NoChanges);
        }
        self.handle.write(&self.record)?;
        debug!("Committed EEPROM changes");
        self.has_data = true;
        self.modified = false;
        Ok(())
    }

    /// Write pending changes, if any, and release the transport
    pub fn finish(mut self) -> Result<T> {
        if self.modified {
            self.commit()?;
        }
        Ok(self.handle.close())
    }
}

impl<T> Session<T> {
    /// Whether the device held a valid record (or one has been written)
    pub fn has_data(&self) -> bool {
        self.has_data
    }

    /// Whether there are edits not yet written
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// The underlying handle
    pub fn handle(&self) -> &EepromHandle<T> {
        &self.handle
    }
}
