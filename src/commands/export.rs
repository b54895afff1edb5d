//! Export and import of EEPROM fields as TOML
//!
//! ```toml
//! asset-id = "1422519000123"
//!
//! [partnumber]
//! kind = "vendor"
//! value = "699-13668-0001-301 B.0"
//!
//! [mac]
//! factory-default-wifi-mac = "00:04:4b:a5:10:01"
//! ```
//!
//! MAC addresses are only exported for module EEPROMs. On import every key
//! is optional; fields that are present go through the same checks as
//! `set`.

use super::CmdResult;
use embedded_io::{Read, Seek, Write};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tegra_eeprom_core::{FieldId, LogicalRecord, MacAddress, PartNumberKind, Session};
use thiserror::Error;

/// Errors specific to the TOML representation
#[derive(Debug, Error)]
pub enum RecordFileError {
    /// Field holds bytes that cannot be written as a TOML string
    #[error("field '{0}' is not valid UTF-8 and cannot be exported")]
    NotUtf8(FieldId),

    /// Unknown key in the `[mac]` table
    #[error("unrecognized MAC field name: {0}")]
    UnknownMacField(String),

    /// Key in the `[mac]` table that is not a MAC field
    #[error("'{0}' is not a MAC address field")]
    NotMacField(FieldId),

    /// Bad part number kind
    #[error("partnumber kind must be either 'vendor' or 'customer', got '{0}'")]
    InvalidKind(String),

    /// Bad MAC address
    #[error("could not parse MAC address '{value}' for '{field}'")]
    InvalidMac { field: FieldId, value: String },
}

/// Part number table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartNumberEntry {
    pub kind: String,
    pub value: String,
}

/// TOML file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RecordFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partnumber: Option<PartNumberEntry>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mac: BTreeMap<String, String>,
}

impl RecordFile {
    /// Capture the fields of `record` present on a device with or without
    /// module fields
    pub fn from_record(
        record: &LogicalRecord,
        with_macs: bool,
    ) -> Result<Self, RecordFileError> {
        let partnumber = record
            .partnumber()
            .as_str()
            .ok_or(RecordFileError::NotUtf8(FieldId::PartNumber))?;
        let asset_id = record
            .asset_id()
            .as_str()
            .ok_or(RecordFileError::NotUtf8(FieldId::AssetId))?;

        let mut mac = BTreeMap::new();
        if with_macs {
            for field in FieldId::ALL {
                if let FieldId::Mac(slot) = field {
                    mac.insert(field.name().to_string(), record.mac(slot).to_string());
                }
            }
        }

        Ok(Self {
            asset_id: Some(asset_id.to_string()),
            partnumber: Some(PartNumberEntry {
                kind: record.partnumber_kind().label().to_string(),
                value: partnumber.to_string(),
            }),
            mac,
        })
    }

    /// Apply every field present in the file to the session
    ///
    /// Stops at the first field that cannot be set; fields applied before
    /// it stay set.
    pub fn apply<T: Read + Write + Seek>(&self, session: &mut Session<T>) -> CmdResult {
        if let Some(entry) = &self.partnumber {
            let kind: PartNumberKind = entry
                .kind
                .parse()
                .map_err(|()| RecordFileError::InvalidKind(entry.kind.clone()))?;
            session.set_partnumber(kind, &entry.value)?;
        }
        if let Some(asset_id) = &self.asset_id {
            session.set_asset_id(asset_id)?;
        }
        for (name, value) in &self.mac {
            let field = FieldId::from_name(name)
                .ok_or_else(|| RecordFileError::UnknownMacField(name.clone()))?;
            let FieldId::Mac(slot) = field else {
                return Err(RecordFileError::NotMacField(field).into());
            };
            let mac: MacAddress = value.parse().map_err(|_| RecordFileError::InvalidMac {
                field,
                value: value.clone(),
            })?;
            session.set_mac(slot, mac)?;
        }
        Ok(())
    }
}

/// Print or save the fields as TOML
pub fn cmd_export<T: Read + Write + Seek>(session: &Session<T>, output: Option<&Path>) -> CmdResult {
    let record = session.record()?;
    let with_macs = session.handle().class().has_module_fields();
    let content = toml::to_string(&RecordFile::from_record(record, with_macs)?)?;

    match output {
        Some(path) => {
            std::fs::write(path, content)?;
            println!("Exported fields to {:?}", path);
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// Set fields from a TOML file and write them to the device
pub fn cmd_import<T: Read + Write + Seek>(session: &mut Session<T>, input: &Path) -> CmdResult {
    let content = std::fs::read_to_string(input)?;
    let file: RecordFile = toml::from_str(&content)?;
    log::info!("Loaded fields from {:?}", input);
    file.apply(session)?;
    session.commit()?;
    println!("EEPROM written");
    Ok(())
}
