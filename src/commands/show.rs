//! Show, get and fields commands

use super::CmdResult;
use embedded_io::{Read, Seek, Write};
use tegra_eeprom_core::{DeviceClass, Error, FieldId, LogicalRecord, Session};

/// One `show` line per field present on `class`
pub fn show_lines(record: &LogicalRecord, class: DeviceClass) -> Vec<String> {
    FieldId::ALL
        .iter()
        .filter(|field| field.supported_by(class))
        .map(|&field| match field {
            FieldId::PartNumber => format!(
                "{}[{}]: {}",
                field,
                record.partnumber_kind(),
                record.display_field(field)
            ),
            _ => format!("{}: {}", field, record.display_field(field)),
        })
        .collect()
}

/// Value of a single field as printed by `get`
pub fn get_line(record: &LogicalRecord, field: FieldId) -> String {
    match field {
        FieldId::PartNumber => format!(
            "{} [{}]",
            record.display_field(field),
            record.partnumber_kind()
        ),
        _ => record.display_field(field).to_string(),
    }
}

/// Print all fields
pub fn cmd_show<T: Read + Write + Seek>(session: &Session<T>) -> CmdResult {
    let record = session.record()?;
    for line in show_lines(record, session.handle().class()) {
        println!("{}", line);
    }
    Ok(())
}

/// Print one field
pub fn cmd_get<T: Read + Write + Seek>(session: &Session<T>, field: FieldId) -> CmdResult {
    let record = session.record()?;
    if !field.supported_by(session.handle().class()) {
        return Err(Error::FieldNotSupported(field).into());
    }
    println!("{}", get_line(record, field));
    Ok(())
}

/// List the field names
pub fn cmd_fields(class: DeviceClass) {
    for field in FieldId::ALL {
        let note = if field.supported_by(class) {
            ""
        } else {
            " (module only)"
        };
        println!("{}{}", field, note);
    }
}
