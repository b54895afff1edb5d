//! Set, verify and write commands

use super::CmdResult;
use embedded_io::{Read, Seek, Write};
use tegra_eeprom_core::{FieldId, Session};

/// Set one field from its text arguments
pub fn cmd_set<T: Read + Write + Seek>(
    session: &mut Session<T>,
    field: FieldId,
    values: &[String],
) -> CmdResult {
    if field != FieldId::PartNumber && values.len() > 1 {
        return Err(format!("'{}' takes a single value", field).into());
    }
    let args: Vec<&str> = values.iter().map(String::as_str).collect();
    session.set_field(field, &args)?;
    log::debug!("Set {}", field);
    Ok(())
}

/// Check the contents on the device
pub fn cmd_verify<T: Read + Write + Seek>(session: &Session<T>) -> CmdResult {
    session.verify()?;
    println!("Verification successful");
    Ok(())
}

/// Write pending changes, or initialize a blank device
pub fn cmd_write<T: Read + Write + Seek>(session: &mut Session<T>) -> CmdResult {
    session.commit()?;
    println!("EEPROM written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tegra_eeprom_core::{DeviceClass, EepromHandle, Error, MacSlot};
    use tegra_eeprom_dummy::DummyEeprom;

    fn session(class: DeviceClass) -> Session<DummyEeprom> {
        Session::new(EepromHandle::open(DummyEeprom::new_default(), class, false).unwrap())
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_set_partnumber_with_kind() {
        let mut session = session(DeviceClass::Module);
        cmd_set(
            &mut session,
            FieldId::PartNumber,
            &strings(&["customer", "ACME-1"]),
        )
        .unwrap();
        assert!(session.is_modified());
        assert_eq!(
            session.record().unwrap().partnumber().as_str(),
            Some("ACME-1")
        );
    }

    #[test]
    fn test_set_rejects_extra_value() {
        let mut session = session(DeviceClass::Module);
        let err = cmd_set(&mut session, FieldId::AssetId, &strings(&["a", "b"])).unwrap_err();
        assert_eq!(err.to_string(), "'asset-id' takes a single value");
        assert!(!session.is_modified());
    }

    #[test]
    fn test_set_mac_on_board_is_rejected() {
        let mut session = session(DeviceClass::Board);
        let field = FieldId::Mac(MacSlot::VendorBluetooth);
        let err = cmd_set(&mut session, field, &strings(&["00:04:4b:00:00:01"])).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::FieldNotSupported(field))
        );
    }

    #[test]
    fn test_write_then_verify() {
        let mut session = session(DeviceClass::Board);
        assert!(cmd_verify(&session).is_err());
        cmd_set(&mut session, FieldId::AssetId, &strings(&["A1"])).unwrap();
        assert_eq!(
            cmd_verify(&session).unwrap_err().downcast_ref::<Error>(),
            Some(&Error::PendingChanges)
        );
        cmd_write(&mut session).unwrap();
        cmd_verify(&session).unwrap();
        assert_eq!(
            cmd_write(&mut session).unwrap_err().downcast_ref::<Error>(),
            Some(&Error::NoChanges)
        );
    }
}
