//! Raw record validation
//!
//! A record is decodable only if its checksum and layout version are good;
//! module EEPROMs must additionally carry the config block and MAC format
//! tags. Validation is also what decides, on write, whether the cached
//! record is kept or reinitialized.

use crate::error::ValidationFailure;
use crate::layout::{RawRecord, CFGBLK_SIGNATURE, LAYOUT_VERSION, MACFMT_TAG, MACFMT_VERSION};
use crate::record::DeviceClass;

/// Check `raw` against the rules for `class`
pub fn validate(raw: &RawRecord, class: DeviceClass) -> Result<(), ValidationFailure> {
    let computed = raw.compute_crc8();
    if raw.crc8() != computed {
        return Err(ValidationFailure::ChecksumMismatch {
            stored: raw.crc8(),
            computed,
        });
    }

    let version = raw.version();
    if version != LAYOUT_VERSION {
        return Err(ValidationFailure::UnsupportedVersion(version));
    }

    match class {
        DeviceClass::Module => {
            let sig = raw.cfgblk_sig();
            if sig != CFGBLK_SIGNATURE {
                return Err(ValidationFailure::ConfigBlockSignature(sig));
            }
            let tag = raw.macfmt_tag();
            if tag != MACFMT_TAG {
                return Err(ValidationFailure::MacFormatTag(tag));
            }
            let macfmt_version = raw.macfmt_version();
            if macfmt_version != MACFMT_VERSION {
                return Err(ValidationFailure::MacFormatVersion(macfmt_version));
            }
        }
        DeviceClass::Board => {}
    }

    Ok(())
}

/// Whether `raw` is a well-formed record for `class`
pub fn is_valid(raw: &RawRecord, class: DeviceClass) -> bool {
    validate(raw, class).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{fields, ABSENT_MARKER};

    fn board_record() -> RawRecord {
        let mut raw = RawRecord::zeroed();
        raw.set_version(LAYOUT_VERSION);
        raw.update_crc8();
        raw
    }

    fn module_record() -> RawRecord {
        let mut raw = RawRecord::zeroed();
        raw.set_version(LAYOUT_VERSION);
        raw.set_field(fields::CFGBLK_SIG, &CFGBLK_SIGNATURE);
        raw.set_field(fields::MACFMT_TAG, &MACFMT_TAG);
        raw.set_macfmt_version(MACFMT_VERSION);
        raw.update_crc8();
        raw
    }

    #[test]
    fn test_valid_records() {
        assert!(is_valid(&module_record(), DeviceClass::Module));
        assert!(is_valid(&module_record(), DeviceClass::Board));
        assert!(is_valid(&board_record(), DeviceClass::Board));
    }

    #[test]
    fn test_board_record_lacks_module_tags() {
        assert_eq!(
            validate(&board_record(), DeviceClass::Module),
            Err(ValidationFailure::ConfigBlockSignature([0; 4]))
        );
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut raw = module_record();
        let good = raw.crc8();
        raw.as_bytes_mut()[255] ^= 0x01;
        assert_eq!(
            validate(&raw, DeviceClass::Module),
            Err(ValidationFailure::ChecksumMismatch {
                stored: good ^ 0x01,
                computed: good
            })
        );
    }

    #[test]
    fn test_blank_devices_are_invalid() {
        // Erased parts read as all 0xFF; the checksum cannot match
        let erased = RawRecord::from_bytes([0xFF; 256]);
        assert!(!is_valid(&erased, DeviceClass::Board));
        assert!(!is_valid(&erased, DeviceClass::Module));
        // An all-zero record has a matching checksum but version 0
        assert_eq!(
            validate(&RawRecord::zeroed(), DeviceClass::Board),
            Err(ValidationFailure::UnsupportedVersion(0))
        );
    }

    #[test]
    fn test_wrong_version() {
        let mut raw = module_record();
        raw.set_version(2);
        raw.update_crc8();
        assert_eq!(
            validate(&raw, DeviceClass::Board),
            Err(ValidationFailure::UnsupportedVersion(2))
        );
    }

    #[test]
    fn test_module_tag_checks() {
        let mut raw = module_record();
        raw.set_field(fields::MACFMT_TAG, &ABSENT_MARKER[..2]);
        raw.update_crc8();
        assert_eq!(
            validate(&raw, DeviceClass::Module),
            Err(ValidationFailure::MacFormatTag(*b"FF"))
        );
        assert!(is_valid(&raw, DeviceClass::Board));

        let mut raw = module_record();
        raw.set_macfmt_version(1);
        raw.update_crc8();
        assert_eq!(
            validate(&raw, DeviceClass::Module),
            Err(ValidationFailure::MacFormatVersion(1))
        );
    }
}
