//! Record codec
//!
//! [`decode`] turns a validated raw record into a [`LogicalRecord`];
//! [`encode_and_prepare`] produces the raw record to write back, starting
//! from the cached device contents so that fields we do not model survive
//! the rewrite.

use log::debug;

use crate::error::Result;
use crate::field::{extract_partnumber, extract_string, pack_mac, pack_partnumber, read_mac};
use crate::layout::{
    fields, RawRecord, ABSENT_MARKER, CFGBLK_LENGTH, CFGBLK_SIGNATURE, LAYOUT_VERSION,
    MACFMT_TAG, MACFMT_VERSION, MAC_PLACEHOLDER,
};
use crate::record::{DeviceClass, LogicalRecord, MacSlot};
use crate::validate::validate;

/// Decode a raw record
///
/// Fails with [`Error::Validation`](crate::Error::Validation) without looking at any field if the
/// record is not valid for `class`. All seven MAC fields are decoded for
/// every class.
pub fn decode(raw: &RawRecord, class: DeviceClass) -> Result<LogicalRecord> {
    validate(raw, class)?;

    let mut record = LogicalRecord::new();
    let (kind, partnumber) = extract_partnumber(raw);
    record.set_partnumber_bytes(kind, partnumber)?;
    record.set_asset_id_bytes(extract_string(raw.field(fields::ASSET_ID)))?;
    for slot in MacSlot::ALL {
        record.set_mac(slot, read_mac(raw, slot.span()));
    }
    Ok(record)
}

/// Blank record carrying the fixed header for `class`
fn initialized(class: DeviceClass) -> RawRecord {
    let mut raw = RawRecord::zeroed();
    raw.set_version(LAYOUT_VERSION);
    match class {
        DeviceClass::Module => {
            raw.set_field(fields::CFGBLK_SIG, &CFGBLK_SIGNATURE);
            raw.set_cfgblk_len(CFGBLK_LENGTH);
            raw.set_field(fields::MACFMT_TAG, &MACFMT_TAG);
            raw.set_macfmt_version(MACFMT_VERSION);
        }
        // Boards get the absent markers below, on every write
        DeviceClass::Board => {}
    }
    raw
}

/// Build the raw record that writing `record` to a device produces
///
/// If `cache` is not a valid record for `class` the result starts from a
/// freshly initialized record instead. Module devices get all seven MACs
/// from `record`; boards get the "no data" markers in the tag and MAC
/// fields whatever `record` holds. The checksum is always recomputed.
///
/// Fails with [`Error::FieldOverflow`](crate::Error::FieldOverflow) if a
/// string does not fit, or with
/// [`Error::ReservedPartNumberByte`](crate::Error::ReservedPartNumberByte)
/// for a vendor part number starting with the customer marker. `cache` is
/// never modified.
pub fn encode_and_prepare(
    record: &LogicalRecord,
    cache: &RawRecord,
    class: DeviceClass,
) -> Result<RawRecord> {
    let mut raw = match validate(cache, class) {
        Ok(()) => cache.clone(),
        Err(failure) => {
            debug!("Reinitializing {} record ({})", class, failure);
            initialized(class)
        }
    };

    let partnumber = record.partnumber().as_bytes();
    pack_partnumber(&mut raw, record.partnumber_kind(), partnumber)?;

    let asset_id = raw.field_mut(fields::ASSET_ID);
    asset_id.fill(0);
    // FieldString capacity equals the field width
    asset_id[..record.asset_id().len()].copy_from_slice(record.asset_id().as_bytes());

    match class {
        DeviceClass::Module => {
            for slot in MacSlot::ALL {
                raw.set_field(slot.span(), &pack_mac(&record.mac(slot)));
            }
        }
        DeviceClass::Board => {
            raw.set_field(fields::CFGBLK_SIG, &ABSENT_MARKER);
            raw.set_field(fields::MACFMT_TAG, &ABSENT_MARKER[..fields::MACFMT_TAG.len]);
            for slot in MacSlot::ALL {
                raw.set_field(slot.span(), &MAC_PLACEHOLDER);
            }
        }
    }

    raw.update_crc8();
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ValidationFailure};
    use crate::layout::CUSTOMER_PARTNUMBER_MARKER;
    use crate::record::{MacAddress, PartNumberKind};
    use crate::validate::is_valid;

    const PARTNUMBER: &[u8; 22] = b"699-08395-0000-300 200";

    /// A module record as shipped: version 1, module tags, vendor part number
    fn shipped_module_record() -> RawRecord {
        let mut raw = RawRecord::zeroed();
        raw.set_version(1);
        raw.set_field(fields::PARTNUMBER, PARTNUMBER);
        raw.set_field(fields::PADDING, &[0xFF; 8]);
        raw.set_field(fields::CFGBLK_SIG, b"NVCB");
        raw.set_cfgblk_len(28);
        raw.set_field(fields::MACFMT_TAG, b"M1");
        raw.set_field(fields::FACTORY_ETHER_MAC, &[0x11, 0x22, 0x33, 0x4B, 0x04, 0x00]);
        raw.as_bytes_mut()[100] = 0x5A;
        raw.update_crc8();
        raw
    }

    fn sample_record() -> LogicalRecord {
        let mut record = LogicalRecord::new();
        record
            .set_partnumber(PartNumberKind::Customer, "ACME-JETSON-0001")
            .unwrap();
        record.set_asset_id("SN-42").unwrap();
        for (i, slot) in MacSlot::ALL.iter().enumerate() {
            let i = i as u8;
            record.set_mac(*slot, MacAddress([0x02, 0x00, 0x00, 0x00, 0x10, i]));
        }
        record
    }

    #[test]
    fn test_decode_vendor_partnumber() {
        let raw = shipped_module_record();
        let record = decode(&raw, DeviceClass::Module).unwrap();
        assert_eq!(record.partnumber_kind(), PartNumberKind::Vendor);
        assert_eq!(record.partnumber().as_bytes(), PARTNUMBER);
        assert!(record.asset_id().is_empty());
        assert_eq!(
            record.mac(MacSlot::FactoryEthernet),
            MacAddress([0x00, 0x04, 0x4B, 0x33, 0x22, 0x11])
        );
        assert_eq!(record.mac(MacSlot::VendorWifi), MacAddress([0; 6]));
    }

    #[test]
    fn test_decode_customer_partnumber() {
        let mut raw = shipped_module_record();
        let field = raw.field_mut(fields::PARTNUMBER);
        field.fill(0);
        field[0] = CUSTOMER_PARTNUMBER_MARKER;
        field[1..7].copy_from_slice(b"ACME-1");
        raw.update_crc8();

        let record = decode(&raw, DeviceClass::Module).unwrap();
        assert_eq!(record.partnumber_kind(), PartNumberKind::Customer);
        assert_eq!(record.partnumber().as_str(), Some("ACME-1"));
    }

    #[test]
    fn test_decode_rejects_flipped_checksum() {
        let mut raw = shipped_module_record();
        raw.as_bytes_mut()[255] ^= 0x80;
        assert!(matches!(
            decode(&raw, DeviceClass::Module),
            Err(Error::Validation(ValidationFailure::ChecksumMismatch { .. }))
        ));
    }

    #[test]
    fn test_decode_does_not_touch_cache() {
        let raw = shipped_module_record();
        let before = raw.clone();
        let first = decode(&raw, DeviceClass::Module).unwrap();
        let second = decode(&raw, DeviceClass::Module).unwrap();
        assert_eq!(raw, before);
        assert_eq!(first, second);
    }

    #[test]
    fn test_module_round_trip_from_blank() {
        let record = sample_record();
        let blank = RawRecord::from_bytes([0xFF; 256]);
        let raw = encode_and_prepare(&record, &blank, DeviceClass::Module).unwrap();

        assert!(is_valid(&raw, DeviceClass::Module));
        assert_eq!(raw.field(fields::PARTNUMBER)[0], CUSTOMER_PARTNUMBER_MARKER);
        assert_eq!(raw.cfgblk_len(), CFGBLK_LENGTH);
        assert_eq!(decode(&raw, DeviceClass::Module).unwrap(), record);
    }

    #[test]
    fn test_write_preserves_unmodelled_bytes() {
        let cache = shipped_module_record();
        let mut record = decode(&cache, DeviceClass::Module).unwrap();
        record.set_asset_id("1422519000123").unwrap();

        let raw = encode_and_prepare(&record, &cache, DeviceClass::Module).unwrap();
        assert_eq!(raw.as_bytes()[100], 0x5A);
        assert_eq!(raw.field(fields::PADDING), &[0xFF; 8]);
        assert_eq!(&raw.field(fields::ASSET_ID)[..13], b"1422519000123");
        assert_eq!(&raw.field(fields::ASSET_ID)[13..], &[0, 0]);
        assert_eq!(decode(&raw, DeviceClass::Module).unwrap(), record);
    }

    #[test]
    fn test_shorter_partnumber_does_not_inherit_tail() {
        let cache = shipped_module_record();
        let mut record = decode(&cache, DeviceClass::Module).unwrap();
        record.set_partnumber(PartNumberKind::Vendor, "699-1").unwrap();

        let raw = encode_and_prepare(&record, &cache, DeviceClass::Module).unwrap();
        let decoded = decode(&raw, DeviceClass::Module).unwrap();
        assert_eq!(decoded.partnumber().as_str(), Some("699-1"));
    }

    #[test]
    fn test_invalid_cache_is_reinitialized() {
        let mut cache = shipped_module_record();
        cache.as_bytes_mut()[255] ^= 0x01;

        let raw = encode_and_prepare(&sample_record(), &cache, DeviceClass::Module).unwrap();
        assert_eq!(raw.as_bytes()[100], 0);
        assert_eq!(raw.field(fields::PADDING), &[0; 8]);
        assert_eq!(raw.version(), LAYOUT_VERSION);
        assert_eq!(raw.cfgblk_sig(), CFGBLK_SIGNATURE);
        assert_eq!(raw.macfmt_tag(), MACFMT_TAG);
        assert_eq!(raw.macfmt_version(), MACFMT_VERSION);
    }

    #[test]
    fn test_board_ignores_logical_macs() {
        let record = sample_record();
        let raw = encode_and_prepare(&record, &RawRecord::zeroed(), DeviceClass::Board).unwrap();

        assert!(is_valid(&raw, DeviceClass::Board));
        assert!(!is_valid(&raw, DeviceClass::Module));
        assert_eq!(&raw.cfgblk_sig(), b"FFFF");
        assert_eq!(&raw.macfmt_tag(), b"FF");
        assert_eq!(raw.cfgblk_len(), 0);
        for slot in MacSlot::ALL {
            assert_eq!(raw.field(slot.span()), &MAC_PLACEHOLDER);
        }

        let decoded = decode(&raw, DeviceClass::Board).unwrap();
        assert_eq!(decoded.partnumber(), record.partnumber());
        assert_eq!(decoded.asset_id(), record.asset_id());
        assert_eq!(decoded.mac(MacSlot::FactoryWifi), MacAddress([0xFF; 6]));
    }

    #[test]
    fn test_board_rewrite_replaces_module_tags() {
        // A valid board cache that happens to carry module tags still gets
        // the absent markers
        let cache = shipped_module_record();
        let record = decode(&cache, DeviceClass::Board).unwrap();
        let raw = encode_and_prepare(&record, &cache, DeviceClass::Board).unwrap();
        assert_eq!(&raw.cfgblk_sig(), b"FFFF");
        assert_eq!(raw.cfgblk_len(), 28);
        assert_eq!(raw.field(fields::FACTORY_ETHER_MAC), &MAC_PLACEHOLDER);
    }

    #[test]
    fn test_vendor_partnumber_never_sets_marker() {
        let mut record = LogicalRecord::new();
        record.set_partnumber(PartNumberKind::Vendor, "").unwrap();
        let cache = RawRecord::from_bytes([0xCC; 256]);
        let raw = encode_and_prepare(&record, &cache, DeviceClass::Module).unwrap();
        assert_ne!(raw.field(fields::PARTNUMBER)[0], CUSTOMER_PARTNUMBER_MARKER);
    }

    #[test]
    fn test_partnumber_kind_survives_round_trip() {
        let values: [&[u8]; 4] = [b"699-1", b"\xCB\x80", b"\xCD\x80", b"A\xCC"];
        for kind in [PartNumberKind::Vendor, PartNumberKind::Customer] {
            for value in values {
                let mut record = LogicalRecord::new();
                record.set_partnumber_bytes(kind, value).unwrap();
                let raw =
                    encode_and_prepare(&record, &RawRecord::zeroed(), DeviceClass::Module).unwrap();
                let decoded = decode(&raw, DeviceClass::Module).unwrap();
                assert_eq!(decoded.partnumber_kind(), kind);
                assert_eq!(decoded.partnumber().as_bytes(), value);
            }
        }

        // A vendor value led by the marker byte is refused before encoding
        let mut record = LogicalRecord::new();
        assert_eq!(
            record.set_partnumber(PartNumberKind::Vendor, "\u{300}699-1"),
            Err(Error::ReservedPartNumberByte)
        );
        let raw = encode_and_prepare(&record, &RawRecord::zeroed(), DeviceClass::Module).unwrap();
        assert_eq!(raw.field(fields::PARTNUMBER)[0], 0);
    }
}
