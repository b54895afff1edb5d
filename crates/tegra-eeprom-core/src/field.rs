//! Field transcoding between raw and logical form
//!
//! Strings in the EEPROM are padded with either NUL or 0xFF depending on who
//! programmed the part, and MAC addresses are stored byte-reversed.

use crate::error::{Error, Result};
use crate::layout::{fields, RawRecord, CUSTOMER_PARTNUMBER_MARKER};
use crate::record::{FieldId, MacAddress, PartNumberKind};

/// Returned by [`pack_string`] when the value is wider than the field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overflow {
    /// Length of the value
    pub len: usize,
    /// Width of the field
    pub capacity: usize,
}

/// Content of a padded string field
///
/// Only the final byte decides the padding: if it is 0xFF all trailing 0xFF
/// bytes are dropped, if it is NUL all trailing NULs are dropped, and
/// otherwise the whole field is content. Mixed padding is not trimmed.
pub fn extract_string(raw: &[u8]) -> &[u8] {
    let pad = match raw.last() {
        Some(&b) if b == 0xFF || b == 0x00 => b,
        _ => return raw,
    };
    let len = raw.iter().rposition(|&b| b != pad).map_or(0, |i| i + 1);
    &raw[..len]
}

/// Copy `value` into the start of `dest`
///
/// Bytes of `dest` past the value keep their previous contents; callers
/// clear the field first when that matters. Nothing is written if the
/// value does not fit.
pub fn pack_string(value: &[u8], dest: &mut [u8]) -> core::result::Result<(), Overflow> {
    if value.len() > dest.len() {
        return Err(Overflow {
            len: value.len(),
            capacity: dest.len(),
        });
    }
    dest[..value.len()].copy_from_slice(value);
    Ok(())
}

/// Byte-reversed copy of a 6-byte MAC field
///
/// The transform is its own inverse, so [`pack_mac`] is the same operation.
pub fn extract_mac(raw: &[u8; 6]) -> [u8; 6] {
    let mut out = *raw;
    out.reverse();
    out
}

/// Raw (byte-reversed) form of a MAC address
pub fn pack_mac(mac: &MacAddress) -> [u8; 6] {
    extract_mac(&mac.octets())
}

/// Read the MAC field at `span` in conventional order
pub(crate) fn read_mac(raw: &RawRecord, span: crate::layout::Span) -> MacAddress {
    let mut octets = [0u8; 6];
    octets.copy_from_slice(raw.field(span));
    MacAddress(extract_mac(&octets))
}

/// Decode the part number field into its kind and content
pub fn extract_partnumber(raw: &RawRecord) -> (PartNumberKind, &[u8]) {
    let field = raw.field(fields::PARTNUMBER);
    match field {
        [CUSTOMER_PARTNUMBER_MARKER, rest @ ..] => (PartNumberKind::Customer, extract_string(rest)),
        _ => (PartNumberKind::Vendor, extract_string(field)),
    }
}

/// Encode a part number into the raw record
///
/// The string area of the field is cleared to NUL before packing so a
/// shorter value never inherits the tail of a longer one. A vendor value
/// may not start with the customer marker, or it would decode as a
/// customer part number. Nothing is written on error.
pub fn pack_partnumber(raw: &mut RawRecord, kind: PartNumberKind, value: &[u8]) -> Result<()> {
    if kind == PartNumberKind::Vendor && value.first() == Some(&CUSTOMER_PARTNUMBER_MARKER) {
        return Err(Error::ReservedPartNumberByte);
    }
    let field = raw.field_mut(fields::PARTNUMBER);
    let dest = match kind {
        PartNumberKind::Vendor => &mut field[..],
        PartNumberKind::Customer => &mut field[1..],
    };
    if value.len() > dest.len() {
        return Err(Error::FieldOverflow {
            field: FieldId::PartNumber,
            len: value.len(),
            capacity: dest.len(),
        });
    }
    dest.fill(0);
    dest[..value.len()].copy_from_slice(value);
    if kind == PartNumberKind::Customer {
        field[0] = CUSTOMER_PARTNUMBER_MARKER;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_string_padding_rules() {
        assert_eq!(extract_string(&[0xFF; 15]), b"");
        assert_eq!(extract_string(&[0x00; 15]), b"");
        assert_eq!(extract_string(b"ABC\xff\xff\xff"), b"ABC");
        assert_eq!(extract_string(b"ABC\0\0\0"), b"ABC");
        assert_eq!(extract_string(b"ABCDEF"), b"ABCDEF");
    }

    #[test]
    fn test_extract_string_mixed_padding_is_asymmetric() {
        // Only the padding kind found at the last byte is stripped
        assert_eq!(extract_string(b"AB\0\0\xff\xff"), b"AB\0\0");
        assert_eq!(extract_string(b"AB\xff\xff\0\0"), b"AB\xff\xff");
        // Embedded padding before literal content is kept
        assert_eq!(extract_string(b"A\0B"), b"A\0B");
    }

    #[test]
    fn test_pack_string_leaves_tail() {
        let mut dest = *b"XXXXXX";
        pack_string(b"ab", &mut dest).unwrap();
        assert_eq!(&dest, b"abXXXX");
    }

    #[test]
    fn test_pack_string_overflow_writes_nothing() {
        let mut dest = [0u8; 4];
        let err = pack_string(b"abcde", &mut dest).unwrap_err();
        assert_eq!(err, Overflow { len: 5, capacity: 4 });
        assert_eq!(dest, [0u8; 4]);
        pack_string(b"abcd", &mut dest).unwrap();
        assert_eq!(&dest, b"abcd");
    }

    #[test]
    fn test_mac_reversal() {
        let raw = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
        let mac = extract_mac(&raw);
        assert_eq!(mac, [0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);
        assert_eq!(pack_mac(&MacAddress(mac)), raw);
    }

    #[test]
    fn test_mac_reversal_is_self_inverse() {
        // Every byte value in every position, over two different backgrounds
        for background in [[0x00; 6], [0x5A, 0xA5, 0x3C, 0xC3, 0x0F, 0xF0]] {
            for pos in 0..6 {
                for value in 0..=255u8 {
                    let mut raw = background;
                    raw[pos] = value;
                    let mac = extract_mac(&raw);
                    assert_eq!(mac[5 - pos], value);
                    assert_eq!(extract_mac(&mac), raw);
                    assert_eq!(pack_mac(&MacAddress(mac)), raw);
                }
            }
        }
    }

    #[test]
    fn test_partnumber_customer_marker() {
        let mut raw = RawRecord::zeroed();
        pack_partnumber(&mut raw, PartNumberKind::Customer, b"ACME-1").unwrap();
        let field = raw.field(fields::PARTNUMBER);
        assert_eq!(field[0], CUSTOMER_PARTNUMBER_MARKER);
        assert_eq!(&field[1..7], b"ACME-1");
        assert_eq!(
            extract_partnumber(&raw),
            (PartNumberKind::Customer, &b"ACME-1"[..])
        );

        pack_partnumber(&mut raw, PartNumberKind::Vendor, b"699").unwrap();
        let field = raw.field(fields::PARTNUMBER);
        assert_eq!(&field[..3], b"699");
        assert!(field[3..].iter().all(|&b| b == 0));
        assert_eq!(extract_partnumber(&raw), (PartNumberKind::Vendor, &b"699"[..]));
    }

    #[test]
    fn test_vendor_partnumber_rejects_marker_byte() {
        let mut raw = RawRecord::zeroed();
        // U+0300 encodes as CC 80
        let value = "\u{300}699-1".as_bytes();
        assert_eq!(value[0], CUSTOMER_PARTNUMBER_MARKER);
        assert_eq!(
            pack_partnumber(&mut raw, PartNumberKind::Vendor, value),
            Err(Error::ReservedPartNumberByte)
        );
        assert_eq!(raw, RawRecord::zeroed());

        // Fine as a customer part number, where the marker precedes it
        pack_partnumber(&mut raw, PartNumberKind::Customer, value).unwrap();
        assert_eq!(extract_partnumber(&raw), (PartNumberKind::Customer, value));
    }

    #[test]
    fn test_partnumber_vendor_empty_has_no_marker() {
        let mut raw = RawRecord::from_bytes([0xCC; 256]);
        pack_partnumber(&mut raw, PartNumberKind::Vendor, b"").unwrap();
        assert_eq!(raw.field(fields::PARTNUMBER)[0], 0);
    }

    #[test]
    fn test_partnumber_customer_overflow() {
        let mut raw = RawRecord::zeroed();
        let value = [b'A'; 22];
        assert_eq!(
            pack_partnumber(&mut raw, PartNumberKind::Customer, &value),
            Err(Error::FieldOverflow {
                field: FieldId::PartNumber,
                len: 22,
                capacity: 21
            })
        );
        assert_eq!(raw, RawRecord::zeroed());
        pack_partnumber(&mut raw, PartNumberKind::Vendor, &value).unwrap();
    }
}
