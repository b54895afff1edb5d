//! On-device record layout
//!
//! The identification EEPROM holds a single 256-byte record. Every field is
//! described here by offset and width and accessed through [`RawRecord`];
//! multi-byte integers are little-endian regardless of host byte order.
//!
//! ```text
//! 0x00  version (u16)        0x02  length (u16, unused)   0x04  reserved[16]
//! 0x14  partnumber[22]       0x2A  padding[8]
//! 0x32  factory wifi MAC     0x38  factory BT MAC
//! 0x3E  factory alt wifi MAC 0x44  factory ethernet MAC
//! 0x4A  asset_id[15]         0x59  reserved[61]
//! 0x96  cfgblk_sig[4]        0x9A  cfgblk_len (u16)
//! 0x9C  macfmt_tag[2]        0x9E  macfmt_version (u16)
//! 0xA0  vendor wifi MAC      0xA6  vendor BT MAC          0xAC  vendor ethernet MAC
//! 0xB2  reserved[77]         0xFF  crc8
//! ```

use crate::checksum::crc8;

/// Size of the raw record in bytes
pub const RECORD_SIZE: usize = 256;

/// Number of bytes covered by the checksum
pub const CHECKSUM_LEN: usize = RECORD_SIZE - 1;

/// The only layout version we understand
pub const LAYOUT_VERSION: u16 = 1;

/// Config block signature expected on module devices
pub const CFGBLK_SIGNATURE: [u8; 4] = *b"NVCB";

/// Config block length written to module devices
pub const CFGBLK_LENGTH: u16 = 28;

/// MAC format tag expected on module devices
pub const MACFMT_TAG: [u8; 2] = *b"M1";

/// MAC format version expected on module devices
pub const MACFMT_VERSION: u16 = 0;

/// "No data" marker written to the tag fields of non-module devices
pub const ABSENT_MARKER: [u8; 4] = *b"FFFF";

/// Placeholder written to every MAC field of non-module devices
pub const MAC_PLACEHOLDER: [u8; 6] = [0xFF; 6];

/// Marker byte prefixing a customer-encoded part number
pub const CUSTOMER_PARTNUMBER_MARKER: u8 = 0xCC;

/// A field's position within the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Byte offset from the start of the record
    pub offset: usize,
    /// Width in bytes
    pub len: usize,
}

impl Span {
    /// Create a span
    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Offset of the first byte past the field
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }

    const fn follows(&self, prev: Span) -> bool {
        self.offset == prev.end()
    }
}

/// Field positions
pub mod fields {
    use super::Span;

    /// Layout version
    pub const VERSION: Span = Span::new(0, 2);
    /// Legacy length, no longer used
    pub const LENGTH: Span = Span::new(2, 2);
    /// Reserved
    pub const RESERVED_1: Span = Span::new(4, 16);
    /// Part number, possibly customer-encoded
    pub const PARTNUMBER: Span = Span::new(20, 22);
    /// Padding after the part number (0x00 or 0xFF)
    pub const PADDING: Span = Span::new(42, 8);
    /// Factory default wifi MAC
    pub const FACTORY_WIFI_MAC: Span = Span::new(50, 6);
    /// Factory default bluetooth MAC
    pub const FACTORY_BT_MAC: Span = Span::new(56, 6);
    /// Factory default alternate wifi MAC
    pub const FACTORY_WIFI_ALT_MAC: Span = Span::new(62, 6);
    /// Factory default ethernet MAC
    pub const FACTORY_ETHER_MAC: Span = Span::new(68, 6);
    /// Asset id
    pub const ASSET_ID: Span = Span::new(74, 15);
    /// Reserved
    pub const RESERVED_2: Span = Span::new(89, 61);
    /// Config block signature
    pub const CFGBLK_SIG: Span = Span::new(150, 4);
    /// Config block length
    pub const CFGBLK_LEN: Span = Span::new(154, 2);
    /// MAC format tag
    pub const MACFMT_TAG: Span = Span::new(156, 2);
    /// MAC format version
    pub const MACFMT_VERSION: Span = Span::new(158, 2);
    /// Vendor wifi MAC
    pub const VENDOR_WIFI_MAC: Span = Span::new(160, 6);
    /// Vendor bluetooth MAC
    pub const VENDOR_BT_MAC: Span = Span::new(166, 6);
    /// Vendor ethernet MAC
    pub const VENDOR_ETHER_MAC: Span = Span::new(172, 6);
    /// Reserved
    pub const RESERVED_3: Span = Span::new(178, 77);
    /// Checksum
    pub const CRC8: Span = Span::new(255, 1);

    /// All fields in record order
    pub const ALL: [Span; 20] = [
        VERSION,
        LENGTH,
        RESERVED_1,
        PARTNUMBER,
        PADDING,
        FACTORY_WIFI_MAC,
        FACTORY_BT_MAC,
        FACTORY_WIFI_ALT_MAC,
        FACTORY_ETHER_MAC,
        ASSET_ID,
        RESERVED_2,
        CFGBLK_SIG,
        CFGBLK_LEN,
        MACFMT_TAG,
        MACFMT_VERSION,
        VENDOR_WIFI_MAC,
        VENDOR_BT_MAC,
        VENDOR_ETHER_MAC,
        RESERVED_3,
        CRC8,
    ];
}

// The field table must tile the record exactly.
const _: () = {
    let all = fields::ALL;
    assert!(all[0].offset == 0);
    let mut i = 1;
    while i < all.len() {
        assert!(all[i].follows(all[i - 1]));
        i += 1;
    }
    assert!(all[all.len() - 1].end() == RECORD_SIZE);
    assert!(fields::CRC8.offset == CHECKSUM_LEN);
};

/// The literal 256-byte on-device record
#[derive(Clone, PartialEq, Eq)]
pub struct RawRecord {
    bytes: [u8; RECORD_SIZE],
}

impl RawRecord {
    /// An all-zero record
    pub const fn zeroed() -> Self {
        Self {
            bytes: [0; RECORD_SIZE],
        }
    }

    /// Wrap raw device bytes
    pub const fn from_bytes(bytes: [u8; RECORD_SIZE]) -> Self {
        Self { bytes }
    }

    /// Raw bytes as stored on the device
    pub fn as_bytes(&self) -> &[u8; RECORD_SIZE] {
        &self.bytes
    }

    /// Mutable access to the raw bytes
    pub fn as_bytes_mut(&mut self) -> &mut [u8; RECORD_SIZE] {
        &mut self.bytes
    }

    /// Borrow a field
    pub fn field(&self, span: Span) -> &[u8] {
        &self.bytes[span.offset..span.end()]
    }

    /// Mutably borrow a field
    pub fn field_mut(&mut self, span: Span) -> &mut [u8] {
        &mut self.bytes[span.offset..span.end()]
    }

    /// Overwrite a field; `data` must be exactly the field width
    pub fn set_field(&mut self, span: Span, data: &[u8]) {
        self.field_mut(span).copy_from_slice(data);
    }

    fn u16_at(&self, span: Span) -> u16 {
        u16::from_le_bytes([self.bytes[span.offset], self.bytes[span.offset + 1]])
    }

    fn set_u16_at(&mut self, span: Span, value: u16) {
        self.set_field(span, &value.to_le_bytes());
    }

    /// Layout version
    pub fn version(&self) -> u16 {
        self.u16_at(fields::VERSION)
    }

    /// Set the layout version
    pub fn set_version(&mut self, version: u16) {
        self.set_u16_at(fields::VERSION, version);
    }

    /// Config block signature
    pub fn cfgblk_sig(&self) -> [u8; 4] {
        let mut sig = [0u8; 4];
        sig.copy_from_slice(self.field(fields::CFGBLK_SIG));
        sig
    }

    /// Config block length
    pub fn cfgblk_len(&self) -> u16 {
        self.u16_at(fields::CFGBLK_LEN)
    }

    /// Set the config block length
    pub fn set_cfgblk_len(&mut self, len: u16) {
        self.set_u16_at(fields::CFGBLK_LEN, len);
    }

    /// MAC format tag
    pub fn macfmt_tag(&self) -> [u8; 2] {
        let mut tag = [0u8; 2];
        tag.copy_from_slice(self.field(fields::MACFMT_TAG));
        tag
    }

    /// MAC format version
    pub fn macfmt_version(&self) -> u16 {
        self.u16_at(fields::MACFMT_VERSION)
    }

    /// Set the MAC format version
    pub fn set_macfmt_version(&mut self, version: u16) {
        self.set_u16_at(fields::MACFMT_VERSION, version);
    }

    /// Stored checksum byte
    pub fn crc8(&self) -> u8 {
        self.bytes[fields::CRC8.offset]
    }

    /// Checksum of the first 255 bytes
    pub fn compute_crc8(&self) -> u8 {
        crc8(&self.bytes[..CHECKSUM_LEN])
    }

    /// Recompute and store the checksum
    pub fn update_crc8(&mut self) -> u8 {
        let crc = self.compute_crc8();
        self.bytes[fields::CRC8.offset] = crc;
        crc
    }
}

impl Default for RawRecord {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl core::fmt::Debug for RawRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RawRecord")
            .field("version", &self.version())
            .field("crc8", &self.crc8())
            .finish_non_exhaustive()
    }
}
