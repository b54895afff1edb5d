//! Logical (decoded) record types

use core::fmt;
use core::str::FromStr;

use heapless::Vec;

use crate::error::{Error, Result};
use crate::layout::{fields, Span, CUSTOMER_PARTNUMBER_MARKER};

/// Width of the raw part number field
pub const PARTNUMBER_LEN: usize = fields::PARTNUMBER.len;

/// Width of the raw asset id field
pub const ASSET_ID_LEN: usize = fields::ASSET_ID.len;

/// Kind of device the EEPROM belongs to
///
/// Fixed for the lifetime of a handle. Module EEPROMs carry the config block
/// and MAC format tags plus real MAC addresses; carrier boards carry none of
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    /// EEPROM on a compute module (SoM)
    Module,
    /// EEPROM on a carrier or other board
    Board,
}

impl DeviceClass {
    /// Whether module-only fields exist on this class
    pub fn has_module_fields(&self) -> bool {
        match self {
            Self::Module => true,
            Self::Board => false,
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module => write!(f, "module"),
            Self::Board => write!(f, "board"),
        }
    }
}

/// Who wrote the part number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PartNumberKind {
    /// Stored plain, as programmed by the module manufacturer
    #[default]
    Vendor,
    /// Stored behind the 0xCC marker byte by a downstream integrator
    Customer,
}

impl PartNumberKind {
    /// Number of string bytes the raw field can hold for this kind
    pub fn capacity(&self) -> usize {
        match self {
            Self::Vendor => PARTNUMBER_LEN,
            Self::Customer => PARTNUMBER_LEN - 1,
        }
    }

    /// Label used when displaying the part number
    pub fn label(&self) -> &'static str {
        match self {
            Self::Vendor => "vendor",
            Self::Customer => "customer",
        }
    }
}

impl fmt::Display for PartNumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Case-insensitive prefix match, the way the tool has always accepted kinds
fn is_abbrev(input: &str, word: &str) -> bool {
    !input.is_empty()
        && input.len() <= word.len()
        && word.as_bytes()[..input.len()].eq_ignore_ascii_case(input.as_bytes())
}

impl FromStr for PartNumberKind {
    type Err = ();

    fn from_str(s: &str) -> core::result::Result<Self, ()> {
        if is_abbrev(s, "customer") {
            Ok(Self::Customer)
        } else if is_abbrev(s, "vendor") || is_abbrev(s, "nvidia") {
            Ok(Self::Vendor)
        } else {
            Err(())
        }
    }
}

/// A MAC address in conventional (network) byte order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// The address bytes
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            a[0], a[1], a[2], a[3], a[4], a[5]
        )
    }
}

/// Error returned when parsing a MAC address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseMacError;

impl fmt::Display for ParseMacError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not parse MAC address")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseMacError {}

impl FromStr for MacAddress {
    type Err = ParseMacError;

    /// Accepts six hex pairs, each optionally followed by `:` or `-`
    fn from_str(s: &str) -> core::result::Result<Self, ParseMacError> {
        let mut bytes = s.as_bytes();
        let mut octets = [0u8; 6];
        for octet in octets.iter_mut() {
            let (hi, lo) = match bytes {
                [hi, lo, ..] => (*hi as char, *lo as char),
                _ => return Err(ParseMacError),
            };
            let (hi, lo) = match (hi.to_digit(16), lo.to_digit(16)) {
                (Some(hi), Some(lo)) => (hi as u8, lo as u8),
                _ => return Err(ParseMacError),
            };
            *octet = (hi << 4) | lo;
            bytes = &bytes[2..];
            if let [b':' | b'-', rest @ ..] = bytes {
                bytes = rest;
            }
        }
        if bytes.is_empty() {
            Ok(Self(octets))
        } else {
            Err(ParseMacError)
        }
    }
}

/// The seven MAC address fields of the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacSlot {
    /// Factory default wifi
    FactoryWifi,
    /// Factory default bluetooth
    FactoryBluetooth,
    /// Factory default alternate wifi
    FactoryWifiAlt,
    /// Factory default ethernet
    FactoryEthernet,
    /// Vendor wifi
    VendorWifi,
    /// Vendor bluetooth
    VendorBluetooth,
    /// Vendor ethernet
    VendorEthernet,
}

impl MacSlot {
    /// All slots in record order
    pub const ALL: [MacSlot; 7] = [
        Self::FactoryWifi,
        Self::FactoryBluetooth,
        Self::FactoryWifiAlt,
        Self::FactoryEthernet,
        Self::VendorWifi,
        Self::VendorBluetooth,
        Self::VendorEthernet,
    ];

    /// Position of the raw field
    pub fn span(&self) -> Span {
        match self {
            Self::FactoryWifi => fields::FACTORY_WIFI_MAC,
            Self::FactoryBluetooth => fields::FACTORY_BT_MAC,
            Self::FactoryWifiAlt => fields::FACTORY_WIFI_ALT_MAC,
            Self::FactoryEthernet => fields::FACTORY_ETHER_MAC,
            Self::VendorWifi => fields::VENDOR_WIFI_MAC,
            Self::VendorBluetooth => fields::VENDOR_BT_MAC,
            Self::VendorEthernet => fields::VENDOR_ETHER_MAC,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// A named, user-addressable field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    /// Part number (with its kind)
    PartNumber,
    /// Asset id
    AssetId,
    /// One of the MAC addresses
    Mac(MacSlot),
}

impl FieldId {
    /// All fields in display order
    pub const ALL: [FieldId; 9] = [
        Self::PartNumber,
        Self::Mac(MacSlot::FactoryWifi),
        Self::Mac(MacSlot::FactoryBluetooth),
        Self::Mac(MacSlot::FactoryWifiAlt),
        Self::Mac(MacSlot::FactoryEthernet),
        Self::AssetId,
        Self::Mac(MacSlot::VendorWifi),
        Self::Mac(MacSlot::VendorBluetooth),
        Self::Mac(MacSlot::VendorEthernet),
    ];

    /// Name used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Self::PartNumber => "partnumber",
            Self::AssetId => "asset-id",
            Self::Mac(MacSlot::FactoryWifi) => "factory-default-wifi-mac",
            Self::Mac(MacSlot::FactoryBluetooth) => "factory-default-bt-mac",
            Self::Mac(MacSlot::FactoryWifiAlt) => "factory-default-wifi-alt-mac",
            Self::Mac(MacSlot::FactoryEthernet) => "factory-default-ether-mac",
            Self::Mac(MacSlot::VendorWifi) => "vendor-wifi-mac",
            Self::Mac(MacSlot::VendorBluetooth) => "vendor-bt-mac",
            Self::Mac(MacSlot::VendorEthernet) => "vendor-ether-mac",
        }
    }

    /// Look a field up by name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// Whether the field only exists on module devices
    pub fn is_module_only(&self) -> bool {
        matches!(self, Self::Mac(_))
    }

    /// Whether the field exists on devices of `class`
    pub fn supported_by(&self, class: DeviceClass) -> bool {
        class.has_module_fields() || !self.is_module_only()
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bounded byte string decoded from a fixed-width field
///
/// EEPROM strings are nominally ASCII but nothing guarantees it, so the
/// bytes are kept as-is and only escaped for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldString<const N: usize> {
    bytes: Vec<u8, N>,
}

impl<const N: usize> FieldString<N> {
    /// Empty string
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Copy `bytes`, or `None` if they exceed the capacity
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        Vec::from_slice(bytes).ok().map(|bytes| Self { bytes })
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The string, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.bytes).ok()
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the string is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Maximum length in bytes
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> fmt::Display for FieldString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.bytes.iter() {
            if b == b' ' || b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

/// Decoded contents of an identification EEPROM
///
/// Module-only fields (the MAC addresses) are carried for every device
/// class but only written to module devices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogicalRecord {
    partnumber_kind: PartNumberKind,
    partnumber: FieldString<PARTNUMBER_LEN>,
    asset_id: FieldString<ASSET_ID_LEN>,
    macs: [MacAddress; 7],
}

impl LogicalRecord {
    /// Empty record: vendor kind, empty strings, zero MACs
    pub fn new() -> Self {
        Self::default()
    }

    /// Kind of the part number
    pub fn partnumber_kind(&self) -> PartNumberKind {
        self.partnumber_kind
    }

    /// Part number
    pub fn partnumber(&self) -> &FieldString<PARTNUMBER_LEN> {
        &self.partnumber
    }

    /// Asset id
    pub fn asset_id(&self) -> &FieldString<ASSET_ID_LEN> {
        &self.asset_id
    }

    /// MAC address in `slot`
    pub fn mac(&self, slot: MacSlot) -> MacAddress {
        self.macs[slot.index()]
    }

    /// Set the part number and its kind
    ///
    /// Customer part numbers lose one byte to the marker, so they hold at
    /// most 21 bytes. On error the record is unchanged.
    pub fn set_partnumber(&mut self, kind: PartNumberKind, value: &str) -> Result<()> {
        self.set_partnumber_bytes(kind, value.as_bytes())
    }

    /// Byte-level variant of [`set_partnumber`](Self::set_partnumber)
    ///
    /// A vendor value may not start with the customer marker byte.
    pub fn set_partnumber_bytes(&mut self, kind: PartNumberKind, value: &[u8]) -> Result<()> {
        if kind == PartNumberKind::Vendor && value.first() == Some(&CUSTOMER_PARTNUMBER_MARKER) {
            return Err(Error::ReservedPartNumberByte);
        }
        let capacity = kind.capacity();
        if value.len() > capacity {
            return Err(Error::FieldOverflow {
                field: FieldId::PartNumber,
                len: value.len(),
                capacity,
            });
        }
        // capacity never exceeds PARTNUMBER_LEN
        if let Some(partnumber) = FieldString::from_bytes(value) {
            self.partnumber = partnumber;
            self.partnumber_kind = kind;
        }
        Ok(())
    }

    /// Set the asset id; on error the record is unchanged
    pub fn set_asset_id(&mut self, value: &str) -> Result<()> {
        self.set_asset_id_bytes(value.as_bytes())
    }

    /// Byte-level variant of [`set_asset_id`](Self::set_asset_id)
    pub fn set_asset_id_bytes(&mut self, value: &[u8]) -> Result<()> {
        self.asset_id = FieldString::from_bytes(value).ok_or(Error::FieldOverflow {
            field: FieldId::AssetId,
            len: value.len(),
            capacity: ASSET_ID_LEN,
        })?;
        Ok(())
    }

    /// Set the MAC address in `slot`
    pub fn set_mac(&mut self, slot: MacSlot, mac: MacAddress) {
        self.macs[slot.index()] = mac;
    }

    /// Displayable value of a field
    pub fn display_field(&self, field: FieldId) -> FieldDisplay<'_> {
        FieldDisplay {
            record: self,
            field,
        }
    }
}

/// Text form of a single field, see [`LogicalRecord::display_field`]
pub struct FieldDisplay<'a> {
    record: &'a LogicalRecord,
    field: FieldId,
}

impl fmt::Display for FieldDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            FieldId::PartNumber => write!(f, "{}", self.record.partnumber),
            FieldId::AssetId => write!(f, "{}", self.record.asset_id),
            FieldId::Mac(slot) => write!(f, "{}", self.record.mac(slot)),
        }
    }
}
