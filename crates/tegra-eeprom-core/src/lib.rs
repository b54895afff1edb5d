//! tegra-eeprom-core - Codec for Tegra identification EEPROMs
//!
//! Jetson modules and carrier boards carry a 256-byte identification EEPROM
//! holding the part number, an asset id and the factory MAC addresses. This
//! crate translates between that on-device record and a logical
//! [`LogicalRecord`], and mediates reads and writes through any transport
//! implementing the `embedded_io` traits. It is `no_std` compatible.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable heap allocation
//!
//! # Example
//!
//! ```ignore
//! use tegra_eeprom_core::{DeviceClass, EepromHandle};
//!
//! let mut handle = EepromHandle::open(transport, DeviceClass::Module, false)?;
//! let mut record = handle.read()?;
//! record.set_asset_id("A1234")?;
//! handle.write(&record)?;
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod checksum;
pub mod codec;
pub mod error;
pub mod field;
pub mod handle;
pub mod layout;
pub mod record;
pub mod session;
pub mod validate;

pub use codec::{decode, encode_and_prepare};
pub use error::{Error, Result, TransportFailure, TransportOp, ValidationFailure};
pub use handle::EepromHandle;
pub use layout::RawRecord;
pub use record::{
    DeviceClass, FieldId, FieldString, LogicalRecord, MacAddress, MacSlot, PartNumberKind,
};
pub use session::Session;
pub use validate::{is_valid, validate};
