//! Error types for tegra-eeprom-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate. Every failure is a distinct variant so callers can
//! tell a blank device from a broken bus.

use core::fmt;

use embedded_io::ErrorKind;

use crate::layout::CUSTOMER_PARTNUMBER_MARKER;
use crate::record::FieldId;

/// Byte-level transport operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportOp {
    /// Reading the record
    Read,
    /// Writing the record
    Write,
    /// Rewinding to the start of the device
    Seek,
    /// Flushing written data
    Flush,
}

impl fmt::Display for TransportOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
            Self::Seek => write!(f, "seek"),
            Self::Flush => write!(f, "flush"),
        }
    }
}

/// Details about a transport failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    /// The transport reported an error
    Io {
        /// Operation in progress
        op: TransportOp,
        /// Error kind reported by the transport
        kind: ErrorKind,
        /// Bytes transferred before the failure
        offset: usize,
    },
    /// The device ran out of data before a full record was read
    UnexpectedEof {
        /// Bytes read before end of data
        offset: usize,
    },
    /// The device stopped accepting data before the full record was written
    WriteZero {
        /// Bytes written before the device stalled
        offset: usize,
    },
}

/// Reason a raw record failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    /// Stored checksum does not match the recomputed one
    ChecksumMismatch {
        /// Checksum byte found in the record
        stored: u8,
        /// Checksum computed over the first 255 bytes
        computed: u8,
    },
    /// Layout version is not the one we understand
    UnsupportedVersion(u16),
    /// Config block signature missing (module devices only)
    ConfigBlockSignature([u8; 4]),
    /// MAC format tag missing (module devices only)
    MacFormatTag([u8; 2]),
    /// MAC format version not recognized (module devices only)
    MacFormatVersion(u16),
}

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Byte I/O with the device failed
    Transport(TransportFailure),
    /// Raw record is not well-formed for the device class
    Validation(ValidationFailure),
    /// Write attempted on a read-only handle
    ReadOnly,
    /// Value does not fit in its raw field
    FieldOverflow {
        /// Field being set
        field: FieldId,
        /// Length of the rejected value in bytes
        len: usize,
        /// Capacity of the field in bytes
        capacity: usize,
    },
    /// Vendor part number starting with the customer marker byte
    ReservedPartNumberByte,
    /// Field is only present on module devices
    FieldNotSupported(FieldId),
    /// Not enough arguments to set the field
    MissingValue(FieldId),
    /// Text could not be parsed as a value for the field
    InvalidValue(FieldId),
    /// No valid contents were read and nothing has been set
    NoData,
    /// Verification requested while edits are still pending
    PendingChanges,
    /// Commit requested with nothing to write
    NoChanges,
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { op, kind, offset } => {
                write!(f, "{} failed at offset {}: {:?}", op, offset, kind)
            }
            Self::UnexpectedEof { offset } => {
                write!(f, "unexpected end of data after {} bytes", offset)
            }
            Self::WriteZero { offset } => {
                write!(f, "device accepted no data after {} bytes", offset)
            }
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChecksumMismatch { stored, computed } => write!(
                f,
                "checksum mismatch: stored 0x{:02X}, computed 0x{:02X}",
                stored, computed
            ),
            Self::UnsupportedVersion(v) => write!(f, "unsupported layout version {}", v),
            Self::ConfigBlockSignature(sig) => {
                write!(f, "config block signature {:02X?} not recognized", sig)
            }
            Self::MacFormatTag(tag) => write!(f, "MAC format tag {:02X?} not recognized", tag),
            Self::MacFormatVersion(v) => write!(f, "unsupported MAC format version {}", v),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(failure) => write!(f, "transport error: {}", failure),
            Self::Validation(failure) => write!(f, "EEPROM contents not valid: {}", failure),
            Self::ReadOnly => write!(f, "EEPROM is read-only"),
            Self::FieldOverflow {
                field,
                len,
                capacity,
            } => write!(
                f,
                "value for '{}' is {} bytes, longer than field length ({})",
                field, len, capacity
            ),
            Self::ReservedPartNumberByte => write!(
                f,
                "vendor partnumber cannot start with byte 0x{:02X}",
                CUSTOMER_PARTNUMBER_MARKER
            ),
            Self::FieldNotSupported(field) => {
                write!(f, "field '{}' not supported for this module type", field)
            }
            Self::MissingValue(FieldId::PartNumber) => write!(
                f,
                "missing required arguments: partnumber {{vendor|customer}} <value>"
            ),
            Self::MissingValue(field) => write!(f, "missing value for '{}'", field),
            Self::InvalidValue(FieldId::PartNumber) => {
                write!(f, "partnumber type must be either 'vendor' or 'customer'")
            }
            Self::InvalidValue(field) => write!(f, "could not parse value for '{}'", field),
            Self::NoData => write!(f, "no valid EEPROM contents"),
            Self::PendingChanges => write!(f, "pending changes, write before verifying"),
            Self::NoChanges => write!(f, "no updates to write"),
        }
    }
}

impl From<ValidationFailure> for Error {
    fn from(failure: ValidationFailure) -> Self {
        Self::Validation(failure)
    }
}

impl From<TransportFailure> for Error {
    fn from(failure: TransportFailure) -> Self {
        Self::Transport(failure)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
