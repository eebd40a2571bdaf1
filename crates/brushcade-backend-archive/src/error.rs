//! Error types for archive encoding and decoding.

use brushcade_spec::BackendError;
use thiserror::Error;

/// Errors from building, encoding or decoding an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("object 0 must be the null sentinel")]
    MissingNullSentinel,

    #[error("null sentinel found at index {0}; only index 0 may be null")]
    MisplacedNull(usize),

    #[error("object {from} references index {to}, but the table has {len} objects")]
    DanglingReference { from: usize, to: u64, len: usize },

    #[error("root reference {root} is outside the table of {len} objects")]
    InvalidRoot { root: u64, len: usize },

    #[error("reserved object slot {0} was never filled")]
    UnfilledSlot(usize),

    #[error("object slot {0} is not an open reservation")]
    NotReserved(usize),

    #[error("object {from} has a $class reference to {to}, which is not a class descriptor")]
    InvalidClassReference { from: usize, to: u64 },

    #[error("class chain of '{0}' must start with the class and end at NSObject")]
    InvalidClassChain(String),

    #[error("not a binary property list (bad magic)")]
    BadMagic,

    #[error("property list is truncated: {0}")]
    Truncated(String),

    #[error("offset {offset} of object {index} is out of range")]
    OffsetOutOfRange { index: usize, offset: u64 },

    #[error("unsupported property-list marker 0x{0:02x}")]
    UnsupportedMarker(u8),

    #[error("invalid string data in object {0}")]
    InvalidString(usize),

    #[error("object {0} is part of a reference cycle")]
    ReferenceCycle(usize),

    #[error("not a keyed archive: {0}")]
    InvalidEnvelope(String),

    #[error("brush schema mismatch: {0}")]
    SchemaMismatch(String),
}

impl BackendError for ArchiveError {
    fn code(&self) -> &'static str {
        match self {
            ArchiveError::Io(_) => "ARCHIVE_001",
            ArchiveError::MissingNullSentinel | ArchiveError::MisplacedNull(_) => "ARCHIVE_002",
            ArchiveError::DanglingReference { .. } | ArchiveError::InvalidRoot { .. } => {
                "ARCHIVE_003"
            }
            ArchiveError::UnfilledSlot(_) | ArchiveError::NotReserved(_) => "ARCHIVE_004",
            ArchiveError::InvalidClassReference { .. } | ArchiveError::InvalidClassChain(_) => {
                "ARCHIVE_005"
            }
            ArchiveError::BadMagic
            | ArchiveError::Truncated(_)
            | ArchiveError::OffsetOutOfRange { .. }
            | ArchiveError::UnsupportedMarker(_)
            | ArchiveError::InvalidString(_)
            | ArchiveError::ReferenceCycle(_) => "ARCHIVE_006",
            ArchiveError::InvalidEnvelope(_) => "ARCHIVE_007",
            ArchiveError::SchemaMismatch(_) => "ARCHIVE_008",
        }
    }

    fn category(&self) -> &'static str {
        "archive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_messages() {
        let err = ArchiveError::DanglingReference { from: 1, to: 9, len: 5 };
        assert_eq!(err.code(), "ARCHIVE_003");
        assert_eq!(err.category(), "archive");
        assert_eq!(
            err.to_string(),
            "object 1 references index 9, but the table has 5 objects"
        );
        assert_eq!(ArchiveError::UnsupportedMarker(0x3a).to_string(), "unsupported property-list marker 0x3a");
    }
}
