//! Error types for the DAT crate.

use thiserror::Error;

/// Errors that can occur when working with DAT archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] tyria_common::Error),

    /// The header, MFT or file-id table is malformed.
    #[error("corrupt archive header: {0}")]
    CorruptHeader(String),

    /// A single record cannot be read back.
    #[error("corrupt record {index}: {reason}")]
    CorruptRecord { index: usize, reason: String },

    /// No record is registered under this file id.
    #[error("entry not found: {0}")]
    EntryNotFound(u32),

    /// Record index beyond the MFT.
    #[error("record index {0} out of range")]
    RecordOutOfRange(usize),
}

impl Error {
    /// Whether this error only concerns one record and the archive remains usable.
    pub fn is_record_corrupt(&self) -> bool {
        matches!(self, Error::CorruptRecord { .. })
    }

    /// Whether the archive file itself does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Result type for DAT operations.
pub type Result<T> = std::result::Result<T, Error>;
