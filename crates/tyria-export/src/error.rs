//! Error types for extraction.

use std::path::PathBuf;

use thiserror::Error;

use crate::report::EntryFailure;

/// Errors from a single [`crate::Exporter`].
///
/// Either one makes the pipeline fall back to writing the raw bytes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// The exporter does not handle this payload.
    #[error("not handled by this exporter")]
    NotThisFormat,

    /// The payload claims the format but cannot be decoded.
    #[error("decode failed: {0}")]
    Decode(String),
}

/// Errors that abort an extraction run.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A worker could not open the archive.
    #[error("cannot open archive {}: {source}", path.display())]
    ArchiveOpen {
        path: PathBuf,
        #[source]
        source: tyria_dat::Error,
    },

    /// An output directory could not be created.
    #[error("cannot create directory {}: {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An entry failed under the fail-fast policy.
    #[error("{0}")]
    Entry(EntryFailure),
}

/// Result type for extraction.
pub type Result<T> = std::result::Result<T, ExtractError>;
