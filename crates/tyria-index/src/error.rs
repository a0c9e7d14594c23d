//! Error types for the index crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from mutating an [`crate::Index`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    /// An entry with this base id is already indexed.
    #[error("duplicate entry: base id {0} is already indexed")]
    DuplicateEntry(u32),
}

/// Errors from loading a persisted index.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Not an index file, or one written by an incompatible version.
    #[error("format mismatch: {0}")]
    FormatMismatch(String),

    /// The file ended early.
    #[error("index file is truncated")]
    Truncated,

    /// The file is structurally invalid.
    #[error("corrupt index file: {0}")]
    Corrupt(String),

    /// A name does not fit the u32 length prefix.
    #[error("name of {0} bytes is too long to store")]
    NameTooLong(usize),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from scanning an archive.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The archive could not be opened.
    #[error("cannot open archive {}: {source}", path.display())]
    CannotOpenArchive {
        path: PathBuf,
        #[source]
        source: tyria_dat::Error,
    },

    /// Reading a record failed in a way that makes the archive unusable.
    #[error("failed to read record {index}: {source}")]
    Read {
        index: usize,
        #[source]
        source: tyria_dat::Error,
    },

    /// `perform` was called before `init`.
    #[error("scanner has not been initialized")]
    NotInitialized,

    /// The scan was cancelled.
    #[error("scan cancelled")]
    Cancelled,
}

/// Result type for index mutations.
pub type Result<T> = std::result::Result<T, IndexError>;
