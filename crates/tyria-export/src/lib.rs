//! Concurrent extraction of indexed assets.
//!
//! An [`Extractor`] walks a category subtree of an [`tyria_index::Index`] with
//! a fixed pool of worker threads. Every entry is read from the archive,
//! converted by the [`Exporter`] registered for its type and written under
//! the output root mirroring the category tree. Entries without a working
//! exporter are written unmodified with a `.raw` extension.

mod dirs;
mod error;
mod exporter;
pub mod exporters;
mod pipeline;
mod report;

pub use dirs::DirectoryCache;
pub use error::{ExportError, ExtractError, Result};
pub use exporter::{Exporter, ExporterRegistry};
pub use pipeline::{default_workers, ExtractOptions, Extractor, FailurePolicy};
pub use report::{EntryFailure, ExtractProgress, ExtractReport};

/// Extension used for entries written without conversion.
pub const RAW_EXTENSION: &str = "raw";
