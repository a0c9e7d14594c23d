//! Tyria - game asset archive indexing and extraction library.
//!
//! This crate provides a unified interface to the Tyria library ecosystem.
//!
//! # Crates
//!
//! - [`tyria_common`] - Common utilities (binary reading, CRC32C, half floats)
//! - [`tyria_dat`] - DAT archive reading and file type identification
//! - [`tyria_index`] - Category index, index cache and archive scanner
//! - [`tyria_export`] - Concurrent extraction with format exporters
//!
//! # Example
//!
//! ```no_run
//! use tyria::prelude::*;
//!
//! let mut scanner = Scanner::new("Gw2.dat");
//! scanner.run(&CancelFlag::new())?;
//! let index = scanner.into_index();
//!
//! let registry = ExporterRegistry::with_defaults();
//! let report = Extractor::new(&index, "Gw2.dat", "out", &registry).run(index.root())?;
//! println!("{} of {} written", report.written(), report.total);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use tyria_common as common;
pub use tyria_dat as dat;
pub use tyria_export as export;
pub use tyria_index as index;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use tyria_common::{crc, BinaryReader, CancelFlag, Half};
    pub use tyria_dat::{identify, refine, Compression, DatArchive, DatBuilder, FileKind, FileType};
    pub use tyria_export::{
        ExportError, Exporter, ExporterRegistry, ExtractError, ExtractOptions, ExtractReport,
        Extractor, FailurePolicy,
    };
    pub use tyria_index::persist::{self, CacheLookup};
    pub use tyria_index::{CategoryId, CategoryPath, EntryId, Index, ScanState, Scanner};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
