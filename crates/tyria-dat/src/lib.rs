//! DAT archive reader for game asset archives.
//!
//! A DAT archive is a single container holding tens of thousands of assets
//! addressed by numeric file ids. The container has:
//!
//! - A 40-byte header pointing at the master file table (MFT)
//! - The MFT: fixed 24-byte records describing where each payload lives,
//!   how it is compressed and its CRC32C
//! - A file-id table mapping numeric ids onto MFT records
//!
//! Several ids may point at the same record; the smallest one is the record's
//! *base id*. Payloads are stored, DEFLATE or Zstandard compressed.
//!
//! # Example
//!
//! ```no_run
//! use tyria_dat::{identify, DatArchive};
//!
//! let archive = DatArchive::open("Gw2.dat")?;
//!
//! for entry in archive.iter().filter(|e| e.is_content()) {
//!     if let Some(base_id) = entry.base_id() {
//!         let data = archive.read_entry(base_id)?;
//!         println!("{}: {}", base_id, identify(&data));
//!     }
//! }
//! # Ok::<(), tyria_dat::Error>(())
//! ```

mod archive;
mod builder;
mod codec;
mod entry;
mod error;
mod file_type;
mod identify;
pub mod format;

pub use archive::{modified_timestamp, DatArchive};
pub use builder::DatBuilder;
pub use entry::DatEntry;
pub use error::{Error, Result};
pub use file_type::{FileKind, FileType};
pub use format::Compression;
pub use identify::{identify, identify_prefix, refine, SCAN_PEEK_LEN};
