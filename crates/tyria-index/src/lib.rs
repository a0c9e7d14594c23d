//! Hierarchical asset index for DAT archives.
//!
//! The [`Index`] is an arena of categories and entries addressed by
//! [`CategoryId`] / [`EntryId`] handles. A [`Scanner`] builds it one MFT record
//! at a time, the [`persist`] module caches it on disk keyed by the archive's
//! modification time.
//!
//! # Example
//!
//! ```no_run
//! use tyria_common::CancelFlag;
//! use tyria_index::Scanner;
//!
//! let mut scanner = Scanner::new("Gw2.dat");
//! scanner.init()?;
//! scanner.run(&CancelFlag::new())?;
//! let index = scanner.into_index();
//!
//! for &id in &index.flatten(index.root()) {
//!     let entry = index.entry(id);
//!     println!("{} {}", index.category_path(entry.category()).join("/"), entry.name());
//! }
//! # Ok::<(), tyria_index::ScanError>(())
//! ```

mod categories;
mod error;
mod model;
mod path;
pub mod persist;
pub mod scan;

pub use categories::category_for;
pub use error::{IndexError, PersistError, Result, ScanError};
pub use model::{compare_names, Category, CategoryId, EntryId, Index, IndexEntry};
pub use path::{is_path_component, CategoryPath};
pub use persist::CacheLookup;
pub use scan::{ScanProgress, ScanState, ScanStats, Scanner};
