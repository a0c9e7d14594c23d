//! On-disk cache of an [`Index`].
//!
//! Layout (little-endian):
//!
//! ```text
//! "TIDX" | u16 version | u16 reserved | u64 archive timestamp
//! u32 category count, then per category: u32 parent (u32::MAX for the root), name
//! u32 entry count, then per entry: u32 base id, u8 file type, u32 category, name
//! u32 CRC32C of everything above
//! ```
//!
//! Names are a u32 byte length followed by UTF-8. Categories are written in
//! arena order and entries in insertion order, so loading rebuilds the exact
//! same arena and the same index always serializes to the same bytes.

use std::io::{ErrorKind, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use tyria_common::{crc, BinaryReader};
use tyria_dat::FileType;

use crate::model::{CategoryId, Index};
use crate::path::is_path_component;
use crate::PersistError;

/// File identifier.
pub const MAGIC: [u8; 4] = *b"TIDX";

/// Current format version.
pub const VERSION: u16 = 2;

/// Default cache file name.
pub const DEFAULT_FILE_NAME: &str = "tyria.idx";

const NO_PARENT: u32 = u32::MAX;

/// Result of looking up a cached index.
#[derive(Debug)]
pub enum CacheLookup {
    /// The cache matches the archive.
    Fresh(Index),
    /// The cache was written for another version of the archive.
    Stale { cached: u64, current: u64 },
    /// No cache file exists.
    Missing,
    /// The cache file exists but cannot be used.
    Unreadable(PersistError),
}

/// Serialize an index.
pub fn save(index: &Index) -> Result<Vec<u8>, PersistError> {
    let mut out = Vec::with_capacity(32 + index.entry_count() * 24);
    write_body(index, &mut out)?;
    let checksum = crc::hash_bytes(&out);
    out.write_u32::<LittleEndian>(checksum)?;
    Ok(out)
}

fn write_body(index: &Index, out: &mut Vec<u8>) -> Result<(), PersistError> {
    out.write_all(&MAGIC)?;
    out.write_u16::<LittleEndian>(VERSION)?;
    out.write_u16::<LittleEndian>(0)?;
    out.write_u64::<LittleEndian>(index.dat_timestamp())?;

    out.write_u32::<LittleEndian>(index.category_count() as u32)?;
    for (_, category) in index.categories() {
        let parent = category.parent().map_or(NO_PARENT, |p| p.index() as u32);
        out.write_u32::<LittleEndian>(parent)?;
        write_name(out, category.name())?;
    }

    out.write_u32::<LittleEndian>(index.entry_count() as u32)?;
    for (_, entry) in index.entries() {
        out.write_u32::<LittleEndian>(entry.base_id())?;
        out.write_u8(entry.file_type().code())?;
        out.write_u32::<LittleEndian>(entry.category().index() as u32)?;
        write_name(out, entry.name())?;
    }
    Ok(())
}

fn write_name(out: &mut Vec<u8>, name: &str) -> Result<(), PersistError> {
    let len = u32::try_from(name.len()).map_err(|_| PersistError::NameTooLong(name.len()))?;
    out.write_u32::<LittleEndian>(len)?;
    out.write_all(name.as_bytes())?;
    Ok(())
}

/// Deserialize an index written by [`save`].
pub fn load(data: &[u8]) -> Result<Index, PersistError> {
    let mut reader = BinaryReader::new(data);

    reader.expect_magic(&MAGIC).map_err(|e| match e {
        tyria_common::Error::UnexpectedEof { .. } => PersistError::Truncated,
        other => PersistError::FormatMismatch(other.to_string()),
    })?;
    let version = reader.read_u16().map_err(|_| PersistError::Truncated)?;
    if version != VERSION {
        return Err(PersistError::FormatMismatch(format!(
            "unsupported version {} (expected {})",
            version, VERSION
        )));
    }

    let body = read_body(&mut reader)?;
    let body_len = reader.position();
    let stored = reader.read_u32().map_err(|_| PersistError::Truncated)?;
    if !reader.is_empty() {
        return Err(PersistError::Corrupt(format!(
            "{} trailing bytes",
            reader.remaining()
        )));
    }
    let actual = crc::hash_bytes(&data[..body_len]);
    if actual != stored {
        return Err(PersistError::Corrupt(format!(
            "checksum mismatch: stored {:08x}, computed {:08x}",
            stored, actual
        )));
    }

    body.into_index()
}

struct RawCategory {
    parent: u32,
    name: String,
}

struct RawEntry {
    base_id: u32,
    file_type: u8,
    category: u32,
    name: String,
}

struct RawBody {
    timestamp: u64,
    categories: Vec<RawCategory>,
    entries: Vec<RawEntry>,
}

fn read_body(reader: &mut BinaryReader<'_>) -> Result<RawBody, PersistError> {
    let read_err = |e: tyria_common::Error| match e {
        tyria_common::Error::UnexpectedEof { .. } => PersistError::Truncated,
        other => PersistError::Corrupt(other.to_string()),
    };

    let _reserved = reader.read_u16().map_err(read_err)?;
    let timestamp = reader.read_u64().map_err(read_err)?;

    let count = reader.read_u32().map_err(read_err)? as usize;
    let mut categories = Vec::with_capacity(count.min(reader.remaining() / 8));
    for _ in 0..count {
        let parent = reader.read_u32().map_err(read_err)?;
        let name = reader.read_prefixed_str().map_err(read_err)?.to_string();
        categories.push(RawCategory { parent, name });
    }

    let count = reader.read_u32().map_err(read_err)? as usize;
    let mut entries = Vec::with_capacity(count.min(reader.remaining() / 13));
    for _ in 0..count {
        let base_id = reader.read_u32().map_err(read_err)?;
        let file_type = reader.read_u8().map_err(read_err)?;
        let category = reader.read_u32().map_err(read_err)?;
        let name = reader.read_prefixed_str().map_err(read_err)?.to_string();
        entries.push(RawEntry {
            base_id,
            file_type,
            category,
            name,
        });
    }

    Ok(RawBody {
        timestamp,
        categories,
        entries,
    })
}

impl RawBody {
    fn into_index(self) -> Result<Index, PersistError> {
        let mut index = Index::new();
        index.set_dat_timestamp(self.timestamp);

        let mut categories = self.categories.into_iter();
        match categories.next() {
            Some(root) if root.parent == NO_PARENT => {}
            _ => return Err(PersistError::Corrupt("missing root category".into())),
        }

        for (i, raw) in categories.enumerate() {
            let position = i + 1;
            if raw.parent as usize >= position {
                return Err(PersistError::Corrupt(format!(
                    "category {} has dangling parent {}",
                    position, raw.parent
                )));
            }
            if !is_path_component(&raw.name) {
                return Err(PersistError::Corrupt(format!(
                    "invalid category name {:?}",
                    raw.name
                )));
            }
            let parent = CategoryId(raw.parent);
            if index.child(parent, &raw.name).is_some() {
                return Err(PersistError::Corrupt(format!(
                    "duplicate category {:?}",
                    raw.name
                )));
            }
            index.push_category(parent, &raw.name);
        }

        for raw in self.entries {
            let file_type = FileType::from_code(raw.file_type).ok_or_else(|| {
                PersistError::Corrupt(format!("unknown file type code {}", raw.file_type))
            })?;
            if !is_path_component(&raw.name) {
                return Err(PersistError::Corrupt(format!(
                    "entry {} has invalid name {:?}",
                    raw.base_id, raw.name
                )));
            }
            if raw.category as usize >= index.category_count() {
                return Err(PersistError::Corrupt(format!(
                    "entry {} has dangling category {}",
                    raw.base_id, raw.category
                )));
            }
            index
                .insert_entry(raw.base_id, &raw.name, file_type, CategoryId(raw.category))
                .map_err(|e| PersistError::Corrupt(e.to_string()))?;
        }

        Ok(index)
    }
}

/// Write an index to `path` atomically.
///
/// The data goes to a temporary file in the same directory which is then
/// renamed over `path`, so readers never observe a partial file.
pub fn save_to<P: AsRef<Path>>(index: &Index, path: P) -> Result<(), PersistError> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(&save(index)?)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| PersistError::Io(e.error))?;

    tracing::debug!(
        path = %path.display(),
        entries = index.entry_count(),
        "saved index cache"
    );
    Ok(())
}

/// Read an index from `path`.
pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Index, PersistError> {
    load(&std::fs::read(path)?)
}

/// Load the cache at `path` if it was written for an archive modified at
/// `archive_timestamp`.
pub fn load_cached<P: AsRef<Path>>(path: P, archive_timestamp: u64) -> CacheLookup {
    let path = path.as_ref();
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return CacheLookup::Missing,
        Err(e) => return CacheLookup::Unreadable(e.into()),
    };

    match load(&data) {
        Ok(index) if index.dat_timestamp() == archive_timestamp => CacheLookup::Fresh(index),
        Ok(index) => CacheLookup::Stale {
            cached: index.dat_timestamp(),
            current: archive_timestamp,
        },
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable index cache");
            CacheLookup::Unreadable(e)
        }
    }
}
