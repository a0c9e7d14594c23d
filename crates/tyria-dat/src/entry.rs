//! DAT archive entry.

use crate::format::{Compression, FIRST_CONTENT_RECORD, FLAG_IN_USE};

/// An entry (MFT record) within a DAT archive.
///
/// This contains metadata about the payload, not the payload itself.
/// Use [`crate::DatArchive::read_record`] or [`crate::DatArchive::read_entry`]
/// to get the decompressed bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatEntry {
    index: usize,
    offset: u64,
    size: u32,
    compression: u16,
    flags: u16,
    crc: u32,
    base_id: Option<u32>,
}

impl DatEntry {
    pub(crate) fn new(index: usize, offset: u64, size: u32, compression: u16, flags: u16, crc: u32) -> Self {
        Self {
            index,
            offset,
            size,
            compression,
            flags,
            crc,
            base_id: None,
        }
    }

    /// Lower the base id to `file_id` if it is smaller than the current one.
    pub(crate) fn note_file_id(&mut self, file_id: u32) {
        self.base_id = Some(self.base_id.map_or(file_id, |id| id.min(file_id)));
    }

    /// MFT record index.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Absolute offset of the stored payload.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Stored (possibly compressed) size in bytes.
    #[inline]
    pub fn stored_size(&self) -> u32 {
        self.size
    }

    /// Raw compression code as found in the MFT.
    #[inline]
    pub fn compression_code(&self) -> u16 {
        self.compression
    }

    /// Compression method, if known.
    #[inline]
    pub fn compression(&self) -> Option<Compression> {
        Compression::try_from(self.compression).ok()
    }

    /// CRC32C of the stored payload, `0` when unchecked.
    #[inline]
    pub fn crc(&self) -> u32 {
        self.crc
    }

    /// Smallest file id resolving to this record.
    #[inline]
    pub fn base_id(&self) -> Option<u32> {
        self.base_id
    }

    /// Whether the record holds live data.
    #[inline]
    pub fn is_in_use(&self) -> bool {
        self.flags & FLAG_IN_USE != 0
    }

    /// Whether this is an asset record: past the reserved range, in use and
    /// reachable through at least one file id.
    #[inline]
    pub fn is_content(&self) -> bool {
        self.index >= FIRST_CONTENT_RECORD && self.is_in_use() && self.base_id.is_some()
    }
}
