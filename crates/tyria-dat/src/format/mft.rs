//! MFT records and the file-id table.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// One MFT record.
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct MftRecord {
    /// Absolute offset of the stored payload.
    pub offset: u64,
    /// Stored (possibly compressed) payload size.
    pub size: u32,
    /// Compression method code.
    pub compression: u16,
    /// Entry flags, see [`super::FLAG_IN_USE`].
    pub flags: u16,
    /// Writer generation counter. Informational.
    pub counter: u32,
    /// CRC32C of the stored payload, `0` when unchecked.
    pub crc: u32,
}

/// One (file id, record) pair of the file-id table.
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct FileIdPair {
    /// Numeric file id.
    pub file_id: u32,
    /// MFT record index the id resolves to.
    pub record: u32,
}

impl FileIdPair {
    /// Zeroed pairs pad the table.
    #[inline]
    pub fn is_padding(&self) -> bool {
        self.file_id == 0 || self.record == 0
    }
}
