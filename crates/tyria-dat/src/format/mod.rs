//! On-disk structures of the DAT container.
//!
//! All integers are little-endian, all structs are packed.

mod header;
mod mft;

pub use header::{DatHeader, MftHeader};
pub use mft::{FileIdPair, MftRecord};

/// Size in bytes of one MFT record (and of the MFT header).
pub const MFT_RECORD_SIZE: usize = 24;

/// MFT record describing the archive header.
pub const HEADER_RECORD: usize = 1;

/// MFT record holding the file-id table.
pub const FILE_ID_TABLE_RECORD: usize = 2;

/// MFT record describing the MFT itself.
pub const MFT_SELF_RECORD: usize = 3;

/// First record that may hold an asset. Everything below is reserved.
pub const FIRST_CONTENT_RECORD: usize = 16;

/// Entry flag: the record holds live data.
pub const FLAG_IN_USE: u16 = 0x0001;

/// Compression methods used for record payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Compression {
    /// No compression (stored).
    Store = 0,
    /// DEFLATE compression.
    Deflate = 8,
    /// Zstandard compression.
    Zstd = 100,
}

impl Compression {
    /// The on-disk code.
    #[inline]
    pub fn code(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for Compression {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Store),
            8 => Ok(Self::Deflate),
            100 => Ok(Self::Zstd),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_sizes() {
        assert_eq!(std::mem::size_of::<DatHeader>(), DatHeader::SIZE as usize);
        assert_eq!(std::mem::size_of::<MftHeader>(), MFT_RECORD_SIZE);
        assert_eq!(std::mem::size_of::<MftRecord>(), MFT_RECORD_SIZE);
        assert_eq!(std::mem::size_of::<FileIdPair>(), 8);
    }

    #[test]
    fn test_compression_codes() {
        for method in [Compression::Store, Compression::Deflate, Compression::Zstd] {
            assert_eq!(Compression::try_from(method.code()), Ok(method));
        }
        assert_eq!(Compression::try_from(3), Err(3));
    }
}
