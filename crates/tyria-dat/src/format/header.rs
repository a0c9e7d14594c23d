//! Archive and MFT headers.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Archive header at offset 0.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DatHeader {
    /// Format version byte (0x97).
    pub version: u8,
    /// Identifier "AN\x1A".
    pub magic: [u8; 3],
    /// Size of this header (40).
    pub header_size: u32,
    /// Reserved.
    pub reserved1: u32,
    /// Allocation chunk size of the writer. Informational.
    pub chunk_size: u32,
    /// CRC32C of the first [`DatHeader::CRC_SPAN`] bytes.
    pub crc: u32,
    /// Reserved.
    pub reserved2: u32,
    /// Absolute offset of the MFT.
    pub mft_offset: u64,
    /// Size of the MFT in bytes.
    pub mft_size: u32,
    /// Archive flags.
    pub flags: u32,
}

impl DatHeader {
    /// Expected version byte.
    pub const VERSION: u8 = 0x97;

    /// Identifier following the version byte.
    pub const MAGIC: [u8; 3] = *b"AN\x1A";

    /// Header size in bytes.
    pub const SIZE: u32 = 40;

    /// Number of leading header bytes covered by `crc`.
    pub const CRC_SPAN: usize = 16;

    /// Default chunk size written by [`crate::DatBuilder`].
    pub const DEFAULT_CHUNK_SIZE: u32 = 0x0001_0000;
}

/// First 24 bytes of the MFT. Occupies the slot of record 0.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct MftHeader {
    /// Identifier "Mft\x1A".
    pub magic: [u8; 4],
    /// Reserved.
    pub reserved1: u64,
    /// Number of records including this header.
    pub entry_count: u32,
    /// Reserved.
    pub reserved2: u32,
    /// Reserved.
    pub reserved3: u32,
}

impl MftHeader {
    /// MFT identifier.
    pub const MAGIC: [u8; 4] = *b"Mft\x1A";
}
