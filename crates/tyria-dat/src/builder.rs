//! DAT archive writer.
//!
//! Produces archives the reader accepts. Used to build fixtures and by tools
//! that repack extracted assets; it is not an in-place archive editor.

use std::path::Path;

use tyria_common::crc;
use zerocopy::IntoBytes;

use crate::codec;
use crate::format::{
    Compression, DatHeader, FileIdPair, MftHeader, MftRecord, FILE_ID_TABLE_RECORD,
    FIRST_CONTENT_RECORD, FLAG_IN_USE, HEADER_RECORD, MFT_RECORD_SIZE, MFT_SELF_RECORD,
};
use crate::{Error, Result};

/// A payload waiting to be written.
#[derive(Debug, Clone)]
struct PendingRecord {
    file_ids: Vec<u32>,
    data: Vec<u8>,
    compression: Compression,
    corrupt: bool,
}

/// Builds a DAT archive in memory.
///
/// # Example
///
/// ```
/// use tyria_dat::{Compression, DatBuilder};
///
/// let mut builder = DatBuilder::new();
/// builder
///     .add_file(1, b"hello", Compression::Zstd)
///     .add_file(2, b"world", Compression::Store);
/// let bytes = builder.build()?;
/// assert!(bytes.len() > 40);
/// # Ok::<(), tyria_dat::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DatBuilder {
    records: Vec<PendingRecord>,
}

impl DatBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a payload reachable through `file_id`.
    pub fn add_file(&mut self, file_id: u32, data: &[u8], compression: Compression) -> &mut Self {
        self.records.push(PendingRecord {
            file_ids: vec![file_id],
            data: data.to_vec(),
            compression,
            corrupt: false,
        });
        self
    }

    /// Make `file_id` resolve to the record already registered for `existing`.
    pub fn alias(&mut self, file_id: u32, existing: u32) -> Result<&mut Self> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.file_ids.contains(&existing))
            .ok_or(Error::EntryNotFound(existing))?;
        record.file_ids.push(file_id);
        Ok(self)
    }

    /// Add a stored payload whose recorded checksum does not match.
    pub fn add_corrupt(&mut self, file_id: u32, data: &[u8]) -> &mut Self {
        self.records.push(PendingRecord {
            file_ids: vec![file_id],
            data: data.to_vec(),
            compression: Compression::Store,
            corrupt: true,
        });
        self
    }

    /// Add a live record that no file id points at.
    pub fn add_unlisted(&mut self, data: &[u8]) -> &mut Self {
        self.records.push(PendingRecord {
            file_ids: Vec::new(),
            data: data.to_vec(),
            compression: Compression::Store,
            corrupt: false,
        });
        self
    }

    /// Number of payload records added so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no payloads have been added.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialize the archive.
    ///
    /// Layout: header, file-id table, payloads in insertion order, MFT.
    pub fn build(&self) -> Result<Vec<u8>> {
        let record_count = FIRST_CONTENT_RECORD + self.records.len();
        let mut mft = vec![MftRecord::default(); record_count];
        let mut out = vec![0u8; DatHeader::SIZE as usize];

        let mut pairs: Vec<FileIdPair> = self
            .records
            .iter()
            .enumerate()
            .flat_map(|(i, r)| {
                r.file_ids.iter().map(move |&file_id| FileIdPair {
                    file_id,
                    record: (FIRST_CONTENT_RECORD + i) as u32,
                })
            })
            .collect();
        pairs.sort_by_key(|p| p.file_id);
        let table = pairs.as_slice().as_bytes();

        mft[HEADER_RECORD] = MftRecord {
            offset: 0,
            size: DatHeader::SIZE,
            flags: FLAG_IN_USE,
            ..Default::default()
        };
        mft[FILE_ID_TABLE_RECORD] = Self::append(&mut out, table, Compression::Store, false)?;

        for (i, record) in self.records.iter().enumerate() {
            mft[FIRST_CONTENT_RECORD + i] =
                Self::append(&mut out, &record.data, record.compression, record.corrupt)?;
        }

        let mft_offset = out.len() as u64;
        let mft_size = (record_count * MFT_RECORD_SIZE) as u32;
        mft[MFT_SELF_RECORD] = MftRecord {
            offset: mft_offset,
            size: mft_size,
            flags: FLAG_IN_USE,
            ..Default::default()
        };

        let mft_header = MftHeader {
            magic: MftHeader::MAGIC,
            reserved1: 0,
            entry_count: record_count as u32,
            reserved2: 0,
            reserved3: 0,
        };
        out.extend_from_slice(mft_header.as_bytes());
        for record in &mft[1..] {
            out.extend_from_slice(record.as_bytes());
        }

        let mut header = DatHeader {
            version: DatHeader::VERSION,
            magic: DatHeader::MAGIC,
            header_size: DatHeader::SIZE,
            reserved1: 0,
            chunk_size: DatHeader::DEFAULT_CHUNK_SIZE,
            crc: 0,
            reserved2: 0,
            mft_offset,
            mft_size,
            flags: 0,
        };
        header.crc = crc::hash_bytes(&header.as_bytes()[..DatHeader::CRC_SPAN]);
        out[..DatHeader::SIZE as usize].copy_from_slice(header.as_bytes());

        Ok(out)
    }

    /// Serialize the archive to a file.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.build()?)?;
        Ok(())
    }

    fn append(out: &mut Vec<u8>, data: &[u8], compression: Compression, corrupt: bool) -> Result<MftRecord> {
        let stored = codec::compress(compression, data)?;
        let mut checksum = crc::hash_bytes(&stored);
        if corrupt {
            checksum = !checksum;
        }

        let record = MftRecord {
            offset: out.len() as u64,
            size: stored.len() as u32,
            compression: compression.code(),
            flags: FLAG_IN_USE,
            counter: 0,
            crc: checksum,
        };
        out.extend_from_slice(&stored);
        Ok(record)
    }
}
