//! DAT archive reader.
//!
//! The archive is memory-mapped once; the MFT and file-id table are parsed
//! eagerly on open, payloads are decompressed on demand. A `DatArchive` is
//! `Send + Sync`, but extraction workers usually open their own handle so no
//! reader state is shared between threads.

use std::fs::File;
use std::path::Path;
use std::time::UNIX_EPOCH;

use memmap2::Mmap;
use rustc_hash::FxHashMap;
use tyria_common::{crc, BinaryReader};

use crate::codec;
use crate::entry::DatEntry;
use crate::format::{
    Compression, DatHeader, FileIdPair, MftHeader, MftRecord, FILE_ID_TABLE_RECORD,
    MFT_RECORD_SIZE,
};
use crate::{Error, Result};

/// A DAT archive opened for reading.
pub struct DatArchive {
    /// Memory-mapped file data
    mmap: Mmap,
    /// Archive file name
    name: String,
    /// MFT records, indexed by record number (slot 0 is the MFT header)
    records: Vec<DatEntry>,
    /// File id -> record index
    ids: FxHashMap<u32, usize>,
}

impl DatArchive {
    /// Open an archive and parse its MFT and file-id table.
    ///
    /// Fails with an I/O `NotFound` error if the file does not exist and with
    /// [`Error::CorruptHeader`] if the container structure is invalid.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        if len < DatHeader::SIZE as u64 {
            return Err(Error::CorruptHeader(format!(
                "file is {} bytes, smaller than the header",
                len
            )));
        }

        let mmap = unsafe { Mmap::map(&file)? };

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let mut archive = Self {
            mmap,
            name,
            records: Vec::new(),
            ids: FxHashMap::default(),
        };
        archive.parse()?;

        tracing::debug!(
            archive = %archive.name,
            records = archive.records.len(),
            file_ids = archive.ids.len(),
            "opened archive"
        );

        Ok(archive)
    }

    fn parse(&mut self) -> Result<()> {
        let data: &[u8] = &self.mmap;
        let mut reader = BinaryReader::new(data);
        let header: DatHeader = reader.read_struct()?;

        let version = header.version;
        let magic = header.magic;
        let header_size = header.header_size;
        let stored_crc = header.crc;
        let mft_offset = header.mft_offset;
        let mft_size = header.mft_size as usize;

        if version != DatHeader::VERSION || magic != DatHeader::MAGIC {
            return Err(Error::CorruptHeader(format!(
                "bad identifier {:02x} {:?}",
                version, magic
            )));
        }
        if header_size != DatHeader::SIZE {
            return Err(Error::CorruptHeader(format!(
                "unexpected header size {}",
                header_size
            )));
        }
        let actual_crc = crc::hash_bytes(&data[..DatHeader::CRC_SPAN]);
        if actual_crc != stored_crc {
            return Err(Error::CorruptHeader(format!(
                "header checksum mismatch: stored {:08x}, computed {:08x}",
                stored_crc, actual_crc
            )));
        }

        let mft = usize::try_from(mft_offset)
            .ok()
            .and_then(|start| data.get(start..start.checked_add(mft_size)?))
            .ok_or_else(|| {
                Error::CorruptHeader(format!(
                    "MFT at {}+{} lies outside the file",
                    mft_offset, mft_size
                ))
            })?;
        if mft_size < MFT_RECORD_SIZE || mft_size % MFT_RECORD_SIZE != 0 {
            return Err(Error::CorruptHeader(format!("bad MFT size {}", mft_size)));
        }

        let mut reader = BinaryReader::new(mft);
        let mft_header: MftHeader = reader.read_struct()?;
        let mft_magic = mft_header.magic;
        let entry_count = mft_header.entry_count as usize;
        if mft_magic != MftHeader::MAGIC {
            return Err(Error::CorruptHeader(format!(
                "bad MFT identifier {:?}",
                mft_magic
            )));
        }
        if entry_count == 0 || entry_count * MFT_RECORD_SIZE > mft_size {
            return Err(Error::CorruptHeader(format!(
                "MFT claims {} records in {} bytes",
                entry_count, mft_size
            )));
        }

        let mut records = Vec::with_capacity(entry_count);
        records.push(DatEntry::new(0, mft_offset, mft_size as u32, 0, 0, 0));
        for index in 1..entry_count {
            let record: MftRecord = reader.read_struct()?;
            records.push(DatEntry::new(
                index,
                record.offset,
                record.size,
                record.compression,
                record.flags,
                record.crc,
            ));
        }
        self.records = records;

        if entry_count <= FILE_ID_TABLE_RECORD {
            return Err(Error::CorruptHeader("MFT has no file-id table".into()));
        }
        let table = self.read_record(FILE_ID_TABLE_RECORD).map_err(|e| {
            Error::CorruptHeader(format!("unreadable file-id table: {}", e))
        })?;
        if table.len() % std::mem::size_of::<FileIdPair>() != 0 {
            return Err(Error::CorruptHeader(format!(
                "file-id table size {} is not a multiple of 8",
                table.len()
            )));
        }

        let mut reader = BinaryReader::new(&table);
        let mut ids = FxHashMap::default();
        while !reader.is_empty() {
            let pair: FileIdPair = reader.read_struct()?;
            if pair.is_padding() {
                continue;
            }
            let file_id = pair.file_id;
            let index = pair.record as usize;
            let entry = self.records.get_mut(index).ok_or_else(|| {
                Error::CorruptHeader(format!(
                    "file id {} points at record {} of {}",
                    file_id, index, entry_count
                ))
            })?;
            entry.note_file_id(file_id);
            ids.insert(file_id, index);
        }
        self.ids = ids;

        Ok(())
    }

    /// Get the archive name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of MFT records, including the reserved ones.
    #[inline]
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Get record metadata by index.
    #[inline]
    pub fn record(&self, index: usize) -> Option<&DatEntry> {
        self.records.get(index)
    }

    /// Iterate over all records.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &DatEntry> + '_ {
        self.records.iter()
    }

    /// Record index a file id resolves to.
    #[inline]
    pub fn record_for_id(&self, file_id: u32) -> Option<usize> {
        self.ids.get(&file_id).copied()
    }

    /// Base id of the record a file id resolves to.
    pub fn base_id(&self, file_id: u32) -> Option<u32> {
        self.record_for_id(file_id)
            .and_then(|index| self.records[index].base_id())
    }

    /// Read the decompressed payload of a file id.
    pub fn read_entry(&self, file_id: u32) -> Result<Vec<u8>> {
        let index = self
            .record_for_id(file_id)
            .ok_or(Error::EntryNotFound(file_id))?;
        self.read_record(index)
    }

    /// Read the decompressed payload of a record.
    pub fn read_record(&self, index: usize) -> Result<Vec<u8>> {
        let stored = self.stored_bytes(index)?;
        let entry = &self.records[index];
        let method = Compression::try_from(entry.compression_code()).map_err(|code| {
            Error::CorruptRecord {
                index,
                reason: format!("unknown compression method {}", code),
            }
        })?;
        codec::decompress(index, method, stored)
    }

    /// Read at most `limit` leading bytes of a record's payload.
    ///
    /// Stored payloads are sliced without copying the rest; compressed ones
    /// have to be decompressed in full first.
    pub fn read_prefix(&self, index: usize, limit: usize) -> Result<Vec<u8>> {
        let stored = self.stored_bytes(index)?;
        if self.records[index].compression() == Some(Compression::Store) {
            return Ok(stored[..stored.len().min(limit)].to_vec());
        }
        let mut data = self.read_record(index)?;
        data.truncate(limit);
        Ok(data)
    }

    /// Checked, CRC-verified stored bytes of a record.
    fn stored_bytes(&self, index: usize) -> Result<&[u8]> {
        let entry = self
            .records
            .get(index)
            .ok_or(Error::RecordOutOfRange(index))?;

        let stored = usize::try_from(entry.offset())
            .ok()
            .and_then(|start| {
                self.mmap
                    .get(start..start.checked_add(entry.stored_size() as usize)?)
            })
            .ok_or_else(|| Error::CorruptRecord {
                index,
                reason: format!(
                    "payload {}+{} lies outside the file",
                    entry.offset(),
                    entry.stored_size()
                ),
            })?;

        if entry.crc() != 0 {
            let actual = crc::hash_bytes(stored);
            if actual != entry.crc() {
                return Err(Error::CorruptRecord {
                    index,
                    reason: format!(
                        "checksum mismatch: stored {:08x}, computed {:08x}",
                        entry.crc(),
                        actual
                    ),
                });
            }
        }

        Ok(stored)
    }
}

/// Modification time of a file in seconds since the Unix epoch.
///
/// Times before the epoch are reported as `0`.
pub fn modified_timestamp<P: AsRef<Path>>(path: P) -> Result<u64> {
    let modified = std::fs::metadata(path)?.modified()?;
    Ok(modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0))
}
