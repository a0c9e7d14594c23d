//! Payload compression for DAT records.

use std::io::{Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;

use crate::format::Compression;
use crate::{Error, Result};

/// Zstandard level used when writing archives.
const ZSTD_LEVEL: i32 = 3;

/// Decompress a stored payload.
///
/// `index` is only used to attribute errors to the record.
pub fn decompress(index: usize, method: Compression, data: &[u8]) -> Result<Vec<u8>> {
    let corrupt = |e: std::io::Error| Error::CorruptRecord {
        index,
        reason: format!("{:?} payload: {}", method, e),
    };

    match method {
        Compression::Store => Ok(data.to_vec()),
        Compression::Deflate => {
            let mut output = Vec::with_capacity(data.len() * 2);
            DeflateDecoder::new(data)
                .read_to_end(&mut output)
                .map_err(corrupt)?;
            Ok(output)
        }
        Compression::Zstd => {
            let mut output = Vec::with_capacity(data.len() * 2);
            zstd::Decoder::new(data)
                .and_then(|mut decoder| decoder.read_to_end(&mut output))
                .map_err(corrupt)?;
            Ok(output)
        }
    }
}

/// Compress a payload for storage.
pub fn compress(method: Compression, data: &[u8]) -> Result<Vec<u8>> {
    match method {
        Compression::Store => Ok(data.to_vec()),
        Compression::Deflate => {
            let mut encoder = DeflateEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(data)?;
            Ok(encoder.finish()?)
        }
        Compression::Zstd => Ok(zstd::encode_all(data, ZSTD_LEVEL)?),
    }
}
