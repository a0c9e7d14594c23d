//! Sound stream extraction.

use memchr::memmem;
use tyria_dat::FileType;

use crate::{ExportError, Exporter};

/// Writes Ogg and MP3 streams, unwrapping them from `asnd` and packed sound
/// containers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoundExporter;

impl SoundExporter {
    fn unwrap_stream<'a>(data: &'a [u8], marker: &[u8]) -> Result<&'a [u8], ExportError> {
        memmem::find(data, marker)
            .map(|start| &data[start..])
            .ok_or_else(|| {
                ExportError::Decode(format!(
                    "no {} stream in container",
                    String::from_utf8_lossy(marker)
                ))
            })
    }
}

impl Exporter for SoundExporter {
    fn name(&self) -> &'static str {
        "sound"
    }

    fn export(&self, data: &[u8], file_type: FileType) -> Result<Vec<u8>, ExportError> {
        let stream = match file_type {
            FileType::Ogg | FileType::Mp3 => data,
            FileType::AsndOgg | FileType::PackedOgg => Self::unwrap_stream(data, b"OggS")?,
            FileType::AsndMp3 | FileType::PackedMp3 => Self::unwrap_stream(data, b"ID3")?,
            _ => return Err(ExportError::NotThisFormat),
        };
        Ok(stream.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_streams_pass_through() {
        let ogg = b"OggS\x00\x02payload";
        assert_eq!(SoundExporter.export(ogg, FileType::Ogg).unwrap(), ogg);
    }

    #[test]
    fn test_packed_stream_is_unwrapped() {
        let mut data = b"PF\x05\x00\x01\x00\x0c\x00ASND".to_vec();
        data.extend_from_slice(&[0u8; 32]);
        data.extend_from_slice(b"OggS\x00\x02payload");

        let out = SoundExporter.export(&data, FileType::PackedOgg).unwrap();
        assert_eq!(out, b"OggS\x00\x02payload");
    }

    #[test]
    fn test_asnd_mp3_is_unwrapped() {
        let data = b"asnd\x01\x02\x03\x04ID3\x04\x00frames";
        let out = SoundExporter.export(data, FileType::AsndMp3).unwrap();
        assert_eq!(out, b"ID3\x04\x00frames");
    }

    #[test]
    fn test_missing_stream_and_wrong_type() {
        assert!(matches!(
            SoundExporter.export(b"asnd\x00\x00", FileType::AsndOgg),
            Err(ExportError::Decode(_))
        ));
        assert_eq!(
            SoundExporter.export(b"whatever", FileType::Bank),
            Err(ExportError::NotThisFormat)
        );
    }
}
