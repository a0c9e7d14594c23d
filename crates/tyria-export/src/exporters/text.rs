//! Text normalization to BOM-less UTF-8.

use tyria_dat::FileType;

use crate::{ExportError, Exporter};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];

/// Strips byte order marks and transcodes UTF-16LE to UTF-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExporter;

impl Exporter for TextExporter {
    fn name(&self) -> &'static str {
        "text"
    }

    fn export(&self, data: &[u8], file_type: FileType) -> Result<Vec<u8>, ExportError> {
        if !matches!(file_type, FileType::Eula | FileType::Text | FileType::Utf8) {
            return Err(ExportError::NotThisFormat);
        }
        // pack-wrapped EULA
        if data.starts_with(b"PF") && file_type == FileType::Eula {
            return Err(ExportError::NotThisFormat);
        }

        if let Some(body) = data.strip_prefix(UTF16LE_BOM) {
            let pairs = body.chunks_exact(2);
            if !pairs.remainder().is_empty() {
                return Err(ExportError::Decode(format!(
                    "odd UTF-16 length {}",
                    body.len()
                )));
            }
            let units = pairs.map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
            return char::decode_utf16(units)
                .collect::<Result<String, _>>()
                .map(String::into_bytes)
                .map_err(|e| ExportError::Decode(e.to_string()));
        }

        let body = data.strip_prefix(UTF8_BOM).unwrap_or(data);
        match std::str::from_utf8(body) {
            Ok(_) => Ok(body.to_vec()),
            Err(e) => Err(ExportError::Decode(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_bom_stripped() {
        let out = TextExporter.export(b"\xEF\xBB\xBFhello", FileType::Utf8).unwrap();
        assert_eq!(out, b"hello");
    }

    #[test]
    fn test_utf16_transcoded() {
        let mut data = vec![0xFF, 0xFE];
        for unit in "Tyria ✓".encode_utf16() {
            data.extend_from_slice(&unit.to_le_bytes());
        }
        let out = TextExporter.export(&data, FileType::Text).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Tyria ✓");
    }

    #[test]
    fn test_odd_length_utf16_rejected() {
        let data = [0xFF, 0xFE, b'h', 0x00, b'i'];
        assert!(matches!(
            TextExporter.export(&data, FileType::Text),
            Err(ExportError::Decode(_))
        ));
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(TextExporter.export(b"plain\n", FileType::Text).unwrap(), b"plain\n");
    }

    #[test]
    fn test_invalid_text() {
        assert!(matches!(
            TextExporter.export(b"\xC3\x28bad", FileType::Text),
            Err(ExportError::Decode(_))
        ));
        assert_eq!(
            TextExporter.export(b"PF\x05\x00\x01\x00\x0c\x00eula\xFF\x00", FileType::Eula),
            Err(ExportError::NotThisFormat)
        );
        assert_eq!(
            TextExporter.export(b"text", FileType::Model),
            Err(ExportError::NotThisFormat)
        );
    }
}
