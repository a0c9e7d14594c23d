//! Texture conversion to PNG.

use std::io::Cursor;

use image::ImageFormat;
use tyria_dat::FileType;

use crate::{ExportError, Exporter};

/// Decodes standard image formats and re-encodes them as PNG.
///
/// The proprietary ATEX family is declined and ends up raw.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageExporter;

impl ImageExporter {
    fn format(file_type: FileType) -> Option<ImageFormat> {
        match file_type {
            FileType::Dds => Some(ImageFormat::Dds),
            FileType::Jpeg => Some(ImageFormat::Jpeg),
            FileType::Png => Some(ImageFormat::Png),
            FileType::Webp => Some(ImageFormat::WebP),
            _ => None,
        }
    }
}

impl Exporter for ImageExporter {
    fn name(&self) -> &'static str {
        "image"
    }

    fn export(&self, data: &[u8], file_type: FileType) -> Result<Vec<u8>, ExportError> {
        let format = Self::format(file_type).ok_or(ExportError::NotThisFormat)?;
        let decoded = image::load_from_memory_with_format(data, format)
            .map_err(|e| ExportError::Decode(e.to_string()))?;

        let mut out = Cursor::new(Vec::new());
        decoded
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| ExportError::Decode(e.to_string()))?;
        Ok(out.into_inner())
    }
}
