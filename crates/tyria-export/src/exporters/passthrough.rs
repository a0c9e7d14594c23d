//! Formats that are already standard on disk.

use tyria_dat::FileType;

use crate::{ExportError, Exporter};

/// Writes executables, libraries, Bink2 videos and fonts unchanged under
/// their proper extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughExporter;

impl Exporter for PassthroughExporter {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn export(&self, data: &[u8], file_type: FileType) -> Result<Vec<u8>, ExportError> {
        match file_type {
            FileType::Exe | FileType::Dll | FileType::Bink2Video | FileType::Font => {
                Ok(data.to_vec())
            }
            _ => Err(ExportError::NotThisFormat),
        }
    }
}
