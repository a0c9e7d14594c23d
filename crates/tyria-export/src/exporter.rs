//! Exporter trait and the file type dispatch table.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tyria_dat::FileType;

use crate::exporters::{ImageExporter, PassthroughExporter, SoundExporter, TextExporter};
use crate::ExportError;

/// Converts raw entry bytes into a standard format.
///
/// Exporters are shared by all workers and must not keep per-call state.
pub trait Exporter: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Convert `data`, identified as `file_type`, into the bytes written to
    /// disk with [`FileType::extension`].
    fn export(&self, data: &[u8], file_type: FileType) -> Result<Vec<u8>, ExportError>;
}

/// Maps file types onto exporters.
#[derive(Clone, Default)]
pub struct ExporterRegistry {
    exporters: FxHashMap<FileType, Arc<dyn Exporter>>,
}

impl ExporterRegistry {
    /// An empty registry: everything is written raw.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in exporters for images, sounds, text and natively
    /// standard binaries.
    pub fn with_defaults() -> Self {
        use FileType::*;

        let mut registry = Self::new();
        registry.register_all(
            &[Atex, Attx, Atec, Atep, Ateu, Atet, Ctex, Dds, Jpeg, Png, Webp],
            Arc::new(ImageExporter),
        );
        registry.register_all(
            &[Ogg, Mp3, AsndMp3, AsndOgg, PackedMp3, PackedOgg],
            Arc::new(SoundExporter),
        );
        registry.register_all(&[Eula, Text, Utf8], Arc::new(TextExporter));
        registry.register_all(&[Exe, Dll, Bink2Video, Font], Arc::new(PassthroughExporter));
        registry
    }

    /// Register `exporter` for `file_type`, replacing any previous one.
    pub fn register(&mut self, file_type: FileType, exporter: Arc<dyn Exporter>) -> &mut Self {
        self.exporters.insert(file_type, exporter);
        self
    }

    /// Register one exporter for several types.
    pub fn register_all(&mut self, file_types: &[FileType], exporter: Arc<dyn Exporter>) -> &mut Self {
        for &file_type in file_types {
            self.exporters.insert(file_type, Arc::clone(&exporter));
        }
        self
    }

    /// Exporter registered for `file_type`.
    #[inline]
    pub fn get(&self, file_type: FileType) -> Option<&Arc<dyn Exporter>> {
        self.exporters.get(&file_type)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.exporters.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.exporters.is_empty()
    }
}

impl std::fmt::Debug for ExporterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.exporters.keys().copied().collect();
        types.sort();
        f.debug_struct("ExporterRegistry")
            .field("types", &types)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl Exporter for Upper {
        fn name(&self) -> &'static str {
            "upper"
        }

        fn export(&self, data: &[u8], _: FileType) -> Result<Vec<u8>, ExportError> {
            Ok(data.to_ascii_uppercase())
        }
    }

    #[test]
    fn test_defaults_cover_convertible_types() {
        let registry = ExporterRegistry::with_defaults();
        assert_eq!(registry.get(FileType::Dds).unwrap().name(), "image");
        assert_eq!(registry.get(FileType::PackedOgg).unwrap().name(), "sound");
        assert_eq!(registry.get(FileType::Utf8).unwrap().name(), "text");
        assert_eq!(registry.get(FileType::Dll).unwrap().name(), "passthrough");

        for unhandled in [
            FileType::Model,
            FileType::StringFile,
            FileType::Bank,
            FileType::GameContent,
            FileType::BitmapFont,
            FileType::Sound,
            FileType::Unknown,
        ] {
            assert!(registry.get(unhandled).is_none(), "{}", unhandled);
        }
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = ExporterRegistry::with_defaults();
        registry.register(FileType::Text, Arc::new(Upper));
        let exporter = registry.get(FileType::Text).unwrap();
        assert_eq!(exporter.name(), "upper");
        assert_eq!(exporter.export(b"abc", FileType::Text).unwrap(), b"ABC");
    }

    #[test]
    fn test_empty_registry() {
        let registry = ExporterRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get(FileType::Png).is_none());
    }
}
