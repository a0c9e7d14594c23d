//! Output directory creation shared by all workers.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rustc_hash::FxHashSet;

/// Set of directories already created during a run.
///
/// All output directories are created here, under one lock, so concurrent
/// workers never race on `create_dir_all` for the same path.
#[derive(Debug, Default)]
pub struct DirectoryCache {
    created: Mutex<FxHashSet<PathBuf>>,
}

impl DirectoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `path` and its parents unless this cache already did.
    pub fn ensure(&self, path: &Path) -> std::io::Result<()> {
        let mut created = self.created.lock();
        if created.contains(path) {
            return Ok(());
        }
        std::fs::create_dir_all(path)?;
        created.insert(path.to_path_buf());
        Ok(())
    }

    /// Number of distinct directories created.
    pub fn len(&self) -> usize {
        self.created.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.created.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_creates_once() {
        let root = tempfile::tempdir().unwrap();
        let cache = DirectoryCache::new();
        let dir = root.path().join("Textures").join("UI Textures");

        cache.ensure(&dir).unwrap();
        cache.ensure(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_ensure_reports_failure() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("occupied");
        std::fs::write(&file, b"not a directory").unwrap();

        let cache = DirectoryCache::new();
        assert!(cache.ensure(&file.join("child")).is_err());
        assert!(cache.is_empty());
    }
}
