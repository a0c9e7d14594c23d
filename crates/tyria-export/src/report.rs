//! Extraction outcome and live progress.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

/// An entry that could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    pub base_id: u32,
    pub name: String,
    /// Output file, if the failure happened while writing it.
    pub path: Option<PathBuf>,
    pub reason: String,
}

impl fmt::Display for EntryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(
                f,
                "entry {} ({}): cannot write {}: {}",
                self.base_id,
                self.name,
                path.display(),
                self.reason
            ),
            None => write!(f, "entry {} ({}): {}", self.base_id, self.name, self.reason),
        }
    }
}

/// Summary of a finished extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractReport {
    /// Entries in the extracted subtree.
    pub total: usize,
    /// Entries written through an exporter.
    pub converted: usize,
    /// Entries written unmodified.
    pub raw: usize,
    /// Entries that failed, ordered by base id.
    pub failed: Vec<EntryFailure>,
    /// Whether the run stopped early on request.
    pub cancelled: bool,
}

impl ExtractReport {
    /// Entries written to disk.
    #[inline]
    pub fn written(&self) -> usize {
        self.converted + self.raw
    }

    /// Whether every entry was written.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.failed.is_empty() && self.written() == self.total
    }
}

/// Counters a supervisor thread can poll while extraction runs.
#[derive(Debug, Default)]
pub struct ExtractProgress {
    completed: AtomicUsize,
    total: AtomicUsize,
}

impl ExtractProgress {
    /// Entries finished so far, successful or not.
    #[inline]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Entries in the run.
    #[inline]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    pub(crate) fn start(&self, total: usize) {
        self.completed.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    pub(crate) fn complete_one(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }
}
