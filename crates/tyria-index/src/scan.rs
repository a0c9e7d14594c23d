//! Incremental archive scanner.
//!
//! The scanner walks the MFT one record per [`Scanner::perform`] call so a
//! caller can interleave scanning with progress reporting or cancellation.
//! Each content record is classified from its first bytes and filed under
//! the category for its type, named by its decimal base id.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tyria_common::CancelFlag;
use tyria_dat::{identify_prefix, modified_timestamp, DatArchive, SCAN_PEEK_LEN};

use crate::categories::category_for;
use crate::model::Index;
use crate::{IndexError, ScanError};

/// Lifecycle of a [`Scanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    NotStarted,
    Running,
    Done,
    Failed,
    Cancelled,
}

impl ScanState {
    /// Whether no further records will be processed.
    #[inline]
    pub fn is_finished(self) -> bool {
        matches!(self, ScanState::Done | ScanState::Failed | ScanState::Cancelled)
    }
}

/// Progress counters shared with other threads.
///
/// `current` never decreases; `max` is only ever raised.
#[derive(Debug, Default)]
pub struct ScanProgress {
    current: AtomicU64,
    max: AtomicU64,
}

impl ScanProgress {
    /// Records processed so far.
    #[inline]
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Relaxed)
    }

    /// Total records to process.
    #[inline]
    pub fn max(&self) -> u64 {
        self.max.load(Ordering::Relaxed)
    }

    fn advance(&self) {
        self.current.fetch_add(1, Ordering::Relaxed);
    }

    fn raise_max(&self, max: u64) {
        self.max.fetch_max(max, Ordering::Relaxed);
    }
}

/// Per-scan record counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Records added to the index.
    pub indexed: usize,
    /// Reserved, unused or unreachable records.
    pub skipped: usize,
    /// Records whose payload could not be read back.
    pub corrupt: usize,
    /// Records whose base id was already indexed.
    pub duplicates: usize,
}

/// Builds an [`Index`] from a DAT archive.
pub struct Scanner {
    path: PathBuf,
    archive: Option<DatArchive>,
    index: Index,
    state: ScanState,
    next_record: usize,
    progress: Arc<ScanProgress>,
    stats: ScanStats,
}

impl Scanner {
    /// Create a scanner for the archive at `path`. Nothing is opened yet.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            archive: None,
            index: Index::new(),
            state: ScanState::NotStarted,
            next_record: 0,
            progress: Arc::new(ScanProgress::default()),
            stats: ScanStats::default(),
        }
    }

    /// Open the archive and start scanning.
    ///
    /// Does nothing unless the scanner is in [`ScanState::NotStarted`].
    pub fn init(&mut self) -> Result<(), ScanError> {
        if self.state != ScanState::NotStarted {
            return Ok(());
        }

        let opened = DatArchive::open(&self.path)
            .and_then(|archive| Ok((modified_timestamp(&self.path)?, archive)));
        let (timestamp, archive) = match opened {
            Ok(opened) => opened,
            Err(source) => {
                self.state = ScanState::Failed;
                return Err(ScanError::CannotOpenArchive {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        self.index.set_dat_timestamp(timestamp);
        self.progress.raise_max(archive.record_count() as u64);
        tracing::info!(
            archive = %self.path.display(),
            records = archive.record_count(),
            "scanning archive"
        );

        self.archive = Some(archive);
        self.state = ScanState::Running;
        Ok(())
    }

    /// Process exactly one MFT record and return the resulting state.
    ///
    /// Corrupt records are skipped and counted. Once the scan has finished
    /// this is a no-op.
    pub fn perform(&mut self) -> Result<ScanState, ScanError> {
        match self.state {
            ScanState::NotStarted => return Err(ScanError::NotInitialized),
            ScanState::Running => {}
            finished => return Ok(finished),
        }
        let Some(archive) = self.archive.as_ref() else {
            return Err(ScanError::NotInitialized);
        };

        let index = self.next_record;
        let Some(record) = archive.record(index) else {
            self.finish();
            return Ok(self.state);
        };
        self.next_record += 1;

        match record.base_id().filter(|_| record.is_content()) {
            None => self.stats.skipped += 1,
            Some(base_id) => match archive.read_prefix(index, SCAN_PEEK_LEN) {
                Ok(data) => {
                    let file_type = identify_prefix(&data);
                    let name = base_id.to_string();
                    match self
                        .index
                        .add_entry(base_id, &name, file_type, category_for(file_type))
                    {
                        Ok(_) => self.stats.indexed += 1,
                        Err(IndexError::DuplicateEntry(id)) => {
                            tracing::debug!(record = index, base_id = id, "duplicate base id");
                            self.stats.duplicates += 1;
                        }
                    }
                }
                Err(e) if e.is_record_corrupt() => {
                    tracing::warn!(record = index, base_id, error = %e, "skipping corrupt record");
                    self.stats.corrupt += 1;
                }
                Err(source) => {
                    self.state = ScanState::Failed;
                    self.archive = None;
                    return Err(ScanError::Read { index, source });
                }
            },
        }

        self.progress.advance();
        if self.next_record >= archive.record_count() {
            self.finish();
        }
        Ok(self.state)
    }

    fn finish(&mut self) {
        self.state = ScanState::Done;
        self.archive = None;
        tracing::info!(
            indexed = self.stats.indexed,
            skipped = self.stats.skipped,
            corrupt = self.stats.corrupt,
            duplicates = self.stats.duplicates,
            "scan finished"
        );
    }

    /// Initialize if needed and scan until done, checking `cancel` between
    /// records.
    pub fn run(&mut self, cancel: &CancelFlag) -> Result<(), ScanError> {
        self.init()?;
        loop {
            if cancel.is_cancelled() && !self.state.is_finished() {
                self.state = ScanState::Cancelled;
                self.archive = None;
                tracing::info!(processed = self.progress.current(), "scan cancelled");
            }
            match self.perform()? {
                ScanState::Running => {}
                ScanState::Cancelled => return Err(ScanError::Cancelled),
                _ => return Ok(()),
            }
        }
    }

    /// Shared progress counters.
    #[inline]
    pub fn progress(&self) -> Arc<ScanProgress> {
        Arc::clone(&self.progress)
    }

    #[inline]
    pub fn current_progress(&self) -> u64 {
        self.progress.current()
    }

    #[inline]
    pub fn max_progress(&self) -> u64 {
        self.progress.max()
    }

    #[inline]
    pub fn state(&self) -> ScanState {
        self.state
    }

    #[inline]
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// The index built so far.
    #[inline]
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Take the built index.
    pub fn into_index(self) -> Index {
        self.index
    }
}
