//! Worker pool extracting a category subtree.
//!
//! The subtree is flattened once into a fixed work list. Workers claim the
//! next position through a single mutex-guarded cursor; the lock covers only
//! the increment, all archive and file I/O happens outside it. Each worker
//! opens its own archive handle.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tyria_common::CancelFlag;
use tyria_dat::{refine, DatArchive};
use tyria_index::{is_path_component, CategoryId, Index, IndexEntry};

use crate::dirs::DirectoryCache;
use crate::report::{EntryFailure, ExtractProgress, ExtractReport};
use crate::{ExporterRegistry, ExtractError, Result, RAW_EXTENSION};

/// What to do when a single entry cannot be read or written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop all workers and return the first failure.
    #[default]
    FailFast,
    /// Log the failure, record it in the report and continue.
    SkipAndReport,
}

/// Extraction settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Number of worker threads; `0` means one.
    pub workers: usize,
    pub policy: FailurePolicy,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            policy: FailurePolicy::default(),
        }
    }
}

/// Worker count matching the available hardware parallelism.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// How an entry ended up on disk.
enum Written {
    Converted,
    Raw,
}

/// Why an entry did not.
enum EntryError {
    /// Only this entry is affected.
    Entry(EntryFailure),
    /// The whole run must stop.
    Fatal(ExtractError),
}

/// State shared by the workers of one run.
struct Shared<'a> {
    work: &'a [tyria_index::EntryId],
    cursor: Mutex<usize>,
    dirs: DirectoryCache,
    stop: AtomicBool,
    fatal: Mutex<Option<ExtractError>>,
    failures: Mutex<Vec<EntryFailure>>,
    converted: AtomicUsize,
    raw: AtomicUsize,
}

impl Shared<'_> {
    /// Claim the next work position, or `None` when the list is exhausted.
    fn claim(&self) -> Option<usize> {
        let mut cursor = self.cursor.lock();
        if *cursor >= self.work.len() {
            return None;
        }
        let position = *cursor;
        *cursor += 1;
        Some(position)
    }

    fn abort(&self, error: ExtractError) {
        self.fatal.lock().get_or_insert(error);
        self.stop.store(true, Ordering::Relaxed);
    }
}

/// Extracts entries of an [`Index`] from its archive.
///
/// # Example
///
/// ```no_run
/// use tyria_export::{ExporterRegistry, Extractor};
/// # fn index() -> tyria_index::Index { unimplemented!() }
///
/// let index = index();
/// let registry = ExporterRegistry::with_defaults();
/// let report = Extractor::new(&index, "Gw2.dat", "out", &registry).run(index.root())?;
/// println!("{} converted, {} raw", report.converted, report.raw);
/// # Ok::<(), tyria_export::ExtractError>(())
/// ```
pub struct Extractor<'a> {
    index: &'a Index,
    archive_path: PathBuf,
    output: PathBuf,
    registry: &'a ExporterRegistry,
    options: ExtractOptions,
    progress: Arc<ExtractProgress>,
    cancel: CancelFlag,
}

impl<'a> Extractor<'a> {
    pub fn new<A: AsRef<Path>, O: AsRef<Path>>(
        index: &'a Index,
        archive_path: A,
        output: O,
        registry: &'a ExporterRegistry,
    ) -> Self {
        Self {
            index,
            archive_path: archive_path.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            registry,
            options: ExtractOptions::default(),
            progress: Arc::new(ExtractProgress::default()),
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Stop claiming new entries once `cancel` is set.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Shared progress counters.
    #[inline]
    pub fn progress(&self) -> Arc<ExtractProgress> {
        Arc::clone(&self.progress)
    }

    /// Output path of an entry written with `extension`.
    pub fn output_path(&self, entry: &IndexEntry, extension: &str) -> PathBuf {
        self.output_dir(entry)
            .join(format!("{}.{}", entry.name(), extension))
    }

    fn output_dir(&self, entry: &IndexEntry) -> PathBuf {
        let mut dir = self.output.clone();
        dir.extend(self.index.category_path(entry.category()));
        dir
    }

    /// Extract every entry below `category`.
    pub fn run(&self, category: CategoryId) -> Result<ExtractReport> {
        let work = self.index.flatten(category);
        let total = work.len();
        self.progress.start(total);

        let workers = self.options.workers.max(1).min(total.max(1));
        tracing::info!(
            entries = total,
            workers,
            output = %self.output.display(),
            "starting extraction"
        );

        let shared = Shared {
            work: &work,
            cursor: Mutex::new(0),
            dirs: DirectoryCache::new(),
            stop: AtomicBool::new(false),
            fatal: Mutex::new(None),
            failures: Mutex::new(Vec::new()),
            converted: AtomicUsize::new(0),
            raw: AtomicUsize::new(0),
        };

        if total > 0 {
            std::thread::scope(|scope| {
                for worker in 0..workers {
                    let shared = &shared;
                    scope.spawn(move || self.worker(worker, shared));
                }
            });
        }

        if let Some(error) = shared.fatal.into_inner() {
            return Err(error);
        }

        let mut failed = shared.failures.into_inner();
        failed.sort_by_key(|f| f.base_id);
        let report = ExtractReport {
            total,
            converted: shared.converted.into_inner(),
            raw: shared.raw.into_inner(),
            failed,
            cancelled: self.cancel.is_cancelled() && self.progress.completed() < total,
        };

        tracing::info!(
            converted = report.converted,
            raw = report.raw,
            failed = report.failed.len(),
            cancelled = report.cancelled,
            "extraction finished"
        );
        Ok(report)
    }

    fn worker(&self, worker: usize, shared: &Shared<'_>) {
        let archive = match DatArchive::open(&self.archive_path) {
            Ok(archive) => archive,
            Err(source) => {
                shared.abort(ExtractError::ArchiveOpen {
                    path: self.archive_path.clone(),
                    source,
                });
                return;
            }
        };
        tracing::debug!(worker, "worker started");

        let mut processed = 0usize;
        while !shared.stop.load(Ordering::Relaxed) && !self.cancel.is_cancelled() {
            let Some(position) = shared.claim() else {
                break;
            };
            let entry = self.index.entry(shared.work[position]);

            match self.extract_entry(&archive, entry, &shared.dirs) {
                Ok(Written::Converted) => {
                    shared.converted.fetch_add(1, Ordering::Relaxed);
                }
                Ok(Written::Raw) => {
                    shared.raw.fetch_add(1, Ordering::Relaxed);
                }
                Err(EntryError::Fatal(error)) => shared.abort(error),
                Err(EntryError::Entry(failure)) => match self.options.policy {
                    FailurePolicy::FailFast => shared.abort(ExtractError::Entry(failure)),
                    FailurePolicy::SkipAndReport => {
                        tracing::warn!("{}", failure);
                        shared.failures.lock().push(failure);
                    }
                },
            }

            processed += 1;
            self.progress.complete_one();
        }

        tracing::debug!(worker, processed, "worker finished");
    }

    fn extract_entry(
        &self,
        archive: &DatArchive,
        entry: &IndexEntry,
        dirs: &DirectoryCache,
    ) -> std::result::Result<Written, EntryError> {
        let failure = |path: Option<PathBuf>, reason: String| {
            EntryError::Entry(EntryFailure {
                base_id: entry.base_id(),
                name: entry.name().to_string(),
                path,
                reason,
            })
        };

        let category_path = self.index.category_path(entry.category());
        if let Some(bad) = std::iter::once(entry.name())
            .chain(category_path)
            .find(|name| !is_path_component(name))
        {
            return Err(failure(None, format!("unsafe path component {:?}", bad)));
        }

        let data = archive
            .read_entry(entry.base_id())
            .map_err(|e| failure(None, e.to_string()))?;
        let file_type = refine(entry.file_type(), &data);

        let dir = self.output_dir(entry);
        dirs.ensure(&dir).map_err(|source| {
            EntryError::Fatal(ExtractError::CreateDirectory {
                path: dir.clone(),
                source,
            })
        })?;

        let (bytes, extension, written) = match self.registry.get(file_type) {
            Some(exporter) => match exporter.export(&data, file_type) {
                Ok(converted) => (converted, file_type.extension(), Written::Converted),
                Err(e) => {
                    tracing::debug!(
                        base_id = entry.base_id(),
                        exporter = exporter.name(),
                        %file_type,
                        reason = %e,
                        "writing raw bytes"
                    );
                    (data, RAW_EXTENSION, Written::Raw)
                }
            },
            None => (data, RAW_EXTENSION, Written::Raw),
        };

        let path = dir.join(format!("{}.{}", entry.name(), extension));
        std::fs::write(&path, bytes).map_err(|e| failure(Some(path.clone()), e.to_string()))?;
        Ok(written)
    }
}
