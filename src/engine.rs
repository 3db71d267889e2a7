//! Ingestion driver: streams one dump file through the classifier into
//! batched store commits.
//!
//! A file is read forward once. Every `batch_size` lines (valid or not) the
//! current batch is committed, and one last commit always happens at end of
//! input. A failed read or commit stops the file; batches committed before
//! the failure stay committed and nothing is retried.
//!
//! ```no_run
//! use breach_import::{config::IngestConfig, engine::ingest_file, store::SqliteStore};
//! # fn main() -> anyhow::Result<()> {
//! let mut store = SqliteStore::open("passwords.db")?;
//! let report = ingest_file("/dumps/combo.txt", &IngestConfig::default(), &mut store)?;
//! println!("{}", breach_import::report::render_file_report(&report));
//! # Ok(())
//! # }
//! ```
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, trace};

use crate::batch::BatchAccumulator;
use crate::classify::classify_detailed;
use crate::config::{DEFAULT_BATCH_SIZE, IngestConfig};
use crate::credential::CredentialCandidate;
use crate::io::iter_lines_auto;
use crate::stats::RunStatistics;
use crate::store::{CredentialStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("read {} at line {line}: {source}", path.display())]
    Read {
        path: PathBuf,
        line: usize,
        #[source]
        source: io::Error,
    },
    #[error(
        "commit of batch {batch} (lines {first_line}-{last_line}) from {} failed: {source}",
        path.display()
    )]
    Commit {
        path: PathBuf,
        batch: usize,
        first_line: usize,
        last_line: usize,
        #[source]
        source: StoreError,
    },
}

impl IngestError {
    pub fn path(&self) -> &Path {
        match self {
            IngestError::Open { path, .. }
            | IngestError::Read { path, .. }
            | IngestError::Commit { path, .. } => path,
        }
    }
}

/// Outcome of one fully ingested file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub path: PathBuf,
    pub stats: RunStatistics,
    pub batches_committed: usize,
    pub records_committed: usize,
}

/// Open `path` and ingest it into `store`.
pub fn ingest_file<P, S>(
    path: P,
    config: &IngestConfig,
    store: &mut S,
) -> Result<FileReport, IngestError>
where
    P: AsRef<Path>,
    S: CredentialStore + ?Sized,
{
    let path = path.as_ref();
    info!("processing {}", path.display());
    let lines =
        iter_lines_auto(path, config.mmap_threshold_bytes).map_err(|source| IngestError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    ingest_lines(path, lines, config, store)
}

/// Ingest any sequence of raw lines. `label` names the input in reports and
/// errors.
pub fn ingest_lines<I, S>(
    label: &Path,
    lines: I,
    config: &IngestConfig,
    store: &mut S,
) -> Result<FileReport, IngestError>
where
    I: IntoIterator<Item = io::Result<Vec<u8>>>,
    S: CredentialStore + ?Sized,
{
    let mut driver = Driver::new(label, config.batch_size());
    for (idx, line) in lines.into_iter().enumerate() {
        let line = line.map_err(|source| IngestError::Read {
            path: label.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        let (heuristic, candidate) = match classify_detailed(&line, &config.separators) {
            Some((heuristic, candidate)) => (Some(heuristic), candidate),
            None => (None, CredentialCandidate::Invalid),
        };
        match (driver.batch.accept(candidate), heuristic) {
            (true, Some(heuristic)) => {
                trace!("line {}: {}", idx + 1, heuristic.label());
                driver.stats.record_valid(heuristic);
            }
            _ => {
                debug!("line {}: no heuristic matched", idx + 1);
                driver.stats.record_invalid();
            }
        }
        driver.lines_seen += 1;
        if driver.lines_seen - driver.flushed_through == driver.batch_size {
            driver.flush(store)?;
        }
    }
    driver.flush(store)?;
    let report = driver.finish();
    info!(
        "{}: valid {} ({:.2}%) / invalid {} ({:.2}%)",
        report.path.display(),
        report.stats.valid_count,
        report.stats.percent_valid(),
        report.stats.invalid_count,
        report.stats.percent_invalid()
    );
    Ok(report)
}

/// Per-file state. Owned by one ingestion call and never shared.
struct Driver {
    path: PathBuf,
    batch_size: usize,
    batch: BatchAccumulator,
    stats: RunStatistics,
    lines_seen: usize,
    /// Line count covered by the last commit.
    flushed_through: usize,
    batches_committed: usize,
    records_committed: usize,
}

impl Driver {
    fn new(path: &Path, batch_size: usize) -> Self {
        Self {
            path: path.to_path_buf(),
            batch_size,
            // batch_size may be far larger than any input
            batch: BatchAccumulator::with_capacity(batch_size.min(DEFAULT_BATCH_SIZE)),
            stats: RunStatistics::default(),
            lines_seen: 0,
            flushed_through: 0,
            batches_committed: 0,
            records_committed: 0,
        }
    }

    fn flush<S: CredentialStore + ?Sized>(&mut self, store: &mut S) -> Result<(), IngestError> {
        let number = self.batches_committed + 1;
        info!("uploading batch {} ({} entries)", number, self.batch.len());
        let committed = self.batch.flush(store).map_err(|source| IngestError::Commit {
            path: self.path.clone(),
            batch: number,
            first_line: self.flushed_through + 1,
            last_line: self.lines_seen,
            source,
        })?;
        self.batches_committed = number;
        self.records_committed += committed;
        self.flushed_through = self.lines_seen;
        info!("batch {} uploaded, total {}", number, self.records_committed);
        Ok(())
    }

    fn finish(self) -> FileReport {
        FileReport {
            path: self.path,
            stats: self.stats,
            batches_committed: self.batches_committed,
            records_committed: self.records_committed,
        }
    }
}
