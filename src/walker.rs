//! Corpus walking: find every dump file under a root and run the ingestion
//! driver on each, either one after another or one worker per file.
use std::path::{Path, PathBuf};

use log::{error, warn};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::IngestConfig;
use crate::engine::{FileReport, IngestError, ingest_file};
use crate::stats::RunStatistics;
use crate::store::{CredentialStore, StoreError};

/// Every regular file below `root`, sorted. A file root yields itself.
pub fn collect_corpus<P: AsRef<Path>>(root: P) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

#[derive(Debug, thiserror::Error)]
pub enum FileFailure {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error("open store for {}: {source}", path.display())]
    StoreOpen {
        path: PathBuf,
        #[source]
        source: StoreError,
    },
}

impl FileFailure {
    pub fn path(&self) -> &Path {
        match self {
            FileFailure::Ingest(e) => e.path(),
            FileFailure::StoreOpen { path, .. } => path,
        }
    }
}

/// Results of a whole run.
#[derive(Debug, Default)]
pub struct CorpusOutcome {
    pub reports: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
}

impl CorpusOutcome {
    /// Statistics summed over successfully ingested files.
    pub fn totals(&self) -> RunStatistics {
        self.reports.iter().map(|r| r.stats).sum()
    }

    pub fn records_committed(&self) -> usize {
        self.reports.iter().map(|r| r.records_committed).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Ingest `paths` in order into one store. With `fail_fast` the run stops
/// at the first failed file.
pub fn ingest_corpus<S>(
    paths: &[PathBuf],
    config: &IngestConfig,
    store: &mut S,
    fail_fast: bool,
) -> CorpusOutcome
where
    S: CredentialStore + ?Sized,
{
    let mut outcome = CorpusOutcome::default();
    for path in paths {
        match ingest_file(path, config, store) {
            Ok(report) => outcome.reports.push(report),
            Err(e) => {
                error!("{}", e);
                outcome.failures.push(e.into());
                if fail_fast {
                    break;
                }
            }
        }
    }
    outcome
}

/// Ingest every file on its own rayon worker with a store from `open_store`.
/// Workers share nothing; results come back in `paths` order. `fail_fast`
/// stops scheduling new files after a failure.
pub fn ingest_corpus_parallel<S, F>(
    paths: &[PathBuf],
    config: &IngestConfig,
    open_store: F,
    fail_fast: bool,
) -> CorpusOutcome
where
    S: CredentialStore,
    F: Fn() -> Result<S, StoreError> + Sync,
{
    use std::sync::atomic::{AtomicBool, Ordering};
    let failed = AtomicBool::new(false);
    let results: Vec<Option<Result<FileReport, FileFailure>>> = paths
        .par_iter()
        .map(|path| {
            if fail_fast && failed.load(Ordering::Relaxed) {
                return None;
            }
            let result = open_store()
                .map_err(|source| FileFailure::StoreOpen {
                    path: path.clone(),
                    source,
                })
                .and_then(|mut store| {
                    ingest_file(path, config, &mut store).map_err(FileFailure::from)
                });
            if let Err(e) = &result {
                error!("{}", e);
                failed.store(true, Ordering::Relaxed);
            }
            Some(result)
        })
        .collect();

    let mut outcome = CorpusOutcome::default();
    for result in results.into_iter().flatten() {
        match result {
            Ok(report) => outcome.reports.push(report),
            Err(e) => outcome.failures.push(e),
        }
    }
    outcome
}
