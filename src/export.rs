//! Export helpers for writing run results to CSV.
//!
//! - `save_file_reports_csv` writes one row per ingested file with its counts
//!   and percentages.
//! - `save_failures_txt` writes one error line per file that needs manual
//!   remediation. Every error message starts with the file's path.
use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use csv::Writer;
use serde::Serialize;

use crate::walker::CorpusOutcome;

#[derive(Debug, Serialize)]
struct FileRow<'a> {
    path: &'a str,
    valid: usize,
    invalid: usize,
    percent_valid: String,
    percent_invalid: String,
    standard: usize,
    comma_corrected: usize,
    swapped: usize,
    bare_identifier: usize,
    batches: usize,
    records: usize,
}

pub fn save_file_reports_csv<P: AsRef<Path>>(outcome: &CorpusOutcome, path: P) -> Result<()> {
    let mut wtr = Writer::from_path(path)?;
    for report in &outcome.reports {
        let display = report.path.to_string_lossy();
        let s = &report.stats;
        wtr.serialize(FileRow {
            path: &display,
            valid: s.valid_count,
            invalid: s.invalid_count,
            percent_valid: format!("{:.2}", s.percent_valid()),
            percent_invalid: format!("{:.2}", s.percent_invalid()),
            standard: s.by_heuristic.standard,
            comma_corrected: s.by_heuristic.comma_corrected,
            swapped: s.by_heuristic.swapped,
            bare_identifier: s.by_heuristic.bare_identifier,
            batches: report.batches_committed,
            records: report.records_committed,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_failures_txt<P: AsRef<Path>>(outcome: &CorpusOutcome, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    for failure in &outcome.failures {
        writeln!(f, "{}", failure)?;
    }
    Ok(())
}
