//! Human-readable report rendering for terminal output.
//!
//! Produces a colored summary with one block per ingested file, the failed
//! files, and run-wide totals.
use colored::*;

use crate::engine::FileReport;
use crate::stats::RunStatistics;
use crate::walker::CorpusOutcome;

fn visible_len(s: &str) -> usize {
    // Strip ANSI escape sequences (\x1b[ ... m) to compute printable width
    let mut len = 0;
    let mut iter = s.chars().peekable();
    while let Some(ch) = iter.next() {
        if ch == '\u{1b}' {
            if let Some('[') = iter.peek().cloned() {
                let _ = iter.next();
            }
            for c in iter.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            len += 1;
        }
    }
    len
}

fn section_header(title: &str) -> String {
    let len = visible_len(title);
    let mut s = String::new();
    s.push('\n');
    s.push_str(title);
    s.push('\n');
    s.push_str(&"─".repeat(len));
    s.push_str("\n\n");
    s
}

/// `Valid: 8 (80.00%) / Invalid: 2 (20.00%)`
pub fn render_validity(stats: &RunStatistics) -> String {
    format!(
        "Valid: {} ({:.2}%) / Invalid: {} ({:.2}%)",
        stats.valid_count,
        stats.percent_valid(),
        stats.invalid_count,
        stats.percent_invalid()
    )
}

fn heuristic_lines(stats: &RunStatistics) -> Vec<String> {
    stats
        .by_heuristic
        .iter()
        .filter(|(_, n)| *n > 0)
        .map(|(h, n)| format!("  {}: {}", h.label(), n))
        .collect()
}

pub fn render_file_report(report: &FileReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", report.path.display().to_string().bold().green()));
    out.push_str(&format!("  {}\n", render_validity(&report.stats)));
    out.push_str(&format!(
        "  Batches: {} / Records: {}\n",
        report.batches_committed, report.records_committed
    ));
    for line in heuristic_lines(&report.stats) {
        out.push_str(&format!("  {}\n", line));
    }
    out
}

pub fn render_summary(outcome: &CorpusOutcome) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n",
        "breach-import: Credential Dump Ingestion Results".bold().cyan()
    ));

    out.push_str(&section_header(&"Files".bold().yellow().to_string()));
    if outcome.reports.is_empty() {
        out.push_str("(No files ingested)\n");
    }
    for report in &outcome.reports {
        out.push_str(&render_file_report(report));
    }

    if !outcome.failures.is_empty() {
        out.push_str(&section_header(&"Failed Files".bold().red().to_string()));
        for failure in &outcome.failures {
            out.push_str(&format!("{}\n", failure.path().display().to_string().red()));
            out.push_str(&format!("  {}\n", failure));
        }
    }

    let totals = outcome.totals();
    out.push_str(&section_header(&"Totals".bold().magenta().to_string()));
    out.push_str(&format!("Files: {}\n", outcome.reports.len()));
    out.push_str(&format!("Failed: {}\n", outcome.failures.len()));
    out.push_str(&format!("Records committed: {}\n", outcome.records_committed()));
    out.push_str(&format!("{}\n", render_validity(&totals)));
    for line in heuristic_lines(&totals) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Heuristic;
    use std::path::PathBuf;

    fn report(path: &str, valid: &[Heuristic], invalid: usize) -> FileReport {
        let mut stats = RunStatistics::default();
        for h in valid {
            stats.record_valid(*h);
        }
        for _ in 0..invalid {
            stats.record_invalid();
        }
        FileReport {
            path: PathBuf::from(path),
            stats,
            batches_committed: 1,
            records_committed: valid.len(),
        }
    }

    #[test]
    fn snapshot_summary() {
        colored::control::set_override(false);
        let outcome = CorpusOutcome {
            reports: vec![
                report(
                    "dumps/a.txt",
                    &[Heuristic::Standard, Heuristic::Standard, Heuristic::Swapped],
                    1,
                ),
                report("dumps/empty.txt", &[], 0),
            ],
            failures: Vec::new(),
        };
        let s = render_summary(&outcome);
        insta::assert_snapshot!(s, @r"
        breach-import: Credential Dump Ingestion Results

        Files
        ─────

        dumps/a.txt
          Valid: 3 (75.00%) / Invalid: 1 (25.00%)
          Batches: 1 / Records: 3
            standard: 2
            swapped: 1
        dumps/empty.txt
          Valid: 0 (0.00%) / Invalid: 0 (0.00%)
          Batches: 1 / Records: 0

        Totals
        ──────

        Files: 2
        Failed: 0
        Records committed: 3
        Valid: 3 (75.00%) / Invalid: 1 (25.00%)
          standard: 2
          swapped: 1
        ");
    }

    #[test]
    fn zero_line_run_renders_zero_percent() {
        let s = render_validity(&RunStatistics::default());
        assert_eq!(s, "Valid: 0 (0.00%) / Invalid: 0 (0.00%)");
    }

    #[test]
    fn empty_outcome_has_placeholder() {
        colored::control::set_override(false);
        let s = render_summary(&CorpusOutcome::default());
        assert!(s.contains("(No files ingested)"));
        assert!(!s.contains("Failed Files"));
    }
}
