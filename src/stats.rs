//! Validity statistics for ingested lines.
//!
//! `RunStatistics` is produced per file by the driver and summed by whoever
//! ran it. It is for reporting only; nothing in the pipeline branches on it.
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use crate::classify::Heuristic;

/// Counts of recovered pairs per heuristic.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicCounts {
    pub standard: usize,
    pub comma_corrected: usize,
    pub swapped: usize,
    pub bare_identifier: usize,
}

impl HeuristicCounts {
    fn bump(&mut self, heuristic: Heuristic) {
        match heuristic {
            Heuristic::Standard => self.standard += 1,
            Heuristic::CommaCorrected => self.comma_corrected += 1,
            Heuristic::Swapped => self.swapped += 1,
            Heuristic::BareIdentifier => self.bare_identifier += 1,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Heuristic, usize)> {
        [
            (Heuristic::Standard, self.standard),
            (Heuristic::CommaCorrected, self.comma_corrected),
            (Heuristic::Swapped, self.swapped),
            (Heuristic::BareIdentifier, self.bare_identifier),
        ]
        .into_iter()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStatistics {
    pub valid_count: usize,
    pub invalid_count: usize,
    pub by_heuristic: HeuristicCounts,
}

fn pct(n: usize, d: usize) -> f64 {
    if d == 0 {
        return 0.0;
    }
    (n as f64) / (d as f64) * 100.0
}

impl RunStatistics {
    pub fn record_valid(&mut self, heuristic: Heuristic) {
        self.valid_count += 1;
        self.by_heuristic.bump(heuristic);
    }

    pub fn record_invalid(&mut self) {
        self.invalid_count += 1;
    }

    pub fn total(&self) -> usize {
        self.valid_count + self.invalid_count
    }

    /// Share of valid lines in percent; 0.0 when nothing was processed.
    pub fn percent_valid(&self) -> f64 {
        pct(self.valid_count, self.total())
    }

    /// Share of invalid lines in percent; 0.0 when nothing was processed.
    pub fn percent_invalid(&self) -> f64 {
        pct(self.invalid_count, self.total())
    }
}

impl AddAssign for RunStatistics {
    fn add_assign(&mut self, rhs: Self) {
        self.valid_count += rhs.valid_count;
        self.invalid_count += rhs.invalid_count;
        self.by_heuristic.standard += rhs.by_heuristic.standard;
        self.by_heuristic.comma_corrected += rhs.by_heuristic.comma_corrected;
        self.by_heuristic.swapped += rhs.by_heuristic.swapped;
        self.by_heuristic.bare_identifier += rhs.by_heuristic.bare_identifier;
    }
}

impl Add for RunStatistics {
    type Output = Self;
    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl Sum for RunStatistics {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}
