// src/checker/aggregate.rs
// =============================================================================
// Result types and the step that merges both probing phases into one
// row-aligned answer.
//
// Every task reports back an (index, outcome) pair. Tasks finish in any
// order, so the index is the only thing that ties an outcome to its row.
// This module is the single place that writes outcomes into the final
// sequence, which is why no locking is needed anywhere else.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

use super::classify::SkipReason;

/// One row of input: its position and the raw cell value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub index: usize,
    pub raw: Option<String>,
}

impl UrlRecord {
    pub fn new(index: usize, raw: Option<String>) -> Self {
        Self { index, raw }
    }

    /// Numbers the values of one column in row order.
    pub fn from_column<I>(values: I) -> Vec<UrlRecord>
    where
        I: IntoIterator<Item = Option<String>>,
    {
        values
            .into_iter()
            .enumerate()
            .map(|(index, raw)| UrlRecord::new(index, raw))
            .collect()
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

/// Final status of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ProbeOutcome {
    Active,
    Inactive,
    Skipped(SkipReason),
}

impl ProbeOutcome {
    /// Label written into the status column of the output table.
    pub fn label(&self) -> &'static str {
        match self {
            ProbeOutcome::Active => "Active",
            ProbeOutcome::Inactive => "Inactive",
            ProbeOutcome::Skipped(SkipReason::Social) => "Skipped (social)",
            ProbeOutcome::Skipped(SkipReason::Empty) => "Skipped (empty)",
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcomes in input row order, exactly one per row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ResultSet(Vec<ProbeOutcome>);

impl ResultSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, index: usize) -> Option<ProbeOutcome> {
        self.0.get(index).copied()
    }

    pub fn labels(&self) -> Vec<String> {
        self.0.iter().map(|o| o.label().to_string()).collect()
    }

    /// Tallies the outcomes in a single pass.
    pub fn summary(&self) -> SummaryCounts {
        let mut counts = SummaryCounts::default();
        for outcome in &self.0 {
            match outcome {
                ProbeOutcome::Active => counts.active += 1,
                ProbeOutcome::Inactive => counts.inactive += 1,
                ProbeOutcome::Skipped(_) => counts.skipped += 1,
            }
        }
        counts
    }
}

impl From<Vec<ProbeOutcome>> for ResultSet {
    fn from(outcomes: Vec<ProbeOutcome>) -> Self {
        Self(outcomes)
    }
}

/// Per-status tally. Always sums to the number of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SummaryCounts {
    pub active: usize,
    pub inactive: usize,
    pub skipped: usize,
}

impl SummaryCounts {
    pub fn total(&self) -> usize {
        self.active + self.inactive + self.skipped
    }
}

// Merges the recheck results into the first-pass outcomes
//
// Parameters:
//   initial: the complete first-pass sequence, already in row order
//   rechecked: (row index, outcome) pairs from the deep recheck
//
// A recheck result only replaces an Inactive slot, and each slot at most
// once. Anything else (out-of-range index, repeated index, slot that was
// not Inactive) is logged and ignored, so rows that were Active or Skipped
// after phase one come out untouched.
pub fn aggregate(
    initial: Vec<ProbeOutcome>,
    rechecked: Vec<(usize, ProbeOutcome)>,
) -> (ResultSet, SummaryCounts) {
    let mut outcomes = initial;
    let mut applied = HashSet::new();

    for (index, outcome) in rechecked {
        if applied.contains(&index) {
            warn!(index, "second recheck result for the same row, ignored");
            continue;
        }
        match outcomes.get_mut(index) {
            Some(slot) if *slot == ProbeOutcome::Inactive => {
                *slot = outcome;
                applied.insert(index);
            }
            Some(other) => {
                warn!(
                    index,
                    current = %other,
                    "recheck result for a row that was not inactive, ignored"
                );
            }
            None => {
                warn!(index, rows = outcomes.len(), "recheck result for an unknown row, ignored");
            }
        }
    }

    let results = ResultSet::from(outcomes);
    let summary = results.summary();
    (results, summary)
}
