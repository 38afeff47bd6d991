// src/checker/engine.rs
// =============================================================================
// The two-phase verification pipeline.
//
//   records ──classify──> skipped rows (final) + rows to probe
//                              │
//                   phase 1: resolve every host  (big pool, short timeout)
//                              │  barrier: wait for ALL of phase 1
//                   phase 2: HEAD every Inactive  (small pool, long timeout)
//                              │
//                          aggregate ──> ResultSet + SummaryCounts
//
// Phase 2 cannot start early: its job list is "everything phase 1 marked
// Inactive", which is only known once phase 1 has drained.
// =============================================================================

use std::time::Duration;
use tracing::info;

use super::aggregate::{aggregate, ProbeOutcome, ResultSet, SummaryCounts, UrlRecord};
use super::classify::{classify, Verdict};
use super::dns::{fast_probe, Resolver};
use super::http::{recheck_probe, HttpProbe};
use super::pool::run_bounded;
use crate::config::{Policy, ProbeSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Resolve,
    Recheck,
}

/// Receives coarse progress updates. Purely informational.
pub trait ProgressSink: Send + Sync {
    fn advance(&self, phase: Phase, done: usize, total: usize);
}

/// Ignores progress.
#[derive(Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn advance(&self, _phase: Phase, _done: usize, _total: usize) {}
}

/// Logs progress roughly every tenth of a phase.
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn advance(&self, phase: Phase, done: usize, total: usize) {
        let step = (total / 10).max(1);
        if done % step == 0 || done == total {
            info!(?phase, done, total, "progress");
        }
    }
}

/// Result of a full run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub results: ResultSet,
    pub summary: SummaryCounts,
    /// How many rows went through the deep recheck.
    pub rechecked: usize,
}

pub struct Engine {
    policy: Policy,
    settings: ProbeSettings,
    resolver: Box<dyn Resolver>,
    http: Box<dyn HttpProbe>,
    progress: Box<dyn ProgressSink>,
}

impl Engine {
    pub fn new(
        policy: Policy,
        settings: ProbeSettings,
        resolver: Box<dyn Resolver>,
        http: Box<dyn HttpProbe>,
    ) -> Self {
        Self {
            policy,
            settings: settings.clamped(),
            resolver,
            http,
            progress: Box::new(NoProgress),
        }
    }

    pub fn with_progress(mut self, progress: Box<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    // Runs both phases over the records
    //
    // records must be numbered 0..n in row order (UrlRecord::from_column
    // does that). The returned ResultSet has exactly one entry per record.
    pub async fn run(&self, records: &[UrlRecord]) -> Verification {
        // Skipped rows are final right away. Rows to probe start as Inactive
        // and phase 1 overwrites them.
        let mut outcomes = Vec::with_capacity(records.len());
        let mut to_resolve = Vec::new();
        for (position, record) in records.iter().enumerate() {
            debug_assert_eq!(record.index, position, "records must be numbered in row order");
            match classify(record.raw(), &self.policy) {
                Verdict::Skipped(reason) => outcomes.push(ProbeOutcome::Skipped(reason)),
                Verdict::Probe => {
                    outcomes.push(ProbeOutcome::Inactive);
                    to_resolve.push((position, record.raw().unwrap_or_default().to_string()));
                }
            }
        }

        info!(
            rows = records.len(),
            probing = to_resolve.len(),
            workers = self.settings.fast_workers,
            "phase 1: resolving hosts"
        );
        for (index, outcome) in self.resolve_all(to_resolve).await {
            outcomes[index] = outcome;
        }

        // Barrier: phase 1 is complete, now we know what is ambiguous
        let to_recheck: Vec<(usize, String)> = outcomes
            .iter()
            .enumerate()
            .filter(|(_, outcome)| **outcome == ProbeOutcome::Inactive)
            .filter_map(|(index, _)| {
                records[index].raw().map(|raw| (index, raw.to_string()))
            })
            .collect();
        let rechecked = to_recheck.len();

        info!(
            rechecking = rechecked,
            workers = self.settings.recheck_workers,
            "phase 2: rechecking unresolved hosts over HTTP"
        );
        let recheck_results = self.recheck_all(to_recheck).await;

        let (results, summary) = aggregate(outcomes, recheck_results);
        debug_assert_eq!(results.len(), records.len());
        info!(
            active = summary.active,
            inactive = summary.inactive,
            skipped = summary.skipped,
            "verification finished"
        );

        Verification {
            results,
            summary,
            rechecked,
        }
    }

    async fn resolve_all(&self, jobs: Vec<(usize, String)>) -> Vec<(usize, ProbeOutcome)> {
        let total = jobs.len();
        let resolver = self.resolver.as_ref();
        let timeout: Duration = self.settings.fast_timeout;

        run_bounded(
            jobs,
            self.settings.fast_workers,
            |done| self.progress.advance(Phase::Resolve, done, total),
            move |url| async move { fast_probe(resolver, &url, timeout).await },
        )
        .await
    }

    async fn recheck_all(&self, jobs: Vec<(usize, String)>) -> Vec<(usize, ProbeOutcome)> {
        let total = jobs.len();
        let http = self.http.as_ref();
        let timeout = self.settings.recheck_timeout;
        let force_https = self.settings.force_https;

        run_bounded(
            jobs,
            self.settings.recheck_workers,
            |done| self.progress.advance(Phase::Recheck, done, total),
            move |url| async move { recheck_probe(http, &url, timeout, force_https).await },
        )
        .await
    }
}
