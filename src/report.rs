// src/report.rs
// =============================================================================
// Prints the outcome of a run, either as a table for humans or as JSON
// for scripts. Logs go to stderr, so stdout only ever carries the report.
// =============================================================================

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

use crate::checker::{ProbeOutcome, SummaryCounts, UrlRecord, Verification};

/// One line of the report.
#[derive(Debug, Clone, Serialize)]
pub struct RowReport {
    /// 1-based data row number, as a spreadsheet would show it
    pub row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub outcome: ProbeOutcome,
}

/// Everything a caller needs to know about a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub column: String,
    pub output: String,
    pub total: usize,
    pub rechecked: usize,
    pub summary: SummaryCounts,
    pub elapsed_secs: f64,
    pub results: Vec<RowReport>,
}

impl RunReport {
    pub fn new(
        column: &str,
        output: &Path,
        records: &[UrlRecord],
        verification: &Verification,
        elapsed: Duration,
    ) -> Self {
        let results = records
            .iter()
            .filter_map(|record| {
                verification.results.get(record.index).map(|outcome| RowReport {
                    row: record.index + 1,
                    url: record.raw.clone(),
                    outcome,
                })
            })
            .collect();

        Self {
            column: column.to_string(),
            output: output.display().to_string(),
            total: verification.summary.total(),
            rechecked: verification.rechecked,
            summary: verification.summary,
            // two decimals is plenty for a human
            elapsed_secs: (elapsed.as_secs_f64() * 100.0).round() / 100.0,
            results,
        }
    }
}

// Prints the report either as a table or JSON
pub fn print_report(report: &RunReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print_table(report);
    }
    Ok(())
}

fn print_table(report: &RunReport) {
    println!("{:<6} {:<60} {:<20}", "ROW", "URL", "STATUS");
    println!("{}", "=".repeat(88));

    for row in &report.results {
        let url = row.url.as_deref().unwrap_or("");
        println!("{:<6} {:<60} {:<20}", row.row, truncate(url, 57), format_status(&row.outcome));
    }

    println!();
    println!("📄 Column checked: {}", report.column);
    println!("💾 Written to: {}", report.output);
    println!("⏱️  Time taken: {} seconds", report.elapsed_secs);
    println!();
    println!("📊 Summary:");
    println!("   🟢 Active: {}", report.summary.active);
    println!("   🔴 Inactive: {}", report.summary.inactive);
    println!("   ⚪ Skipped: {}", report.summary.skipped);
    println!("   📋 Total: {} ({} rechecked over HTTP)", report.total, report.rechecked);
}

fn format_status(outcome: &ProbeOutcome) -> String {
    match outcome {
        ProbeOutcome::Active => format!("🟢 {outcome}"),
        ProbeOutcome::Inactive => format!("🔴 {outcome}"),
        ProbeOutcome::Skipped(_) => format!("⚪ {outcome}"),
    }
}

// Cuts long urls for display, respecting char boundaries
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}
