// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::ProbeSettings;

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "website-status-checker",
    version,
    about = "Check which websites listed in a CSV file are still alive",
    long_about = "website-status-checker finds the website column of a CSV file, skips \
                  social-media and empty entries, and marks every other row Active or Inactive. \
                  Hosts are first resolved through DNS; the ones that fail get a second chance \
                  with an HTTP HEAD request. The result is written back as a new column next \
                  to the website column."
)]
pub struct Cli {
    /// Print debug-level logs (per-row decisions) to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every website in a CSV file and write the augmented file
    ///
    /// Example: website-status-checker check leads.csv --output checked.csv
    Check(CheckArgs),

    /// Only show which column would be checked, and why
    ///
    /// Example: website-status-checker detect leads.csv
    Detect {
        /// CSV file with a header row
        input: PathBuf,

        /// JSON file overriding the social domains / column keywords
        #[arg(long)]
        policy: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// CSV file with a header row
    pub input: PathBuf,

    /// Where to write the result (default: <input>_status.csv next to the input)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Use this column instead of detecting one
    #[arg(long)]
    pub column: Option<String>,

    /// Header of the inserted status column
    #[arg(long, default_value = "Website Status")]
    pub status_column: String,

    /// JSON file overriding the social domains / column keywords
    #[arg(long)]
    pub policy: Option<PathBuf>,

    /// Seconds allowed for one DNS lookup (phase one)
    #[arg(long, default_value_t = 2.0)]
    pub fast_timeout: f64,

    /// Seconds allowed for one HTTP recheck (phase two)
    #[arg(long, default_value_t = 6.0)]
    pub recheck_timeout: f64,

    /// Maximum DNS lookups in flight at once
    #[arg(long, default_value_t = 100)]
    pub fast_workers: usize,

    /// Maximum HTTP rechecks in flight at once
    #[arg(long, default_value_t = 25)]
    pub recheck_workers: usize,

    /// Recheck http:// urls over plain HTTP instead of upgrading them to HTTPS
    #[arg(long)]
    pub allow_plain_http: bool,

    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,
}

impl CheckArgs {
    pub fn probe_settings(&self) -> ProbeSettings {
        ProbeSettings {
            fast_timeout: seconds(self.fast_timeout),
            recheck_timeout: seconds(self.recheck_timeout),
            fast_workers: self.fast_workers,
            recheck_workers: self.recheck_workers,
            force_https: !self.allow_plain_http,
        }
        .clamped()
    }

    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => {
                let stem = self
                    .input
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "websites".to_string());
                self.input.with_file_name(format!("{stem}_status.csv"))
            }
        }
    }
}

// Negative, NaN or absurd values fall back to something usable
fn seconds(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f64(value.min(3600.0))
    } else {
        Duration::from_millis(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_args(args: &[&str]) -> CheckArgs {
        let mut argv = vec!["website-status-checker", "check"];
        argv.extend_from_slice(args);
        match Cli::parse_from(argv).command {
            Commands::Check(args) => args,
            other => panic!("expected check, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_match_probe_settings() {
        let settings = check_args(&["leads.csv"]).probe_settings();
        let defaults = ProbeSettings::default();
        assert_eq!(settings.fast_timeout, defaults.fast_timeout);
        assert_eq!(settings.recheck_timeout, defaults.recheck_timeout);
        assert_eq!(settings.fast_workers, defaults.fast_workers);
        assert_eq!(settings.recheck_workers, defaults.recheck_workers);
        assert!(settings.force_https);
    }

    #[test]
    fn test_overrides() {
        let args = check_args(&[
            "leads.csv",
            "--fast-timeout",
            "0.5",
            "--recheck-workers",
            "0",
            "--allow-plain-http",
            "--column",
            "Homepage",
        ]);
        let settings = args.probe_settings();
        assert_eq!(settings.fast_timeout, Duration::from_millis(500));
        assert_eq!(settings.recheck_workers, 1);
        assert!(!settings.force_https);
        assert_eq!(args.column.as_deref(), Some("Homepage"));
        assert_eq!(args.status_column, "Website Status");
    }

    #[test]
    fn test_default_output_path() {
        let args = check_args(&["data/leads.csv"]);
        assert_eq!(args.output_path(), PathBuf::from("data/leads_status.csv"));

        let args = check_args(&["leads.csv", "-o", "out.csv"]);
        assert_eq!(args.output_path(), PathBuf::from("out.csv"));
    }

    #[test]
    fn test_global_verbose_flag() {
        let cli = Cli::parse_from(["website-status-checker", "detect", "a.csv", "--verbose"]);
        assert!(cli.verbose);
    }
}
