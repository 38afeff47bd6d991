// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, written to stderr)
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 1 = no website column, 2 = error)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker; // src/checker/ - classification and the two probing phases
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - policy lists and probe settings
mod pipeline; // src/pipeline.rs - column choice, both phases, status column
mod report; // src/report.rs - table / JSON output
mod table; // src/table/ - CSV in/out and column detection

use anyhow::{Context, Result};
use clap::Parser; // Parser trait enables the parse() method
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use checker::{Engine, LogProgress, ReqwestProbe, SystemResolver};
use cli::{CheckArgs, Cli, Commands};
use config::Policy;
use pipeline::check_table;
use report::{print_report, RunReport};
use table::{candidates, Table};

// The #[tokio::main] attribute creates a tokio runtime and runs our async
// code inside it
#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so `--json` output on stdout stays machine-readable.
// RUST_LOG overrides the level picked from --verbose.
fn init_logging(verbose: bool) {
    let default = if verbose {
        "warn,website_status_checker=debug"
    } else {
        "warn,website_status_checker=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    // Only fails if a subscriber is already installed
    let _ = tracing::subscriber::set_global_default(subscriber);
}

// Returns:
//   Ok(0) = results written
//   Ok(1) = no usable website column
//   Err   = anything else (reported as exit code 2)
async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Check(args) => handle_check(args).await,
        Commands::Detect { input, policy } => handle_detect(&input, policy.as_deref()),
    }
}

fn load_policy(path: Option<&Path>) -> Result<Policy> {
    match path {
        Some(path) => {
            let policy = Policy::from_file(path)?;
            info!(path = %path.display(), "loaded policy file");
            Ok(policy)
        }
        None => Ok(Policy::default()),
    }
}

fn load_table(path: &Path) -> Result<Table> {
    let table = Table::from_path(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    info!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.headers().len(),
        "loaded table"
    );
    Ok(table)
}

// Handles the 'check' subcommand
async fn handle_check(args: CheckArgs) -> Result<i32> {
    let policy = load_policy(args.policy.as_deref())?;
    let settings = args.probe_settings();
    let mut table = load_table(&args.input)?;

    let http =
        ReqwestProbe::new(settings.recheck_timeout).context("failed to build HTTP client")?;
    let resolver = SystemResolver::new(settings.fast_timeout);
    let engine = Engine::new(policy, settings, Box::new(resolver), Box::new(http))
        .with_progress(Box::new(LogProgress));

    let started = Instant::now();
    let run = check_table(&mut table, args.column.as_deref(), &args.status_column, &engine);
    let checked = match run.await? {
        Some(checked) => checked,
        None => return Ok(1),
    };
    let elapsed = started.elapsed();

    let output = args.output_path();
    table
        .save(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(path = %output.display(), "wrote results");

    let report = RunReport::new(
        &checked.name,
        &output,
        &checked.records,
        &checked.verification,
        elapsed,
    );
    print_report(&report, args.json)?;

    Ok(0)
}

// Handles the 'detect' subcommand
fn handle_detect(input: &Path, policy: Option<&Path>) -> Result<i32> {
    let policy = load_policy(policy)?;
    let table = load_table(input)?;

    let found = candidates(&table, &policy);
    if found.is_empty() {
        println!("No column header matches the website keywords.");
        return Ok(1);
    }

    println!("{:<40} {:<14} {:<10}", "COLUMN", "SOCIAL RATIO", "VERDICT");
    println!("{}", "=".repeat(66));
    for candidate in &found {
        let verdict = if candidate.accepted { "ok" } else { "social" };
        println!(
            "{:<40} {:<14} {:<10}",
            candidate.name,
            format!("{:.0}%", candidate.social_ratio * 100.0),
            verdict
        );
    }
    println!();

    match found.iter().find(|c| c.accepted) {
        Some(chosen) => {
            println!("✅ Website column: {}", chosen.name);
            Ok(0)
        }
        None => {
            println!("❌ Every candidate is dominated by social links.");
            Ok(1)
        }
    }
}
