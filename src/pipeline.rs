// src/pipeline.rs
// =============================================================================
// One `check` run over a loaded table, minus the file I/O:
//
// 1. Pick the website column (forced by name, or detected)
// 2. Number its values and run both phases over them
// 3. Insert the status column right after the website column
//
// When step 1 finds nothing the engine is never started.
// =============================================================================

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::checker::{Engine, UrlRecord, Verification};
use crate::config::Policy;
use crate::table::{detect_column, Table};

/// What a finished run produced, besides the modified table.
#[derive(Debug)]
pub struct CheckedColumn {
    pub name: String,
    pub records: Vec<UrlRecord>,
    pub verification: Verification,
}

// Runs the engine over the website column of `table`
//
// Parameters:
//   table: the input, gets the status column on success
//   forced: column name given on the command line, skips detection
//   status_column: header of the inserted column
//   engine: configured with the policy used for detection
//
// Returns: Ok(None) when there is no usable website column
pub async fn check_table(
    table: &mut Table,
    forced: Option<&str>,
    status_column: &str,
    engine: &Engine,
) -> Result<Option<CheckedColumn>> {
    let column = match select_column(table, forced, engine.policy()) {
        Some(index) => index,
        None => return Ok(None),
    };
    let name = table.headers()[column].clone();
    info!(column = %name, "found website column");

    let records = UrlRecord::from_column(table.column(column).map(|cell| cell.map(str::to_string)));
    let verification = engine.run(&records).await;

    table
        .insert_after(column, status_column, verification.results.labels())
        .context("failed to add the status column")?;

    Ok(Some(CheckedColumn {
        name,
        records,
        verification,
    }))
}

fn select_column(table: &Table, forced: Option<&str>, policy: &Policy) -> Option<usize> {
    match forced {
        Some(name) => match table.column_index(name) {
            Ok(index) => Some(index),
            Err(e) => {
                error!("{}", e);
                None
            }
        },
        None => {
            let found = detect_column(table, policy);
            if found.is_none() {
                error!(
                    "could not find a valid website column (run `detect` to see the candidates)"
                );
            }
            found
        }
    }
}
