// src/table/mod.rs
// =============================================================================
// The tabular side of the tool: reading the uploaded CSV, finding the
// website column, and writing the augmented CSV back out.
// =============================================================================

mod csv_file;
mod detect;

pub use csv_file::Table;
pub use detect::{candidates, detect_column};
