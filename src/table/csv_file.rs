// src/table/csv_file.rs
// =============================================================================
// An in-memory table loaded from (and written back to) a CSV file.
//
// Cells are stored as Option<String>: an empty field becomes None, which
// is the "absent value" marker the rest of the program understands.
//
// The only modification we ever make is inserting the status column right
// after the website column.
// =============================================================================

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("could not open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("the file has no header row")]
    NoHeader,
    #[error("no column named '{0}'")]
    UnknownColumn(String),
    #[error("status column '{0}' would replace the website column itself")]
    StatusColumnClash(String),
    #[error("got {got} status values for {expected} rows")]
    LengthMismatch { expected: usize, got: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = headers.len();
        let rows = rows.into_iter().map(|row| fit_row(row, width)).collect();
        Self { headers, rows }
    }

    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let file = File::open(path).map_err(|source| TableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(file)
    }

    // Parses CSV with a header row
    //
    // Rows may be ragged: short rows are padded with empty cells, extra
    // trailing cells are dropped (with a warning) so every row has exactly
    // one cell per header.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err(TableError::NoHeader);
        }

        let mut rows = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() > headers.len() {
                warn!(
                    row = line + 1,
                    cells = record.len(),
                    "row is wider than the header, extra cells dropped"
                );
            }
            let row = record
                .iter()
                .map(|cell| if cell.is_empty() { None } else { Some(cell.to_string()) })
                .collect();
            rows.push(row);
        }

        Ok(Self::new(headers, rows))
    }

    pub fn save(&self, path: &Path) -> Result<(), TableError> {
        let file = File::create(path).map_err(|source| TableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.write_to(file)
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), TableError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Looks a column up by name: exact match first, then ignoring case.
    pub fn column_index(&self, name: &str) -> Result<usize, TableError> {
        let name = name.trim();
        self.headers
            .iter()
            .position(|h| h == name)
            .or_else(|| self.headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name)))
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, index: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).and_then(|cell| cell.as_deref()))
    }

    // Inserts `values` as a new column directly after `source`
    //
    // An existing column with the same header is removed first, so running
    // the tool on its own output replaces the old statuses instead of
    // adding a second status column.
    pub fn insert_after(
        &mut self,
        source: usize,
        header: &str,
        values: Vec<String>,
    ) -> Result<(), TableError> {
        if values.len() != self.rows.len() {
            return Err(TableError::LengthMismatch {
                expected: self.rows.len(),
                got: values.len(),
            });
        }
        if source >= self.headers.len() {
            return Err(TableError::UnknownColumn(format!("#{source}")));
        }

        let mut source = source;
        if let Some(existing) = self.headers.iter().position(|h| h == header) {
            if existing == source {
                return Err(TableError::StatusColumnClash(header.to_string()));
            }
            self.remove_column(existing);
            if existing < source {
                source -= 1;
            }
        }

        let at = source + 1;
        self.headers.insert(at, header.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(at, Some(value));
        }
        Ok(())
    }

    fn remove_column(&mut self, index: usize) {
        self.headers.remove(index);
        for row in &mut self.rows {
            row.remove(index);
        }
    }
}

fn fit_row(mut row: Vec<Option<String>>, width: usize) -> Vec<Option<String>> {
    row.resize(width, None);
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(text: &str) -> Table {
        Table::from_reader(text.as_bytes()).unwrap()
    }

    fn to_string(table: &Table) -> String {
        let mut out = Vec::new();
        table.write_to(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_empty_cells_are_absent() {
        let table = load("Name,Website\nAcme,acme.com\nBlank,\n");
        let cells: Vec<_> = table.column(1).collect();
        assert_eq!(cells, vec![Some("acme.com"), None]);
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let table = load("Name,Website,City\nAcme\nBeta,beta.io,Oslo,extra\n");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column(2).collect::<Vec<_>>(), vec![None, Some("Oslo")]);
    }

    #[test]
    fn test_missing_header_is_an_error() {
        let err = Table::from_reader("".as_bytes()).unwrap_err();
        assert!(matches!(err, TableError::NoHeader));
    }

    #[test]
    fn test_column_index_ignores_case() {
        let table = load("Name,Company_Domain\n");
        assert_eq!(table.column_index("company_domain").unwrap(), 1);
        assert!(matches!(
            table.column_index("missing"),
            Err(TableError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_insert_after_source_column() {
        let mut table = load("Name,Website,City\nAcme,acme.com,Oslo\nBeta,,Rome\n");
        table
            .insert_after(1, "Website Status", vec!["Active".into(), "Skipped (empty)".into()])
            .unwrap();

        assert_eq!(
            to_string(&table),
            "Name,Website,Website Status,City\n\
             Acme,acme.com,Active,Oslo\n\
             Beta,,Skipped (empty),Rome\n"
        );
    }

    #[test]
    fn test_insert_replaces_previous_status_column() {
        let mut table = load("Website Status,Name,Website\nold,Acme,acme.com\n");
        table.insert_after(2, "Website Status", vec!["Inactive".into()]).unwrap();

        assert_eq!(table.headers(), &["Name", "Website", "Website Status"]);
        assert_eq!(to_string(&table), "Name,Website,Website Status\nAcme,acme.com,Inactive\n");
    }

    #[test]
    fn test_insert_checks_length() {
        let mut table = load("Website\na.com\nb.com\n");
        let err = table.insert_after(0, "Status", vec!["Active".into()]).unwrap_err();
        assert!(matches!(err, TableError::LengthMismatch { expected: 2, got: 1 }));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let table = load("Name,Website\n\"Acme, Inc\",acme.com\n");

        table.save(&path).unwrap();
        assert_eq!(Table::from_path(&path).unwrap(), table);
    }
}
