//! Table models for the conversion pipeline.
//!
//! - [`SourceTable`] - The uploaded CSV, headers trimmed, cells kept as raw bytes
//! - [`SourceRow`] - One source row coerced to text, looked up by column name
//! - [`TargetRow`] - Ordered `(column, value)` pairs, duplicate names allowed
//! - [`TargetTable`] - The declared target header plus converted rows

use csv::ByteRecord;
use serde::Serialize;
use std::collections::HashMap;

use crate::error::{ConvertError, CsvResult};

/// Cell values read as missing (the pandas `read_csv` default NA set).
pub const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Whether a raw cell value stands for "no value".
pub fn is_missing(value: &str) -> bool {
    NA_TOKENS.contains(&value)
}

// =============================================================================
// Source side
// =============================================================================

/// An uploaded CSV table.
///
/// Header names are trimmed on construction; lookups are exact and
/// case-sensitive against the trimmed names. When two headers trim to the same
/// name the first one wins.
#[derive(Debug, Clone)]
pub struct SourceTable {
    original_headers: Vec<String>,
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<ByteRecord>,
}

impl SourceTable {
    /// Build a table from raw header names and byte records.
    pub fn new(original_headers: Vec<String>, rows: Vec<ByteRecord>) -> Self {
        let headers: Vec<String> = original_headers
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut index = HashMap::with_capacity(headers.len());
        for (i, h) in headers.iter().enumerate() {
            index.entry(h.clone()).or_insert(i);
        }

        Self {
            original_headers,
            headers,
            index,
            rows,
        }
    }

    /// Build a table from string cells.
    pub fn from_strings<H, R, C>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let headers = headers.into_iter().map(Into::into).collect();
        let rows = rows
            .into_iter()
            .map(|cells| {
                let mut record = ByteRecord::new();
                for cell in cells {
                    record.push_field(cell.as_ref().as_bytes());
                }
                record
            })
            .collect();
        Self::new(headers, rows)
    }

    /// Trimmed header names, in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Headers that changed when trimmed, as `(original, trimmed)`.
    pub fn renamed_headers(&self) -> Vec<(String, String)> {
        self.original_headers
            .iter()
            .zip(&self.headers)
            .filter(|(original, trimmed)| original != trimmed)
            .map(|(original, trimmed)| (original.clone(), trimmed.clone()))
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Coerce row `idx` to text.
    ///
    /// Fails with [`ConvertError::RowProcessing`] if a cell is not valid UTF-8
    /// or the row does not exist.
    pub fn row(&self, idx: usize) -> Result<SourceRow<'_>, ConvertError> {
        let record = self.rows.get(idx).ok_or_else(|| ConvertError::RowProcessing {
            row: idx,
            column: None,
            cause: format!("row index out of range ({} rows)", self.rows.len()),
        })?;

        let cells = record
            .iter()
            .enumerate()
            .map(|(col, bytes)| {
                std::str::from_utf8(bytes).map_err(|e| ConvertError::RowProcessing {
                    row: idx,
                    column: self.headers.get(col).cloned(),
                    cause: format!("cell is not valid UTF-8: {}", e),
                })
            })
            .collect::<Result<Vec<&str>, _>>()?;

        Ok(SourceRow {
            index: &self.index,
            cells,
        })
    }
}

/// One source row, coerced to text.
#[derive(Debug, Clone)]
pub struct SourceRow<'a> {
    index: &'a HashMap<String, usize>,
    cells: Vec<&'a str>,
}

impl<'a> SourceRow<'a> {
    /// Whether the column exists in the source schema.
    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The raw cell, `None` if the column is absent or the row is short.
    pub fn raw(&self, name: &str) -> Option<&'a str> {
        self.index
            .get(name)
            .and_then(|&i| self.cells.get(i))
            .copied()
    }

    /// The cell value, `None` when absent or an NA token.
    pub fn value(&self, name: &str) -> Option<&'a str> {
        self.raw(name).filter(|v| !is_missing(v))
    }

    /// The trimmed cell value, `None` when absent, NA or blank.
    pub fn non_blank(&self, name: &str) -> Option<&'a str> {
        self.value(name)
            .map(str::trim)
            .filter(|v| !v.is_empty() && !is_missing(v))
    }
}

// =============================================================================
// Target side
// =============================================================================

/// One converted row: `(column, value)` pairs in declared order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetRow {
    cells: Vec<(String, String)>,
}

impl TargetRow {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.cells.push((column.into(), value.into()));
    }

    /// First value for a column name.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for a column name, in order (e.g. both `Tag` cells).
    pub fn get_all(&self, column: &str) -> Vec<&str> {
        self.cells
            .iter()
            .filter(|(name, _)| name == column)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// The converted table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTable {
    pub header: Vec<String>,
    pub rows: Vec<TargetRow>,
}

impl TargetTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Serialize as a download-ready CSV file.
    pub fn to_csv_bytes(&self) -> CsvResult<Vec<u8>> {
        crate::parser::write_csv(self)
    }

    /// First `n` rows as plain value lists, for display.
    pub fn preview(&self, n: usize) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .take(n)
            .map(|r| r.values().map(str::to_string).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_are_trimmed_and_reported() {
        let table = SourceTable::from_strings(
            [" first_name", "last_name ", "city"],
            [["Jane", "Doe", "Springfield"]],
        );

        assert_eq!(table.headers(), &["first_name", "last_name", "city"]);
        assert_eq!(
            table.renamed_headers(),
            vec![
                (" first_name".to_string(), "first_name".to_string()),
                ("last_name ".to_string(), "last_name".to_string()),
            ]
        );
        assert!(table.has_column("first_name"));
        assert!(!table.has_column(" first_name"));
    }

    #[test]
    fn test_trimming_is_idempotent() {
        let once = SourceTable::from_strings(["  a  ", "b"], Vec::<Vec<&str>>::new());
        let twice = SourceTable::from_strings(once.headers().to_vec(), Vec::<Vec<&str>>::new());
        assert_eq!(once.headers(), twice.headers());
        assert!(twice.renamed_headers().is_empty());
    }

    #[test]
    fn test_duplicate_header_first_wins() {
        let table = SourceTable::from_strings(["city", " city"], [["first", "second"]]);
        let row = table.row(0).unwrap();
        assert_eq!(row.raw("city"), Some("first"));
    }

    #[test]
    fn test_missing_values() {
        let table = SourceTable::from_strings(["a", "b", "c", "d"], [vec!["nan", "  ", "x"]]);
        let row = table.row(0).unwrap();

        assert_eq!(row.value("a"), None);
        assert_eq!(row.value("b"), Some("  "));
        assert_eq!(row.non_blank("b"), None);
        assert_eq!(row.non_blank("c"), Some("x"));
        // short row
        assert!(row.has_column("d"));
        assert_eq!(row.raw("d"), None);
        assert_eq!(row.raw("zzz"), None);
    }

    #[test]
    fn test_invalid_utf8_is_row_error() {
        let mut record = ByteRecord::new();
        record.push_field(b"ok");
        record.push_field(&[0xff, 0xfe]);
        let table = SourceTable::new(vec!["a".into(), "b".into()], vec![ByteRecord::new(), record]);

        assert!(table.row(0).is_ok());
        match table.row(1) {
            Err(ConvertError::RowProcessing { row, column, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(column.as_deref(), Some("b"));
            }
            other => panic!("expected row error, got {:?}", other),
        }
    }

    #[test]
    fn test_target_row_duplicates() {
        let mut row = TargetRow::default();
        row.push("Tag", "Homeowner");
        row.push("Tag", "Sellers");
        row.push("Notes", "");

        assert_eq!(row.get("Tag"), Some("Homeowner"));
        assert_eq!(row.get_all("Tag"), vec!["Homeowner", "Sellers"]);
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["Tag", "Tag", "Notes"]);
        assert_eq!(row.len(), 3);
    }
}
