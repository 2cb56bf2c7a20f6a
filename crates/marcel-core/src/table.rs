// In-memory stat tables.
//
// A `StatTable` is an ordered list of column names plus rows of loosely typed
// cells. Nothing about baseball lives here: columns are whatever the source
// file or caller provides, and numeric-ness is inferred per column.

use serde::Serialize;
use std::fmt;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// A single table cell.
///
/// `Missing` doubles as the "undefined" marker for forecast values that could
/// not be computed (division by zero, absent inputs).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    /// Numeric content, if any. NaN counts as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Number(v) => v.is_nan(),
            Value::Text(_) => false,
        }
    }

    /// Wrap a computed number; `None` and non-finite results become `Missing`.
    pub fn from_computed(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Value::Number(v),
            _ => Value::Missing,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) if v.is_nan() => Ok(()),
            Value::Number(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
            Value::Missing => Ok(()),
        }
    }
}

/// Whether every present cell in a column is a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Text,
}

/// Cell contents treated as missing when loading delimited text.
const MISSING_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

// ---------------------------------------------------------------------------
// StatTable
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl StatTable {
    /// An empty table with the given columns.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from explicit rows. Every row must match the column count.
    pub fn from_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, TableError> {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Rows built by the pipeline from a layout are the right width already.
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RaggedRow {
                row: self.rows.len(),
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at `row` in the named column.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// All cells of the named column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// A column is numeric unless it holds at least one text cell. Columns
    /// with no values at all count as numeric.
    pub fn column_kind(&self, idx: usize) -> ColumnKind {
        if self
            .rows
            .iter()
            .any(|r| matches!(r.get(idx), Some(Value::Text(_))))
        {
            ColumnKind::Text
        } else {
            ColumnKind::Numeric
        }
    }

    /// Overwrite the named column, or append it if it does not exist yet.
    ///
    /// `values` must have one entry per row; short input is padded with
    /// `Missing`.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) {
        let mut values = values.into_iter();
        match self.column_index(name) {
            Some(idx) => {
                for row in &mut self.rows {
                    row[idx] = values.next().unwrap_or(Value::Missing);
                }
            }
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(values.next().unwrap_or(Value::Missing));
                }
            }
        }
    }

    /// Concatenate `other` below this table.
    ///
    /// Columns are unioned: columns only in `other` are appended at the end,
    /// and cells a row has no column for are filled with `Missing`. Rows are
    /// not deduplicated.
    pub fn append(&mut self, other: StatTable) {
        for name in &other.columns {
            if !self.has_column(name) {
                self.columns.push(name.clone());
                for row in &mut self.rows {
                    row.push(Value::Missing);
                }
            }
        }

        let mapping: Vec<Option<usize>> = self
            .columns
            .iter()
            .map(|name| other.column_index(name))
            .collect();

        let added = other.rows.len();
        for mut row in other.rows {
            let mapped = mapping
                .iter()
                .map(|src| match src {
                    Some(i) => std::mem::replace(&mut row[*i], Value::Missing),
                    None => Value::Missing,
                })
                .collect();
            self.rows.push(mapped);
        }
        debug!("appended {} rows; table now has {} columns", added, self.columns.len());
    }

    // -----------------------------------------------------------------------
    // Delimited text
    // -----------------------------------------------------------------------

    /// Load a table from CSV text with a header row.
    ///
    /// A column whose every non-missing cell parses as a number is loaded as
    /// numbers; any other column keeps its raw text.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(rdr);
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut raw: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record?;
            raw.push(record.iter().map(str::to_string).collect());
        }

        let numeric: Vec<bool> = (0..columns.len())
            .map(|idx| {
                raw.iter()
                    .map(|r| r[idx].as_str())
                    .filter(|cell| !is_missing_token(cell))
                    .all(|cell| cell.parse::<f64>().is_ok())
            })
            .collect();

        let rows = raw
            .into_iter()
            .map(|cells| {
                cells
                    .into_iter()
                    .zip(&numeric)
                    .map(|(cell, &is_numeric)| parse_cell(cell, is_numeric))
                    .collect()
            })
            .collect();

        Ok(Self { columns, rows })
    }

    /// Load a table from a CSV file.
    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let file = std::fs::File::open(path).map_err(|e| TableError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let table = Self::from_reader(file).map_err(|e| TableError::Csv {
            path: path.display().to_string(),
            source: e,
        })?;
        debug!(
            "loaded {} rows x {} columns from {}",
            table.len(),
            table.columns.len(),
            path.display()
        );
        Ok(table)
    }

    /// Write the table as CSV. Missing cells are written empty.
    pub fn write_csv<W: Write>(&self, wtr: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(wtr);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|v| v.to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn is_missing_token(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell)
}

fn parse_cell(cell: String, numeric_column: bool) -> Value {
    if is_missing_token(&cell) {
        return Value::Missing;
    }
    if numeric_column {
        if let Ok(v) = cell.parse::<f64>() {
            return Value::Number(v);
        }
    }
    Value::Text(cell)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_infers_numeric_and_text_columns() {
        let csv_data = "\
Name,playerid,Season,PA,Team
Mike Trout,10155,2018,608,LAA
Aaron Judge,15640,2018,498,NYY";

        let table = StatTable::from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(table.columns(), &["Name", "playerid", "Season", "PA", "Team"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_kind(0), ColumnKind::Text);
        assert_eq!(table.column_kind(1), ColumnKind::Numeric);
        assert_eq!(table.column_kind(3), ColumnKind::Numeric);
        assert_eq!(table.value(1, "PA"), Some(&Value::Number(498.0)));
        assert_eq!(table.value(0, "Team"), Some(&Value::Text("LAA".into())));
    }

    #[test]
    fn csv_missing_tokens_keep_column_numeric() {
        let csv_data = "\
playerid,HBP,IBB
1,,3
2,NA,NaN
3,4,2";

        let table = StatTable::from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(table.column_kind(1), ColumnKind::Numeric);
        assert_eq!(table.value(0, "HBP"), Some(&Value::Missing));
        assert_eq!(table.value(1, "HBP"), Some(&Value::Missing));
        assert_eq!(table.value(1, "IBB"), Some(&Value::Missing));
        assert_eq!(table.value(2, "HBP"), Some(&Value::Number(4.0)));
    }

    #[test]
    fn csv_mixed_column_keeps_raw_text() {
        let csv_data = "\
playerid,Season
sa917940,2018
10155,2018";

        let table = StatTable::from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(table.column_kind(0), ColumnKind::Text);
        assert_eq!(table.value(1, "playerid"), Some(&Value::Text("10155".into())));
    }

    #[test]
    fn csv_cells_are_trimmed() {
        let csv_data = "\
Name , PA
  Mike Trout  , 608 ";

        let table = StatTable::from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(table.columns(), &["Name", "PA"]);
        assert_eq!(table.value(0, "Name"), Some(&Value::Text("Mike Trout".into())));
        assert_eq!(table.value(0, "PA"), Some(&Value::Number(608.0)));
    }

    #[test]
    fn csv_ragged_row_is_an_error() {
        let csv_data = "\
playerid,PA
1,600
2";
        assert!(StatTable::from_reader(csv_data.as_bytes()).is_err());
    }

    #[test]
    fn from_rows_rejects_wrong_width() {
        let err = StatTable::from_rows(["a", "b"], vec![vec![Value::from(1.0)]]).unwrap_err();
        match err {
            TableError::RaggedRow { expected, found, .. } => {
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("expected RaggedRow, got: {other}"),
        }
    }

    #[test]
    fn from_path_missing_file_is_io_error() {
        let err = StatTable::from_path(Path::new("/nonexistent/marcel/hitters.csv")).unwrap_err();
        assert!(matches!(err, TableError::Io { .. }));
    }

    #[test]
    fn append_unions_columns_and_fills_missing() {
        let mut base = StatTable::from_rows(
            ["playerid", "PA"],
            vec![vec![Value::from(1), Value::from(600.0)]],
        )
        .unwrap();
        let extra = StatTable::from_rows(
            ["HR", "playerid"],
            vec![vec![Value::from(30.0), Value::from(2)]],
        )
        .unwrap();

        base.append(extra);
        assert_eq!(base.columns(), &["playerid", "PA", "HR"]);
        assert_eq!(base.rows()[0], vec![Value::from(1), Value::from(600.0), Value::Missing]);
        assert_eq!(base.rows()[1], vec![Value::from(2), Value::Missing, Value::from(30.0)]);
    }

    #[test]
    fn append_keeps_duplicate_rows() {
        let row = vec![Value::from(1), Value::from(2018)];
        let mut base = StatTable::from_rows(["playerid", "Season"], vec![row.clone()]).unwrap();
        let again = base.clone();
        base.append(again);
        assert_eq!(base.len(), 2);
        assert_eq!(base.rows()[1], row);
    }

    #[test]
    fn set_column_overwrites_or_appends() {
        let mut table = StatTable::from_rows(
            ["playerid", "AVG"],
            vec![
                vec![Value::from(1), Value::from(0.1)],
                vec![Value::from(2), Value::from(0.2)],
            ],
        )
        .unwrap();

        table.set_column("AVG", vec![Value::from(0.3), Value::Missing]);
        table.set_column("OPS", vec![Value::from(0.9)]);

        assert_eq!(table.columns(), &["playerid", "AVG", "OPS"]);
        assert_eq!(table.value(0, "AVG"), Some(&Value::Number(0.3)));
        assert_eq!(table.value(1, "AVG"), Some(&Value::Missing));
        assert_eq!(table.value(1, "OPS"), Some(&Value::Missing));
    }

    #[test]
    fn write_csv_leaves_missing_cells_empty() {
        let table = StatTable::from_rows(
            ["Name", "Season", "OBP"],
            vec![vec![Value::from("Mike Trout"), Value::from(2019), Value::Missing]],
        )
        .unwrap();

        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "Name,Season,OBP\nMike Trout,2019,\n");
    }

    #[test]
    fn from_computed_rejects_non_finite() {
        assert_eq!(Value::from_computed(Some(0.25)), Value::Number(0.25));
        assert_eq!(Value::from_computed(Some(f64::INFINITY)), Value::Missing);
        assert_eq!(Value::from_computed(Some(f64::NAN)), Value::Missing);
        assert_eq!(Value::from_computed(None), Value::Missing);
    }
}
