//! In-memory tabular dataset.

use serde::{Deserialize, Serialize};

use crate::schema::{ColumnType, Value};

/// Name and type of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Row-major table of heterogeneous cells.
///
/// Tables are treated as values: the cleaning steps read one table and build
/// the next, so a table handed out is never edited afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create a table. Every row must have one cell per column.
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    /// Build an untyped table from header names and raw cells.
    ///
    /// Null tokens become [`Value::Missing`]; everything else is kept as text.
    pub fn from_raw<S: AsRef<str>>(headers: &[S], rows: &[Vec<S>]) -> Self {
        let columns = headers
            .iter()
            .map(|h| Column::new(h.as_ref(), ColumnType::Unknown))
            .collect();
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|cell| Self::raw_cell(cell.as_ref())).collect())
            .collect();
        Self::new(columns, rows)
    }

    /// Interpret one raw field from a source file.
    pub fn raw_cell(raw: &str) -> Value {
        if Self::is_null_value(raw) {
            Value::Missing
        } else {
            Value::Text(raw.to_string())
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Consume the table, returning its parts.
    pub fn into_parts(self) -> (Vec<Column>, Vec<Vec<Value>>) {
        (self.columns, self.rows)
    }

    /// Get all column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Type of a column by name.
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.column_index(name).map(|i| self.columns[i].column_type)
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Get a column's values by name.
    pub fn column_by_name(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.column_index(name)?;
        Some(self.column_values(index).collect())
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Get a cell by row index and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        self.get(row, self.column_index(column)?)
    }

    /// Number of missing cells in a column.
    pub fn missing_count(&self, index: usize) -> usize {
        self.column_values(index).filter(|v| v.is_missing()).count()
    }

    /// New table holding the rows that satisfy `keep`.
    pub fn filter_rows(&self, mut keep: impl FnMut(&[Value]) -> bool) -> Table {
        let rows = self
            .rows
            .iter()
            .filter(|row| keep(row))
            .cloned()
            .collect();
        Table::new(self.columns.clone(), rows)
    }

    /// View restricted to the given years. An unknown column yields an empty view.
    pub fn filter_years(&self, year_column: &str, years: &[i64]) -> Table {
        let Some(index) = self.column_index(year_column) else {
            return Table::new(self.columns.clone(), Vec::new());
        };
        self.filter_rows(|row| match &row[index] {
            Value::Integer(y) => years.contains(y),
            Value::Float(y) => years.iter().any(|&wanted| wanted as f64 == *y),
            _ => false,
        })
    }

    /// Distinct non-missing integer years in ascending order.
    pub fn distinct_years(&self, year_column: &str) -> Vec<i64> {
        let Some(index) = self.column_index(year_column) else {
            return Vec::new();
        };
        let mut years: Vec<i64> = self
            .column_values(index)
            .filter_map(|v| match v {
                Value::Integer(y) => Some(*y),
                Value::Float(y) if y.fract() == 0.0 => Some(*y as i64),
                _ => None,
            })
            .collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Check if a raw value represents a missing/null value.
    pub fn is_null_value(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || matches!(
                trimmed,
                "NA" | "N/A"
                    | "n/a"
                    | "NULL"
                    | "null"
                    | "NaN"
                    | "nan"
                    | "-NaN"
                    | "-nan"
                    | "None"
                    | "#N/A"
                    | "<NA>"
            )
    }
}
