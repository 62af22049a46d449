//! Date parsing and year derivation.

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::schema::{ColumnType, Value};
use crate::table::{Column, Table};

/// Formats tried when none are configured. Day-first, as in the source data.
///
/// `%y` precedes `%Y` since chrono's `%Y` also accepts a two-digit year.
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// Result of [`parse_dates`].
#[derive(Debug, Clone)]
pub struct DateParse {
    pub table: Table,
    /// Cells now holding a date.
    pub parsed: usize,
    /// Non-missing cells that matched no format and became missing.
    pub failed: usize,
}

/// Parse one date string with the first format that matches.
pub fn parse_date<S: AsRef<str>>(text: &str, formats: &[S]) -> Option<NaiveDate> {
    let text = text.trim();
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt.as_ref()).ok())
}

/// Convert `column` to dates. Unparseable values become missing, never an error.
///
/// A table without the column is returned unchanged.
pub fn parse_dates<S: AsRef<str>>(table: &Table, column: &str, formats: &[S]) -> DateParse {
    let Some(index) = table.column_index(column) else {
        return DateParse {
            table: table.clone(),
            parsed: 0,
            failed: 0,
        };
    };

    let mut parsed = 0;
    let mut failed = 0;
    let (mut columns, mut rows) = table.clone().into_parts();

    for row in &mut rows {
        let cell = std::mem::take(&mut row[index]);
        row[index] = match cell {
            Value::Missing => Value::Missing,
            Value::Date(d) => Value::Date(d),
            other => match parse_date(&other.to_string(), formats) {
                Some(d) => Value::Date(d),
                None => {
                    failed += 1;
                    Value::Missing
                }
            },
        };
        if !row[index].is_missing() {
            parsed += 1;
        }
    }
    columns[index] = Column::new(column, ColumnType::Date);

    debug!(column, parsed, failed, "parsed dates");
    DateParse {
        table: Table::new(columns, rows),
        parsed,
        failed,
    }
}

/// Append `year_column` holding the calendar year of `date_column`.
///
/// Rows with a missing date get a missing year. Returns `None` when the
/// year column already exists or the date column is absent.
pub fn derive_year(table: &Table, date_column: &str, year_column: &str) -> Option<Table> {
    if table.has_column(year_column) {
        return None;
    }
    let date_index = table.column_index(date_column)?;

    let (mut columns, mut rows) = table.clone().into_parts();
    columns.push(Column::new(year_column, ColumnType::Integer));
    for row in &mut rows {
        let year = row[date_index].as_date().map(|d| i64::from(d.year()));
        row.push(year.into());
    }

    Some(Table::new(columns, rows))
}
