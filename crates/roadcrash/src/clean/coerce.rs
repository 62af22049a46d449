//! Column type inference and value coercion.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::{ColumnType, Value};
use crate::table::{Column, Table};

// Decimal comma as written in Brazilian exports, e.g. "-23,5505".
static DECIMAL_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d*,\d+$").unwrap());

/// Infer every column's type over the whole table and coerce its cells.
///
/// A column is `Integer` when every non-missing cell parses as `i64`, else
/// `Float` when every one parses as a finite `f64`, else `String`. Columns
/// with no value at all are `Unknown`. Text cells of `String` columns are
/// kept verbatim.
pub fn infer_types(table: &Table, decimal_comma: bool) -> Table {
    let types: Vec<ColumnType> = (0..table.column_count())
        .map(|i| infer_column_type(table.column_values(i), decimal_comma))
        .collect();

    let columns = table
        .columns()
        .iter()
        .zip(&types)
        .map(|(c, t)| Column::new(c.name.clone(), *t))
        .collect();

    let rows = table
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .zip(&types)
                .map(|(v, t)| coerce(v, *t, decimal_comma))
                .collect()
        })
        .collect();

    Table::new(columns, rows)
}

/// Narrowest type that holds every non-missing value.
pub fn infer_column_type<'a>(
    values: impl IntoIterator<Item = &'a Value>,
    decimal_comma: bool,
) -> ColumnType {
    let mut seen = false;
    let mut all_integer = true;
    let mut all_float = true;

    for value in values {
        if value.is_missing() {
            continue;
        }
        seen = true;
        let text = value.to_string();
        if all_integer && parse_integer(&text).is_none() {
            all_integer = false;
        }
        if parse_float(&text, decimal_comma).is_none() {
            all_float = false;
            break;
        }
    }

    match (seen, all_integer, all_float) {
        (false, _, _) => ColumnType::Unknown,
        (true, true, true) => ColumnType::Integer,
        (true, false, true) => ColumnType::Float,
        _ => ColumnType::String,
    }
}

fn coerce(value: &Value, column_type: ColumnType, decimal_comma: bool) -> Value {
    if value.is_missing() {
        return Value::Missing;
    }
    match column_type {
        ColumnType::Integer => parse_integer(&value.to_string()).into(),
        ColumnType::Float => parse_float(&value.to_string(), decimal_comma).into(),
        ColumnType::String => match value {
            Value::Text(_) => value.clone(),
            other => Value::Text(other.to_string()),
        },
        ColumnType::Date | ColumnType::Unknown => value.clone(),
    }
}

fn parse_integer(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

fn parse_float(text: &str, decimal_comma: bool) -> Option<f64> {
    let trimmed = text.trim();
    let parsed = if decimal_comma && DECIMAL_COMMA.is_match(trimmed) {
        trimmed.replace(',', ".").parse::<f64>().ok()
    } else {
        trimmed.parse::<f64>().ok()
    };
    parsed.filter(|f| f.is_finite())
}
