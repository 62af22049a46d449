//! Mode imputation for text columns.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, RoadcrashError};
use crate::schema::Value;
use crate::table::{Column, Table};

/// What to do with a text column that has no value to take a mode from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyColumnPolicy {
    /// Leave the column missing and report it.
    #[default]
    Keep,
    /// Remove the column from the table.
    Drop,
    /// Abort with [`RoadcrashError::UndefinedMode`].
    Fail,
}

/// Fill applied to one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFill {
    pub column: String,
    /// The mode written into the missing cells.
    pub value: String,
    /// Number of cells filled.
    pub count: usize,
}

/// Result of [`impute_modes`].
#[derive(Debug, Clone)]
pub struct Imputation {
    pub table: Table,
    /// Columns that had gaps, with the value used.
    pub filled: Vec<ColumnFill>,
    /// Text columns with no value at all (kept or dropped per policy).
    pub empty_columns: Vec<String>,
}

/// Most frequent text value; ties go to the smallest value.
pub fn column_mode<'a>(values: impl IntoIterator<Item = &'a Value>) -> Option<&'a str> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        if let Value::Text(text) = value {
            *counts.entry(text.as_str()).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.cmp(a)))
        .map(|(value, _)| value)
}

/// Replace missing cells of every text-valued column with the column's mode.
///
/// Numeric and date columns are left alone. The mode is taken over the whole
/// table passed in. Running this on its own output changes nothing.
pub fn impute_modes(table: &Table, policy: EmptyColumnPolicy) -> Result<Imputation> {
    let mut fills: Vec<Option<Value>> = vec![None; table.column_count()];
    let mut keep = vec![true; table.column_count()];
    let mut filled = Vec::new();
    let mut empty_columns = Vec::new();

    for (index, column) in table.columns().iter().enumerate() {
        if !column.column_type.is_text() {
            continue;
        }
        let missing = table.missing_count(index);
        if missing == 0 {
            continue;
        }

        match column_mode(table.column_values(index)) {
            Some(mode) => {
                debug!(column = %column.name, mode, missing, "imputing missing values");
                filled.push(ColumnFill {
                    column: column.name.clone(),
                    value: mode.to_string(),
                    count: missing,
                });
                fills[index] = Some(Value::Text(mode.to_string()));
            }
            None => match policy {
                EmptyColumnPolicy::Fail => {
                    return Err(RoadcrashError::UndefinedMode {
                        column: column.name.clone(),
                    });
                }
                EmptyColumnPolicy::Keep => {
                    warn!(column = %column.name, "column has no values; left missing");
                    empty_columns.push(column.name.clone());
                }
                EmptyColumnPolicy::Drop => {
                    warn!(column = %column.name, "column has no values; dropped");
                    empty_columns.push(column.name.clone());
                    keep[index] = false;
                }
            },
        }
    }

    let columns: Vec<Column> = table
        .columns()
        .iter()
        .zip(&keep)
        .filter(|(_, k)| **k)
        .map(|(c, _)| c.clone())
        .collect();

    let rows = table
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .zip(fills.iter().zip(&keep))
                .filter(|(_, (_, k))| **k)
                .map(|(value, (fill, _))| match (value, fill) {
                    (Value::Missing, Some(fill)) => fill.clone(),
                    _ => value.clone(),
                })
                .collect()
        })
        .collect();

    Ok(Imputation {
        table: Table::new(columns, rows),
        filled,
        empty_columns,
    })
}
