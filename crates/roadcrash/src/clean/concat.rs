//! Row-wise concatenation with column-union semantics.

use indexmap::IndexSet;

use crate::schema::{ColumnType, Value};
use crate::table::{Column, Table};

/// Stack tables vertically.
///
/// Columns are ordered by first appearance across the inputs; rows from a
/// table lacking a column get [`Value::Missing`] there. Column types are
/// reset to `Unknown` and must be inferred again.
pub fn concat(tables: &[Table]) -> Table {
    let names: IndexSet<&str> = tables.iter().flat_map(|t| t.column_names()).collect();

    let mut rows = Vec::with_capacity(tables.iter().map(Table::row_count).sum());
    for table in tables {
        let positions: Vec<Option<usize>> = names.iter().map(|n| table.column_index(n)).collect();
        for row in table.rows() {
            rows.push(
                positions
                    .iter()
                    .map(|pos| pos.map(|i| row[i].clone()).unwrap_or(Value::Missing))
                    .collect(),
            );
        }
    }

    let columns = names
        .into_iter()
        .map(|name| Column::new(name, ColumnType::Unknown))
        .collect();

    Table::new(columns, rows)
}
