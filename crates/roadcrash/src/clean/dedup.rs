//! Exact-duplicate row removal.

use std::collections::HashSet;

use crate::schema::Value;
use crate::table::Table;

/// Drop rows equal in every column to an earlier row.
///
/// The first occurrence is kept and row order is otherwise preserved.
/// Returns the new table and the number of rows removed.
pub fn drop_duplicates(table: &Table) -> (Table, usize) {
    let mut seen: HashSet<&[Value]> = HashSet::with_capacity(table.row_count());
    let mut rows = Vec::with_capacity(table.row_count());
    for row in table.rows() {
        if seen.insert(row.as_slice()) {
            rows.push(row.clone());
        }
    }

    let removed = table.row_count() - rows.len();
    (Table::new(table.columns().to_vec(), rows), removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_appended_is_removed() {
        let table = Table::from_raw(
            &["id", "cause"],
            &[vec!["1", "rain"], vec!["2", "fog"], vec!["1", "rain"]],
        );
        let (deduped, removed) = drop_duplicates(&table);

        assert_eq!(removed, 1);
        assert_eq!(deduped.row_count(), table.row_count() - 1);
        assert_eq!(deduped.rows(), &table.rows()[..2]);
    }

    #[test]
    fn test_first_occurrence_kept_in_place() {
        let table = Table::from_raw(
            &["x"],
            &[vec!["b"], vec!["a"], vec!["b"], vec!["c"], vec!["a"]],
        );
        let (deduped, removed) = drop_duplicates(&table);

        assert_eq!(removed, 2);
        let values: Vec<String> = deduped.column_values(0).map(|v| v.to_string()).collect();
        assert_eq!(values, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_missing_cells_compare_equal() {
        let table = Table::from_raw(&["a", "b"], &[vec!["x", ""], vec!["x", "NA"]]);
        let (deduped, removed) = drop_duplicates(&table);
        assert_eq!(removed, 1);
        assert_eq!(deduped.row_count(), 1);
    }

    #[test]
    fn test_rows_differing_in_one_column_survive() {
        let table = Table::from_raw(&["a", "b"], &[vec!["x", "1"], vec!["x", "2"]]);
        let (_, removed) = drop_duplicates(&table);
        assert_eq!(removed, 0);
    }
}
