//! Descriptive statistics over a table.
//!
//! These are the numbers a dashboard formats: a per-column summary of the
//! numeric columns and frequency tables for categorical ones.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::schema::Value;
use crate::table::Table;

/// Running mean and variance using Welford's algorithm.
#[derive(Debug, Clone, Default)]
struct RunningStats {
    count: usize,
    mean: f64,
    m2: f64, // Sum of squared differences from mean
}

impl RunningStats {
    fn add(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    /// Sample standard deviation; undefined below two values.
    fn std(&self) -> Option<f64> {
        (self.count >= 2).then(|| (self.m2 / (self.count - 1) as f64).sqrt())
    }
}

/// Summary of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    /// Non-missing values.
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

/// Occurrences of one value in a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Summarise every numeric column, in column order.
pub fn describe(table: &Table) -> Vec<ColumnSummary> {
    table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.column_type.is_numeric())
        .map(|(i, c)| summarize(&c.name, table.column_values(i)))
        .collect()
}

fn summarize<'a>(column: &str, values: impl Iterator<Item = &'a Value>) -> ColumnSummary {
    let mut stats = RunningStats::default();
    let mut sorted: Vec<f64> = Vec::new();
    for value in values.filter_map(Value::as_f64) {
        stats.add(value);
        sorted.push(value);
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let has_values = !sorted.is_empty();
    ColumnSummary {
        column: column.to_string(),
        count: stats.count,
        mean: has_values.then_some(stats.mean),
        std: stats.std(),
        min: sorted.first().copied(),
        q1: percentile(&sorted, 0.25),
        median: percentile(&sorted, 0.5),
        q3: percentile(&sorted, 0.75),
        max: sorted.last().copied(),
    }
}

/// Linearly interpolated percentile of sorted values, `p` in `0..=1`.
fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = p * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Frequency of each non-missing value in `column`, most frequent first.
///
/// Ties are ordered by value. Returns `None` if the column does not exist.
pub fn value_counts(table: &Table, column: &str) -> Option<Vec<ValueCount>> {
    let index = table.column_index(column)?;

    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in table.column_values(index).filter(|v| !v.is_missing()) {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }

    let mut counts: Vec<ValueCount> = counts
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    Some(counts)
}
