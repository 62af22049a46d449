//! Cleaning steps applied to the consolidated table.
//!
//! Each step reads a [`Table`](crate::Table) and builds a new one, so the
//! steps can be run and tested on their own. The consolidator runs them in
//! a fixed order: concatenate, infer types, impute, deduplicate, parse dates,
//! derive the year.

mod coerce;
mod concat;
mod dates;
mod dedup;
mod impute;

pub use coerce::{infer_column_type, infer_types};
pub use concat::concat;
pub use dates::{derive_year, parse_date, parse_dates, DateParse, DEFAULT_DATE_FORMATS};
pub use dedup::drop_duplicates;
pub use impute::{column_mode, impute_modes, ColumnFill, EmptyColumnPolicy, Imputation};

use serde::{Deserialize, Serialize};

/// Options for the cleaning steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Handling of text columns with no value to take a mode from.
    pub empty_column: EmptyColumnPolicy,
    /// Accept `12,5` as a float when inferring column types.
    pub decimal_comma: bool,
    /// `chrono` formats tried, in order, on the date column.
    pub date_formats: Vec<String>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            empty_column: EmptyColumnPolicy::Keep,
            decimal_comma: false,
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}
