//! roadcrash: ingestion and cleaning of multi-year traffic accident records.
//!
//! Yearly exports arrive as delimited text with an unknown separator, a
//! latin-1 family encoding and a column set that drifts between years.
//! roadcrash turns a set of them into one canonical table for a dashboard.
//!
//! # Pipeline
//!
//! 1. Sniff each file's delimiter from its first lines
//! 2. Load it, skipping rows with the wrong number of fields
//! 3. Concatenate all years with column-union semantics
//! 4. Fill gaps in text columns with the column's mode
//! 5. Drop exact duplicate rows
//! 6. Parse the date column and derive the year
//!
//! # Example
//!
//! ```no_run
//! use roadcrash::{Consolidator, PipelineConfig};
//!
//! let config = PipelineConfig::new([("2021", "2021.csv"), ("2022", "2022.csv")]);
//! let result = Consolidator::new(config).consolidate().unwrap();
//!
//! println!("Rows: {}", result.table.row_count());
//! println!("Duplicates removed: {}", result.report.duplicates_removed);
//! ```

pub mod cache;
pub mod clean;
pub mod error;
pub mod export;
pub mod input;
pub mod schema;
pub mod stats;

mod pipeline;
mod table;

pub use cache::DatasetCache;
pub use clean::{CleaningConfig, EmptyColumnPolicy};
pub use error::{Result, RoadcrashError};
pub use input::{Encoding, LoadWarning, Loader, LoaderConfig, ShortSamplePolicy, SourceFile, SourceMetadata};
pub use pipeline::{
    Consolidation, ConsolidationReport, Consolidator, PipelineConfig, DEFAULT_YEAR_COLUMN,
};
pub use schema::{ColumnType, FieldKind, FieldSpec, Schema, SchemaReport, Value};
pub use table::{Column, Table};
