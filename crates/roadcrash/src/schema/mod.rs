//! Column types, cell values and the expected-field schema.

mod fields;
mod types;

pub use fields::{FieldKind, FieldSpec, Schema, SchemaReport};
pub use types::{ColumnType, Value};
