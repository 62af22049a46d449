//! Handoff of the canonical dataset as a comma-separated file.

use std::io::Write;
use std::path::Path;

use crate::clean::{self, CleaningConfig};
use crate::error::{Result, RoadcrashError};
use crate::input::{Encoding, Loader, LoaderConfig};
use crate::schema::Schema;
use crate::table::Table;

/// Write `table` as UTF-8 CSV with a header row.
///
/// Dates are written as `YYYY-MM-DD` and missing cells as empty fields.
pub fn write_csv(table: &Table, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path).map_err(|e| RoadcrashError::io(path, e))?;
    write_csv_to(table, file)
}

/// Write `table` as CSV to any writer.
pub fn write_csv_to<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(table.column_names())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Read a file written by [`write_csv`] back into a typed table.
///
/// Column types are inferred again and the schema's date column is parsed
/// with the configured formats.
pub fn read_csv(path: impl AsRef<Path>, cleaning: &CleaningConfig, schema: &Schema) -> Result<Table> {
    let loader = Loader::with_config(LoaderConfig {
        encoding: Encoding::Utf8,
        ..LoaderConfig::default()
    });
    let loaded = loader.load_with_delimiter(path, b',')?;
    let table = clean::infer_types(&loaded.table, false);

    Ok(match schema.date_column() {
        Some(column) => clean::parse_dates(&table, column, &cleaning.date_formats).table,
        None => table,
    })
}
