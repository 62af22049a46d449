//! Consolidation of the yearly sources into one canonical dataset.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::clean::{self, CleaningConfig, ColumnFill};
use crate::error::{Result, RoadcrashError};
use crate::input::{LoadWarning, Loader, LoaderConfig, SourceFile, SourceMetadata};
use crate::schema::{Schema, SchemaReport};
use crate::table::{Column, Table};

/// Year column name used when the schema declares none.
pub const DEFAULT_YEAR_COLUMN: &str = "year";

/// Everything that determines a consolidated dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Year label to file path, in load order.
    pub sources: IndexMap<String, PathBuf>,
    /// Loader options.
    #[serde(flatten)]
    pub loader: LoaderConfig,
    /// Cleaning options.
    #[serde(flatten)]
    pub cleaning: CleaningConfig,
    /// Expected columns.
    #[serde(default)]
    pub schema: Schema,
}

impl Default for PipelineConfig {
    /// One `<year>.csv` per year from 2021 to 2024, in the working directory.
    fn default() -> Self {
        Self::new((2021..=2024).map(|year| (year.to_string(), format!("{}.csv", year))))
    }
}

impl PipelineConfig {
    /// Create a configuration from year/path pairs with default options.
    pub fn new<Y, P>(sources: impl IntoIterator<Item = (Y, P)>) -> Self
    where
        Y: Into<String>,
        P: Into<PathBuf>,
    {
        Self {
            sources: sources
                .into_iter()
                .map(|(year, path)| (year.into(), path.into()))
                .collect(),
            loader: LoaderConfig::default(),
            cleaning: CleaningConfig::default(),
            schema: Schema::default(),
        }
    }

    /// Set the loader options.
    pub fn with_loader(mut self, loader: LoaderConfig) -> Self {
        self.loader = loader;
        self
    }

    /// Set the cleaning options.
    pub fn with_cleaning(mut self, cleaning: CleaningConfig) -> Self {
        self.cleaning = cleaning;
        self
    }

    /// Set the expected columns.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Parse a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        if config.sources.is_empty() {
            return Err(RoadcrashError::Config("no sources configured".to_string()));
        }
        if config.loader.sample_lines == 0 {
            return Err(RoadcrashError::Config(
                "sample_lines must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    /// Load a JSON configuration file.
    ///
    /// Relative source paths are resolved against the file's directory.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| RoadcrashError::io(path, e))?;
        let mut config = Self::from_json_str(&json)?;

        if let Some(base) = path.parent() {
            for source in config.sources.values_mut() {
                if source.is_relative() {
                    *source = base.join(&*source);
                }
            }
        }
        Ok(config)
    }

    /// Configured sources in load order.
    pub fn source_files(&self) -> Vec<SourceFile> {
        self.sources
            .iter()
            .map(|(year, path)| SourceFile::new(year, path))
            .collect()
    }

    /// Stable digest of the whole configuration, source order included.
    pub fn fingerprint(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("sha256:{:x}", hasher.finalize()))
    }
}

/// What happened during consolidation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsolidationReport {
    /// Sources that loaded, in load order.
    pub sources: Vec<SourceMetadata>,
    /// Dropped files and dropped rows.
    pub warnings: Vec<LoadWarning>,
    /// Schema presence check on the concatenated columns.
    pub schema: SchemaReport,
    /// Final columns and their types.
    pub columns: Vec<Column>,
    /// Text columns whose gaps were filled with the mode.
    pub filled: Vec<ColumnFill>,
    /// Text columns with no value to impute from.
    pub empty_columns: Vec<String>,
    /// Exact duplicate rows removed.
    pub duplicates_removed: usize,
    /// Date cells parsed.
    pub dates_parsed: usize,
    /// Date cells that matched no format.
    pub dates_unparsed: usize,
    /// Whether the year column was derived from the date.
    pub year_derived: bool,
    /// Rows in the canonical dataset.
    pub row_count: usize,
}

impl ConsolidationReport {
    /// Number of files that failed to load.
    pub fn files_failed(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, LoadWarning::FileLoad { .. }))
            .count()
    }

    /// Number of rows skipped as malformed.
    pub fn rows_skipped(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, LoadWarning::MalformedRow { .. }))
            .count()
    }
}

/// The canonical dataset and the report of how it was built.
#[derive(Debug, Clone)]
pub struct Consolidation {
    pub table: Table,
    pub report: ConsolidationReport,
}

/// Loads every configured source and cleans the result.
pub struct Consolidator {
    config: PipelineConfig,
    loader: Loader,
}

impl Consolidator {
    /// Create a consolidator for a configuration.
    pub fn new(config: PipelineConfig) -> Self {
        let loader = Loader::with_config(config.loader.clone());
        Self { config, loader }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load, merge and clean all configured sources.
    ///
    /// A source that cannot be read is reported and skipped. Fails with
    /// [`RoadcrashError::NoDataLoaded`] when none can.
    pub fn consolidate(&self) -> Result<Consolidation> {
        let mut tables = Vec::new();
        let mut report = ConsolidationReport::default();

        for source in self.config.source_files() {
            match self.loader.load(&source) {
                Ok(loaded) => {
                    debug!(
                        year = %source.year,
                        rows = loaded.metadata.row_count,
                        columns = loaded.metadata.column_count,
                        "loaded source"
                    );
                    report.warnings.extend(loaded.warnings);
                    report.sources.push(loaded.metadata);
                    tables.push(loaded.table);
                }
                Err(e) => {
                    warn!(year = %source.year, path = %source.path.display(), error = %e, "dropping source");
                    report.warnings.push(LoadWarning::FileLoad {
                        year: source.year.clone(),
                        path: source.path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if tables.is_empty() {
            return Err(RoadcrashError::NoDataLoaded {
                attempted: self.config.sources.len(),
            });
        }
        info!(
            loaded = tables.len(),
            configured = self.config.sources.len(),
            "sources loaded"
        );

        self.clean_into(&tables, report)
    }

    /// Run the cleaning steps on tables already in memory.
    pub fn clean(&self, tables: &[Table]) -> Result<Consolidation> {
        if tables.is_empty() {
            return Err(RoadcrashError::NoDataLoaded { attempted: 0 });
        }
        self.clean_into(tables, ConsolidationReport::default())
    }

    fn clean_into(&self, tables: &[Table], mut report: ConsolidationReport) -> Result<Consolidation> {
        let cleaning = &self.config.cleaning;
        let schema = &self.config.schema;

        let merged = clean::infer_types(&clean::concat(tables), cleaning.decimal_comma);

        report.schema = schema.check(merged.column_names());
        if !report.schema.is_satisfied() {
            return Err(RoadcrashError::MissingColumns {
                columns: report.schema.missing_required.clone(),
            });
        }
        if !report.schema.missing_optional.is_empty() {
            debug!(columns = ?report.schema.missing_optional, "optional columns absent");
        }

        let imputation = clean::impute_modes(&merged, cleaning.empty_column)?;
        report.filled = imputation.filled;
        report.empty_columns = imputation.empty_columns;

        let (mut table, removed) = clean::drop_duplicates(&imputation.table);
        report.duplicates_removed = removed;

        if let Some(date_column) = schema.date_column().filter(|c| table.has_column(c)) {
            let dates = clean::parse_dates(&table, date_column, &cleaning.date_formats);
            report.dates_parsed = dates.parsed;
            report.dates_unparsed = dates.failed;
            if dates.failed > 0 {
                warn!(column = date_column, count = dates.failed, "unparseable dates set to missing");
            }
            table = dates.table;

            let year_column = schema.year_column().unwrap_or(DEFAULT_YEAR_COLUMN);
            if dates.parsed > 0 {
                if let Some(with_year) = clean::derive_year(&table, date_column, year_column) {
                    table = with_year;
                    report.year_derived = true;
                }
            }
        }

        report.columns = table.columns().to_vec();
        report.row_count = table.row_count();
        info!(
            rows = report.row_count,
            columns = report.columns.len(),
            duplicates = report.duplicates_removed,
            "consolidation complete"
        );

        Ok(Consolidation { table, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::EmptyColumnPolicy;
    use crate::schema::{ColumnType, FieldKind, FieldSpec, Value};
    use std::io::Write;
    use tempfile::TempDir;

    fn schema() -> Schema {
        Schema::empty().with_date_column("date").with_year_column("year")
    }

    /// Configuration for cleaning tables already in memory.
    fn in_memory() -> PipelineConfig {
        PipelineConfig::new(Vec::<(String, PathBuf)>::new()).with_schema(schema())
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_clean_runs_steps_in_order() {
        let a = Table::from_raw(
            &["date", "cause"],
            &[vec!["15/03/2022", "rain"], vec!["16/03/2022", ""]],
        );
        // Imputation makes the last row equal to the second; dedup then drops it.
        let b = Table::from_raw(&["date", "cause"], &[vec!["16/03/2022", "rain"]]);

        let consolidator = Consolidator::new(in_memory());
        let result = consolidator.clean(&[a, b]).unwrap();

        assert_eq!(result.table.row_count(), 2);
        assert_eq!(result.report.duplicates_removed, 1);
        assert!(result.report.year_derived);
        assert_eq!(result.table.column_type("date"), Some(ColumnType::Date));
        assert_eq!(result.table.value(1, "year"), Some(&Value::Integer(2022)));
    }

    #[test]
    fn test_unparseable_dates_produce_no_year() {
        let table = Table::from_raw(&["date", "cause"], &[vec!["soon", "rain"]]);
        let consolidator = Consolidator::new(in_memory());
        let result = consolidator.clean(&[table]).unwrap();

        assert_eq!(result.report.dates_unparsed, 1);
        assert!(!result.report.year_derived);
        assert!(!result.table.has_column("year"));
        assert_eq!(result.table.value(0, "date"), Some(&Value::Missing));
    }

    #[test]
    fn test_required_column_missing() {
        let schema = schema().with_field(FieldSpec::required("uf", FieldKind::Text));
        let consolidator = Consolidator::new(in_memory().with_schema(schema));
        let table = Table::from_raw(&["date"], &[vec!["2022-01-01"]]);

        match consolidator.clean(&[table]) {
            Err(RoadcrashError::MissingColumns { columns }) => assert_eq!(columns, vec!["uf"]),
            other => panic!("expected MissingColumns, got {:?}", other.map(|c| c.report)),
        }
    }

    #[test]
    fn test_empty_column_policy_is_applied() {
        let config = in_memory().with_cleaning(CleaningConfig {
            empty_column: EmptyColumnPolicy::Fail,
            ..CleaningConfig::default()
        });
        let table = Table::from_raw(&["cause", "notes"], &[vec!["rain", ""]]);

        let result = Consolidator::new(config).clean(&[table]);
        assert!(matches!(result, Err(RoadcrashError::UndefinedMode { .. })));
    }

    #[test]
    fn test_failed_sources_are_skipped() {
        let dir = TempDir::new().unwrap();
        let good = write(&dir, "2022.csv", "date,cause\n01/01/2022,rain\n02/01/2022,fog\n03/01/2022,rain\n04/01/2022,sun\n");
        let config = PipelineConfig::new([("2021", dir.path().join("missing.csv")), ("2022", good)])
            .with_schema(schema());

        let result = Consolidator::new(config).consolidate().unwrap();
        assert_eq!(result.report.sources.len(), 1);
        assert_eq!(result.report.files_failed(), 1);
        assert_eq!(result.table.row_count(), 4);
    }

    #[test]
    fn test_short_source_is_dropped_not_fatal() {
        let dir = TempDir::new().unwrap();
        let short = write(&dir, "2021.csv", "date,cause\n01/01/2021,rain\n");
        let good = write(&dir, "2022.csv", "date,cause\n01/01/2022,rain\n02/01/2022,fog\n03/01/2022,rain\n04/01/2022,sun\n");
        let config = PipelineConfig::new([("2021", short), ("2022", good)]).with_schema(schema());

        let result = Consolidator::new(config).consolidate().unwrap();
        match &result.report.warnings[0] {
            LoadWarning::FileLoad { year, reason, .. } => {
                assert_eq!(year, "2021");
                assert!(reason.contains("delimiter detection"));
            }
            other => panic!("unexpected warning {:?}", other),
        }
    }

    #[test]
    fn test_no_data_loaded() {
        let config = PipelineConfig::new([("2021", "/nonexistent/2021.csv"), ("2022", "/nonexistent/2022.csv")]);
        match Consolidator::new(config).consolidate() {
            Err(RoadcrashError::NoDataLoaded { attempted }) => assert_eq!(attempted, 2),
            other => panic!("expected NoDataLoaded, got {:?}", other.map(|c| c.report)),
        }
    }

    #[test]
    fn test_config_from_json_file_resolves_paths() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "sources.json",
            r#"{
                "sources": {"2022": "2022.csv", "2021": "/data/2021.csv"},
                "encoding": "utf8",
                "short_sample": "use_available",
                "empty_column": "drop"
            }"#,
        );

        let config = PipelineConfig::from_json_file(&path).unwrap();
        let sources = config.source_files();
        assert_eq!(sources[0].year, "2022");
        assert_eq!(sources[0].path, dir.path().join("2022.csv"));
        assert_eq!(sources[1].path, PathBuf::from("/data/2021.csv"));
        assert_eq!(config.loader.encoding, crate::input::Encoding::Utf8);
        assert_eq!(config.loader.sample_lines, 5);
        assert_eq!(config.cleaning.empty_column, EmptyColumnPolicy::Drop);
        assert_eq!(config.schema, Schema::default());
    }

    #[test]
    fn test_config_rejects_empty_sources() {
        assert!(matches!(
            PipelineConfig::from_json_str(r#"{"sources": {}}"#),
            Err(RoadcrashError::Config(_))
        ));
        assert!(matches!(
            PipelineConfig::from_json_str("{}"),
            Err(RoadcrashError::Json(_))
        ));
    }

    #[test]
    fn test_fingerprint_depends_on_source_order() {
        let a = PipelineConfig::new([("2021", "a.csv"), ("2022", "b.csv")]);
        let b = PipelineConfig::new([("2022", "b.csv"), ("2021", "a.csv")]);
        assert_eq!(a.fingerprint().unwrap(), a.clone().fingerprint().unwrap());
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn test_default_sources() {
        let config = PipelineConfig::default();
        let years: Vec<&str> = config.sources.keys().map(String::as_str).collect();
        assert_eq!(years, vec!["2021", "2022", "2023", "2024"]);
        assert_eq!(config.sources["2023"], PathBuf::from("2023.csv"));
    }
}
