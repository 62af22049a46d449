//! Delimited file loader that tolerates malformed rows.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::sniff::{detect_delimiter_in_bytes, ShortSamplePolicy, DEFAULT_SAMPLE_LINES};
use super::source::{Encoding, LoadWarning, SourceFile, SourceMetadata};
use crate::error::{Result, RoadcrashError};
use crate::schema::ColumnType;
use crate::table::{Column, Table};

/// Loader configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Encoding of every source file.
    pub encoding: Encoding,
    /// Lines inspected for delimiter detection.
    pub sample_lines: usize,
    /// Behaviour for files shorter than `sample_lines`.
    pub short_sample: ShortSamplePolicy,
    /// Quote character.
    pub quote: u8,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            encoding: Encoding::Latin1,
            sample_lines: DEFAULT_SAMPLE_LINES,
            short_sample: ShortSamplePolicy::Fail,
            quote: b'"',
        }
    }
}

/// A successfully loaded source.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    /// Raw cells, text or missing.
    pub table: Table,
    pub metadata: SourceMetadata,
    /// Rows skipped while reading.
    pub warnings: Vec<LoadWarning>,
}

/// Loads delimited accident files.
pub struct Loader {
    config: LoaderConfig,
}

impl Loader {
    /// Create a new loader with default configuration.
    pub fn new() -> Self {
        Self {
            config: LoaderConfig::default(),
        }
    }

    /// Create a loader with custom configuration.
    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load a configured source, detecting its delimiter.
    pub fn load(&self, source: &SourceFile) -> Result<LoadedFile> {
        self.load_file(&source.year, &source.path, None)
    }

    /// Load a file with a known delimiter, skipping detection.
    pub fn load_with_delimiter(&self, path: impl AsRef<Path>, delimiter: u8) -> Result<LoadedFile> {
        self.load_file("", path.as_ref(), Some(delimiter))
    }

    fn load_file(&self, year: &str, path: &Path, delimiter: Option<u8>) -> Result<LoadedFile> {
        let contents = fs::read(path).map_err(|e| RoadcrashError::io(path, e))?;
        let size_bytes = contents.len() as u64;

        let delimiter = match delimiter {
            Some(d) => d,
            None => detect_delimiter_in_bytes(
                &contents,
                path,
                self.config.encoding,
                self.config.sample_lines,
                self.config.short_sample,
            )?,
        };
        debug!(
            path = %path.display(),
            delimiter = %(delimiter as char).escape_default(),
            "loading source"
        );

        let text = self
            .config
            .encoding
            .decode(&contents)
            .ok_or_else(|| RoadcrashError::Encoding {
                path: path.to_path_buf(),
                encoding: self.config.encoding.label().to_string(),
            })?;

        let (table, warnings) = self.parse_text(&text, delimiter, path)?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let metadata = SourceMetadata {
            year: year.to_string(),
            file: path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.to_path_buf(),
            hash,
            size_bytes,
            delimiter: delimiter as char,
            encoding: self.config.encoding,
            row_count: table.row_count(),
            column_count: table.column_count(),
            malformed_rows: warnings.len(),
            loaded_at: Utc::now(),
        };

        Ok(LoadedFile {
            table,
            metadata,
            warnings,
        })
    }

    /// Split decoded text into a raw table, dropping rows of the wrong width.
    fn parse_text(&self, text: &str, delimiter: u8, path: &Path) -> Result<(Table, Vec<LoadWarning>)> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|s| s.trim().to_string())
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(RoadcrashError::EmptyData(format!(
                "no header row in '{}'",
                path.display()
            )));
        }

        let headers = unique_headers(headers);
        let expected = headers.len();
        let mut rows = Vec::new();
        let mut warnings = Vec::new();

        for result in reader.records() {
            let record = result?;
            if record.len() != expected {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                warn!(
                    path = %path.display(),
                    line,
                    expected,
                    found = record.len(),
                    "skipping malformed row"
                );
                warnings.push(LoadWarning::MalformedRow {
                    path: path.to_path_buf(),
                    line,
                    expected,
                    found: record.len(),
                });
                continue;
            }
            rows.push(record.iter().map(Table::raw_cell).collect());
        }

        let columns = headers
            .into_iter()
            .map(|name| Column::new(name, ColumnType::Unknown))
            .collect();

        Ok((Table::new(columns, rows), warnings))
    }
}

/// Name blank headers `Unnamed: <i>` and suffix repeats with `.1`, `.2`, ...
fn unique_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut unique = Vec::with_capacity(headers.len());

    for (index, header) in headers.into_iter().enumerate() {
        let base = if header.is_empty() {
            format!("Unnamed: {}", index)
        } else {
            header
        };
        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        if name != base {
            debug!(header = %base, renamed = %name, "renaming repeated header");
        }
        seen.insert(name.clone());
        unique.push(name);
    }
    unique
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
