//! Source files, their metadata, and recoverable load warnings.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text encoding of the source files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Latin-1 family, decoded as windows-1252. Never fails.
    ///
    /// Bytes 0x80-0x9F map to the windows-1252 printable characters (`€`,
    /// `‘`, ...) rather than the C1 control codes strict ISO-8859-1 gives.
    /// Exports saved from Windows tools use those bytes for punctuation.
    #[default]
    #[serde(alias = "latin-1", alias = "iso-8859-1", alias = "windows-1252")]
    Latin1,
    /// Strict UTF-8.
    #[serde(alias = "utf-8")]
    Utf8,
}

impl Encoding {
    /// Decode raw bytes, or `None` if they are invalid in this encoding.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Encoding::Latin1 => {
                let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
                Some(text.into_owned())
            }
            Encoding::Utf8 => encoding_rs::UTF_8
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.trim_start_matches('\u{feff}').to_string()),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Encoding::Latin1 => "latin1",
            Encoding::Utf8 => "utf-8",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "latin1" | "latin-1" | "iso-8859-1" | "windows-1252" => Ok(Encoding::Latin1),
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            other => Err(format!("unsupported encoding '{}'", other)),
        }
    }
}

/// One configured input: a reporting year and the file holding it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceFile {
    /// Year label, e.g. "2021".
    pub year: String,
    /// Path to the delimited text file.
    pub path: PathBuf,
}

impl SourceFile {
    pub fn new(year: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            year: year.into(),
            path: path.into(),
        }
    }
}

/// Metadata about a source file that loaded successfully.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Year label the file was configured under.
    pub year: String,
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Delimiter used to split fields.
    pub delimiter: char,
    /// Encoding the file was decoded with.
    pub encoding: Encoding,
    /// Number of data rows kept (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// Rows dropped for having the wrong number of fields.
    pub malformed_rows: usize,
    /// When the file was loaded.
    pub loaded_at: DateTime<Utc>,
}

/// A recoverable problem met while loading sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadWarning {
    /// A whole file was dropped.
    FileLoad {
        year: String,
        path: PathBuf,
        reason: String,
    },
    /// One row was dropped for having the wrong number of fields.
    MalformedRow {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::FileLoad { year, path, reason } => write!(
                f,
                "could not load {} ({}): {}",
                path.display(),
                year,
                reason
            ),
            LoadWarning::MalformedRow {
                path,
                line,
                expected,
                found,
            } => write!(
                f,
                "{}:{}: expected {} fields, saw {}; row skipped",
                path.display(),
                line,
                expected,
                found
            ),
        }
    }
}

/// Human-readable name of a delimiter byte.
pub fn delimiter_name(delimiter: u8) -> &'static str {
    match delimiter {
        b',' => "comma",
        b';' => "semicolon",
        b'\t' => "tab",
        b'|' => "pipe",
        _ => "other",
    }
}
