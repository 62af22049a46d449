//! Input parsing and data source handling.

mod loader;
mod sniff;
mod source;

pub use loader::{LoadedFile, Loader, LoaderConfig};
pub use sniff::{
    detect_delimiter, detect_delimiter_in_lines, detect_delimiter_with, ShortSamplePolicy,
    DELIMITERS, DEFAULT_SAMPLE_LINES,
};
pub use source::{delimiter_name, Encoding, LoadWarning, SourceFile, SourceMetadata};
