//! Delimiter detection from a short prefix of a file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::source::Encoding;
use crate::error::{Result, RoadcrashError};

/// Candidate delimiters, in tie-break order.
pub const DELIMITERS: &[u8] = &[b',', b';', b'\t', b'|'];

/// Lines sampled when no size is configured.
pub const DEFAULT_SAMPLE_LINES: usize = 5;

/// What to do when a file is shorter than the sample size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortSamplePolicy {
    /// Fail with [`RoadcrashError::InsufficientSample`].
    #[default]
    Fail,
    /// Sample whatever lines exist; only an empty file fails.
    UseAvailable,
}

/// Detect the delimiter of a file from its first `num_lines` lines.
///
/// Fails if the file has fewer lines than requested.
pub fn detect_delimiter(path: impl AsRef<Path>, encoding: Encoding, num_lines: usize) -> Result<u8> {
    detect_delimiter_with(path, encoding, num_lines, ShortSamplePolicy::Fail)
}

/// Detect the delimiter of a file with an explicit short-file policy.
pub fn detect_delimiter_with(
    path: impl AsRef<Path>,
    encoding: Encoding,
    num_lines: usize,
    policy: ShortSamplePolicy,
) -> Result<u8> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| RoadcrashError::io(path, e))?;
    let raw = read_sample(BufReader::new(file), num_lines).map_err(|e| RoadcrashError::io(path, e))?;
    detect_from_sample(&raw, path, encoding, num_lines, policy)
}

/// Same as [`detect_delimiter_with`] for a file already held in memory.
pub(crate) fn detect_delimiter_in_bytes(
    bytes: &[u8],
    path: &Path,
    encoding: Encoding,
    num_lines: usize,
    policy: ShortSamplePolicy,
) -> Result<u8> {
    let raw = read_sample(bytes, num_lines).map_err(|e| RoadcrashError::io(path, e))?;
    detect_from_sample(&raw, path, encoding, num_lines, policy)
}

fn detect_from_sample(
    raw: &[Vec<u8>],
    path: &Path,
    encoding: Encoding,
    num_lines: usize,
    policy: ShortSamplePolicy,
) -> Result<u8> {
    let short = raw.len() < num_lines;
    if raw.is_empty() || (short && policy == ShortSamplePolicy::Fail) {
        return Err(RoadcrashError::InsufficientSample {
            path: path.to_path_buf(),
            required: num_lines,
            found: raw.len(),
        });
    }

    let mut lines = Vec::with_capacity(raw.len());
    for bytes in raw {
        let line = encoding.decode(bytes).ok_or_else(|| RoadcrashError::Encoding {
            path: path.to_path_buf(),
            encoding: encoding.label().to_string(),
        })?;
        lines.push(line);
    }

    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    Ok(detect_delimiter_in_lines(&refs))
}

/// Pick the candidate occurring most often across `lines`.
///
/// Occurrences are counted raw, quotes included. Ties go to the candidate
/// listed first in [`DELIMITERS`]; a sample with no candidate yields a comma.
pub fn detect_delimiter_in_lines(lines: &[&str]) -> u8 {
    let mut best_delimiter = DELIMITERS[0];
    let mut best_count = 0;

    for &delim in DELIMITERS {
        let count: usize = lines
            .iter()
            .map(|line| line.bytes().filter(|&b| b == delim).count())
            .sum();

        if count > best_count {
            best_count = count;
            best_delimiter = delim;
        }
    }

    best_delimiter
}

/// Read up to `limit` raw lines, without their line terminators.
fn read_sample(mut reader: impl BufRead, limit: usize) -> std::io::Result<Vec<Vec<u8>>> {
    let mut lines = Vec::with_capacity(limit);
    while lines.len() < limit {
        let mut buf = Vec::new();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        lines.push(buf);
    }
    Ok(lines)
}
