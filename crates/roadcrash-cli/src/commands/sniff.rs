//! Sniff command - detect the delimiter of one file.

use std::path::PathBuf;

use colored::Colorize;
use roadcrash::input::{delimiter_name, detect_delimiter};
use roadcrash::Encoding;

pub fn run(
    file: PathBuf,
    lines: usize,
    encoding: Encoding,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }
    if lines == 0 {
        return Err("--lines must be at least 1".into());
    }

    let delimiter = detect_delimiter(&file, encoding, lines)?;

    println!(
        "{} {} {:?}",
        delimiter_name(delimiter).green().bold(),
        "delimiter".dimmed(),
        delimiter as char
    );
    if verbose {
        println!(
            "  sampled {} line(s) of {} as {}",
            lines,
            file.display(),
            encoding
        );
    }

    Ok(())
}
