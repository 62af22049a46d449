//! Consolidate command - merge and clean the yearly files, export one CSV.

use std::path::PathBuf;

use colored::Colorize;
use roadcrash::input::delimiter_name;
use roadcrash::{export, Consolidator, LoadWarning, PipelineConfig};
use tracing::debug;

pub fn run(
    config: Option<PathBuf>,
    output: PathBuf,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config {
        Some(path) => {
            if !path.exists() {
                return Err(format!("Config file not found: {}", path.display()).into());
            }
            debug!(path = %path.display(), "reading pipeline configuration");
            PipelineConfig::from_json_file(&path)?
        }
        None => {
            debug!("no configuration given; using default sources");
            PipelineConfig::default()
        }
    };

    if !json_output {
        println!(
            "{} {} source(s)",
            "Consolidating".cyan().bold(),
            config.sources.len().to_string().white()
        );
    }

    let result = Consolidator::new(config).consolidate()?;
    export::write_csv(&result.table, &output)?;

    let report = &result.report;
    if json_output {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!();
    println!("{}", "Sources:".yellow().bold());
    for source in &report.sources {
        println!(
            "  {:6} {:24} {:10} {:>8} rows  {:>3} columns",
            source.year,
            source.file,
            delimiter_name(source.delimiter as u8),
            source.row_count,
            source.column_count
        );
        if verbose {
            println!("         {} {}", "sha256".dimmed(), source.hash.dimmed());
        }
    }

    let failed: Vec<&LoadWarning> = report
        .warnings
        .iter()
        .filter(|w| matches!(w, LoadWarning::FileLoad { .. }))
        .collect();
    for warning in &failed {
        println!("  {} {}", "✗".red(), warning);
    }

    let skipped = report.rows_skipped();
    if skipped > 0 {
        println!(
            "  {} {} malformed row(s) skipped",
            "!".yellow(),
            skipped.to_string().yellow()
        );
        if verbose {
            for warning in report
                .warnings
                .iter()
                .filter(|w| matches!(w, LoadWarning::MalformedRow { .. }))
            {
                println!("    {}", warning.to_string().dimmed());
            }
        }
    }

    println!();
    println!("{}", "Cleaning:".yellow().bold());
    for fill in &report.filled {
        println!(
            "  {:28} {:>6} gap(s) filled with '{}'",
            fill.column, fill.count, fill.value
        );
    }
    for column in &report.empty_columns {
        println!("  {:28} {}", column, "no values to impute from".yellow());
    }
    println!("  {} duplicate row(s) removed", report.duplicates_removed);
    if report.dates_parsed + report.dates_unparsed > 0 {
        println!(
            "  {} date(s) parsed, {} unparseable",
            report.dates_parsed,
            report.dates_unparsed.to_string().yellow()
        );
    }
    if !report.schema.missing_optional.is_empty() && verbose {
        println!(
            "  absent optional columns: {}",
            report.schema.missing_optional.join(", ").dimmed()
        );
    }

    println!();
    println!(
        "{} {} rows x {} columns to {}",
        "Wrote".green().bold(),
        report.row_count.to_string().white().bold(),
        report.columns.len(),
        output.display()
    );

    Ok(())
}
