//! Summary command - descriptive statistics for an exported dataset.

use std::path::{Path, PathBuf};

use colored::Colorize;
use roadcrash::stats::{describe, value_counts, ColumnSummary};
use roadcrash::{export, PipelineConfig, Table, DEFAULT_YEAR_COLUMN};

const WEEKDAY_COLUMN: &str = "dia_semana";
const CAUSE_COLUMN: &str = "causa_acidente";

pub fn run(
    file: PathBuf,
    config: Option<PathBuf>,
    years: Vec<i64>,
    top: usize,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let (view, year_column) = load_view(&file, config.as_deref(), &years)?;
    let year_column = year_column.as_str();

    if view.is_empty() {
        return Err("No data for the selected years".into());
    }

    let summaries = describe(&view);
    let weekdays = value_counts(&view, WEEKDAY_COLUMN).unwrap_or_default();
    let mut causes = value_counts(&view, CAUSE_COLUMN).unwrap_or_default();
    causes.truncate(top);

    if json_output {
        let summary = serde_json::json!({
            "file": file,
            "years": view.distinct_years(year_column),
            "rows": view.row_count(),
            "columns": view.column_count(),
            "describe": summaries,
            "weekdays": weekdays,
            "top_causes": causes,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let shown: Vec<String> = view
        .distinct_years(year_column)
        .iter()
        .map(i64::to_string)
        .collect();
    println!(
        "{} {} rows, years {}",
        "Summary".cyan().bold(),
        view.row_count().to_string().white().bold(),
        if shown.is_empty() { "-".to_string() } else { shown.join(", ") }
    );

    if !summaries.is_empty() {
        println!();
        println!("{}", "Numeric columns:".yellow().bold());
        println!(
            "  {:20} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "column", "count", "mean", "std", "min", "median", "max"
        );
        for summary in &summaries {
            print_summary(summary);
        }
    }

    if !weekdays.is_empty() {
        println!();
        println!("{}", "Accidents by weekday:".yellow().bold());
        for count in &weekdays {
            println!("  {:20} {:>8}", count.value, count.count);
        }
    }

    if !causes.is_empty() {
        println!();
        println!("{} {}", "Top causes:".yellow().bold(), format!("(top {})", top).dimmed());
        for (rank, count) in causes.iter().enumerate() {
            println!("  {:>2}. {:48} {:>8}", rank + 1, count.value, count.count);
        }
    }

    if verbose {
        println!();
        let names: Vec<&str> = view.column_names().collect();
        println!("{} {}", "Columns:".dimmed(), names.join(", ").dimmed());
    }

    Ok(())
}

/// Read the export with the layout it was consolidated under and keep `years`.
///
/// Returns the view and the name of its year column.
fn load_view(
    file: &Path,
    config: Option<&Path>,
    years: &[i64],
) -> Result<(Table, String), Box<dyn std::error::Error>> {
    let (cleaning, schema) = match config {
        Some(path) => {
            if !path.exists() {
                return Err(format!("Config file not found: {}", path.display()).into());
            }
            let config = PipelineConfig::from_json_file(path)?;
            (config.cleaning, config.schema)
        }
        None => (Default::default(), Default::default()),
    };

    let table = export::read_csv(file, &cleaning, &schema)?;
    let year_column = schema
        .year_column()
        .unwrap_or(DEFAULT_YEAR_COLUMN)
        .to_string();

    if years.is_empty() {
        return Ok((table, year_column));
    }
    if !table.has_column(&year_column) {
        return Err(format!("No '{}' column to filter years on", year_column).into());
    }
    let view = table.filter_years(&year_column, years);
    Ok((view, year_column))
}

fn print_summary(summary: &ColumnSummary) {
    let cell = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v));
    println!(
        "  {:20} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10}",
        summary.column,
        summary.count,
        cell(summary.mean),
        cell(summary.std),
        cell(summary.min),
        cell(summary.median),
        cell(summary.max)
    );
}
