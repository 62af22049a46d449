//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use roadcrash::Encoding;
use std::path::PathBuf;

/// Roadcrash: consolidate yearly road accident exports into one clean dataset
#[derive(Parser)]
#[command(name = "roadcrash")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load, merge and clean the yearly files, then export one CSV
    Consolidate {
        /// JSON pipeline configuration (default: 2021-2024 -> <year>.csv)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output path for the cleaned dataset
        #[arg(short, long, default_value = "accidents_cleaned.csv")]
        output: PathBuf,

        /// Print the consolidation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Detect the delimiter of a delimited text file
    Sniff {
        /// Path to the file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Number of lines to sample
        #[arg(short = 'n', long, default_value = "5")]
        lines: usize,

        /// Text encoding of the file (latin1, utf8)
        #[arg(short, long, default_value = "latin1")]
        encoding: Encoding,
    },

    /// Summarize an exported dataset, optionally for selected years
    Summary {
        /// Path to a CSV written by `consolidate`
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// JSON pipeline configuration the file was consolidated with
        /// (supplies the date/year columns; default: road-police layout)
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        /// Years to include (repeatable; default: all)
        #[arg(short, long = "year", value_name = "YEAR")]
        years: Vec<i64>,

        /// Number of accident causes to list
        #[arg(short, long, default_value = "5")]
        top: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
