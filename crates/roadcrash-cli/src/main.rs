//! Roadcrash CLI - consolidate yearly road accident exports.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Consolidate {
            config,
            output,
            json,
        } => commands::consolidate::run(config, output, json, cli.verbose),

        Commands::Sniff {
            file,
            lines,
            encoding,
        } => commands::sniff::run(file, lines, encoding, cli.verbose),

        Commands::Summary {
            file,
            config,
            years,
            top,
            json,
        } => commands::summary::run(file, config, years, top, json, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` wins over the verbosity flag.
fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
