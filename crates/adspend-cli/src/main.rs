//! adspend - advertising-spend analysis CLI
//!
//! Usage:
//!   adspend run -i advertising.csv -o cleaned_advertising.csv
//!   adspend run -i advertising.csv -o out.csv --quick-grid --seed 7
//!   adspend run -i advertising.csv -o out.csv --config config.json --json
//!   adspend eda -i advertising.csv

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

use commands::run::RunOptions;

/// adspend - model sales against advertising spend and reallocate budget
#[derive(Parser)]
#[command(name = "adspend")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis and write the labelled dataset
    Run {
        /// Advertising dataset (CSV with a header row)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Where to write the cleaned data with A/B test groups
        #[arg(short, long, value_name = "FILE", default_value = "cleaned_advertising.csv")]
        output: PathBuf,

        /// JSON pipeline config; flags below override its values
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Seed for the split and every forest
        #[arg(long)]
        seed: Option<u64>,

        /// Total budget to reallocate
        #[arg(long)]
        budget: Option<f64>,

        /// Held-out proportion
        #[arg(long)]
        test_size: Option<f32>,

        /// Cross-validation folds for tuning
        #[arg(long)]
        folds: Option<usize>,

        /// Search a 16-configuration grid instead of the full one
        #[arg(long)]
        quick_grid: bool,
    },

    /// Clean a dataset and print descriptive statistics only
    Eda {
        /// Advertising dataset (CSV with a header row)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// JSON pipeline config (for channel and target names)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool, quiet: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else if quiet {
        tracing::Level::ERROR
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Run {
            input,
            output,
            config,
            seed,
            budget,
            test_size,
            folds,
            quick_grid,
        } => {
            let options = RunOptions {
                input,
                output,
                config,
                seed,
                budget,
                test_size,
                folds,
                quick_grid,
            };
            commands::run::run(&options, cli.json)
        }

        Commands::Eda { input, config } => commands::eda::run(&input, config.as_deref(), cli.json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}
