mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::convert::ConvertArgs;
use commands::deal::{DealArgs, ValidateArgs};
use commands::term::OptimalTermArgs;

/// Closed-end vehicle lease deal calculations
#[derive(Parser)]
#[command(
    name = "leasedeal",
    version,
    about = "Closed-end vehicle lease deal calculations",
    long_about = "Prices closed-end vehicle leases from the lender's cost basis with decimal \
                  precision. Derives the agreed price and full payment worksheet, searches \
                  for the best lease term, and validates deals against spread, markup and \
                  minimum payment thresholds."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Pricing policy override (JSON or YAML)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate a deal at a given term
    Deal(DealArgs),
    /// Find the lease term closest to the target spread
    OptimalTerm(OptimalTermArgs),
    /// Validate a calculated deal and suggest corrective terms
    Validate(ValidateArgs),
    /// Pick a term if needed, calculate and validate in one step
    Quote(DealArgs),
    /// List every payment of a deal
    Schedule(DealArgs),
    /// Convert an amount between a payment frequency and its monthly equivalent
    Convert(ConvertArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("lease_deal_core=debug,lease_deal_cli=debug"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("lease_deal_core=info,lease_deal_cli=info"))
    };

    // stdout carries the result document
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match input::file::read_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Deal(args) => commands::deal::run_deal(args, &config),
        Commands::OptimalTerm(args) => commands::term::run_optimal_term(args, &config),
        Commands::Validate(args) => commands::deal::run_validate(args, &config),
        Commands::Quote(args) => commands::deal::run_quote(args, &config),
        Commands::Schedule(args) => commands::deal::run_schedule(args, &config),
        Commands::Convert(args) => commands::convert::run_convert(args),
        Commands::Version => {
            println!("leasedeal {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
