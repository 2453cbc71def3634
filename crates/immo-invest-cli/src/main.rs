mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::acquisition::{AcquisitionArgs, RequiredUnitsArgs};
use commands::comparison::{CompareArgs, SensitivityArgs};
use commands::flip::FlipArgs;
use commands::liquidity::{MaxOfferArgs, MaxPriceArgs};
use commands::multi::MultiArgs;
use commands::napkin::{NapkinFlipArgs, NapkinMultiArgs};

/// FLIP and MULTI real-estate investment calculators
#[derive(Parser)]
#[command(
    name = "immo",
    version,
    about = "FLIP and MULTI real-estate investment calculators",
    long_about = "Analyse real-estate deals with decimal precision: napkin estimates \
                  (FIP10, PAR + HIGH-5), detailed FLIP and MULTI analyses, scenario \
                  comparison, sensitivity sweeps, maximum-price solvers and portfolio \
                  growth projections. Inputs are JSON or YAML files, or JSON on stdin."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Detailed FLIP analysis with itemized costs
    Flip(FlipArgs),
    /// Detailed MULTI analysis: NOI, financing, cashflow per door
    Multi(MultiArgs),
    /// Quick FLIP estimate (FIP10)
    NapkinFlip(NapkinFlipArgs),
    /// Quick MULTI estimate (PAR + HIGH-5)
    NapkinMulti(NapkinMultiArgs),
    /// Rank several FLIP and MULTI scenarios
    Compare(CompareArgs),
    /// Sweep one input of a scenario and rank the variants
    Sensitivity(SensitivityArgs),
    /// Maximum MULTI purchase price for a cashflow target
    MaxPrice(MaxPriceArgs),
    /// Maximum FLIP offer for a profit target
    MaxOffer(MaxOfferArgs),
    /// Doors needed for a monthly income target
    RequiredUnits(RequiredUnitsArgs),
    /// Spread the required doors over a horizon
    AcquisitionStrategy(AcquisitionArgs),
    /// Simulate purchases funded by savings and cashflow
    AcquisitionModel(AcquisitionArgs),
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

/// Diagnostics go to stderr so piped output stays clean. `RUST_LOG` overrides
/// the default level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Flip(args) => commands::flip::run_flip(args),
        Commands::Multi(args) => commands::multi::run_multi(args),
        Commands::NapkinFlip(args) => commands::napkin::run_napkin_flip(args),
        Commands::NapkinMulti(args) => commands::napkin::run_napkin_multi(args),
        Commands::Compare(args) => commands::comparison::run_compare(args),
        Commands::Sensitivity(args) => commands::comparison::run_sensitivity(args),
        Commands::MaxPrice(args) => commands::liquidity::run_max_price(args),
        Commands::MaxOffer(args) => commands::liquidity::run_max_offer(args),
        Commands::RequiredUnits(args) => commands::acquisition::run_required_units(args),
        Commands::AcquisitionStrategy(args) => commands::acquisition::run_strategy(args),
        Commands::AcquisitionModel(args) => commands::acquisition::run_model(args),
        Commands::Version => {
            println!("immo {}", env!("CARGO_PKG_VERSION"));
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
