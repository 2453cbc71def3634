use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use immo_invest_core::napkin::{self, FlipNapkinInput, MultiNapkinInput};

use crate::input;

/// Arguments for the FIP10 estimate
#[derive(Args)]
pub struct NapkinFlipArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Expected resale price
    #[arg(long)]
    pub final_price: Option<Decimal>,

    /// Asking or offered price
    #[arg(long)]
    pub initial_price: Option<Decimal>,

    /// Renovation budget
    #[arg(long, default_value = "0")]
    pub renovation_cost: Decimal,
}

pub fn run_napkin_flip(args: NapkinFlipArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let flip_input: FlipNapkinInput = match input::stdin::read_input(args.input.as_deref())? {
        Some(data) => data,
        None => FlipNapkinInput {
            final_price: args
                .final_price
                .ok_or("--final-price is required (or provide --input)")?,
            initial_price: args
                .initial_price
                .ok_or("--initial-price is required (or provide --input)")?,
            renovation_cost: args.renovation_cost,
        },
    };
    let result = napkin::napkin_flip(&flip_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the PAR + HIGH-5 estimate
#[derive(Args)]
pub struct NapkinMultiArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Asking price
    #[arg(long)]
    pub purchase_price: Option<Decimal>,

    /// Number of doors
    #[arg(long)]
    pub units: Option<u32>,

    /// Annual gross revenue
    #[arg(long)]
    pub gross_revenue: Option<Decimal>,
}

pub fn run_napkin_multi(args: NapkinMultiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let multi_input: MultiNapkinInput = match input::stdin::read_input(args.input.as_deref())? {
        Some(data) => data,
        None => MultiNapkinInput {
            purchase_price: args
                .purchase_price
                .ok_or("--purchase-price is required (or provide --input)")?,
            unit_count: args.units.ok_or("--units is required (or provide --input)")?,
            gross_revenue: args
                .gross_revenue
                .ok_or("--gross-revenue is required (or provide --input)")?,
        },
    };
    let result = napkin::napkin_multi(&multi_input)?;
    Ok(serde_json::to_value(result)?)
}
