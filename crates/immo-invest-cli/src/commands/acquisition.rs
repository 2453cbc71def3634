use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use immo_invest_core::acquisition::{self, AcquisitionModelInput, AcquisitionStrategyInput};

use crate::input;

/// Arguments for the required-units calculator
#[derive(Args)]
pub struct RequiredUnitsArgs {
    /// Monthly income to reach
    #[arg(long)]
    pub target_income: Decimal,

    /// Monthly cashflow per door
    #[arg(long, default_value = "75")]
    pub cashflow_per_unit: Decimal,
}

pub fn run_required_units(args: RequiredUnitsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let result = acquisition::required_units(args.target_income, args.cashflow_per_unit)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the acquisition projections
#[derive(Args)]
pub struct AcquisitionArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_strategy(args: AcquisitionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let strategy_input: AcquisitionStrategyInput = input::stdin::read_input(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for the acquisition strategy")?;
    let result = acquisition::yearly_acquisition_strategy(&strategy_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_model(args: AcquisitionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let model_input: AcquisitionModelInput = input::stdin::read_input(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for the acquisition model")?;
    let result = acquisition::generate_acquisition_model(&model_input)?;
    Ok(serde_json::to_value(result)?)
}
