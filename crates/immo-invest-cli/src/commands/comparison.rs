use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use immo_invest_core::comparison::{
    sensitivity_analysis, ComparisonRequest, Criterion, Scenario, SensitivityRequest,
};

use crate::input;

/// Arguments for scenario comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Path to `{scenarios, options}` or a bare array of scenarios
    #[arg(long)]
    pub input: Option<String>,

    /// Rank on a single metric (profit, roi, cashflow_per_unit, cap_rate, ...)
    #[arg(long)]
    pub criterion: Option<String>,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw: Value = input::stdin::read_input(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for the comparison")?;
    let mut request = parse_comparison(raw)?;
    if let Some(name) = args.criterion {
        request.options.criterion = Some(parse_criterion(&name)?);
    }
    let result = request.run()?;
    Ok(serde_json::to_value(result)?)
}

fn parse_comparison(raw: Value) -> Result<ComparisonRequest, Box<dyn std::error::Error>> {
    if raw.is_array() {
        let scenarios: Vec<Scenario> = serde_json::from_value(raw)?;
        return Ok(ComparisonRequest {
            scenarios,
            ..Default::default()
        });
    }
    Ok(serde_json::from_value(raw)?)
}

fn parse_criterion(name: &str) -> Result<Criterion, Box<dyn std::error::Error>> {
    serde_json::from_value(Value::String(name.to_string()))
        .map_err(|_| format!("Unknown criterion '{name}'").into())
}

/// Arguments for a sensitivity sweep
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to a scenario, or to a full `{scenario, variable, ...}` request
    #[arg(long)]
    pub input: Option<String>,

    /// Dotted path of the input to vary (e.g. "financing.mortgage.annual_rate_percent")
    #[arg(long)]
    pub variable: Option<String>,

    /// Maximum variation in percent on each side
    #[arg(long, default_value = "20")]
    pub variation: Decimal,

    /// Variants per side
    #[arg(long, default_value = "2")]
    pub steps: u32,
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw: Value = input::stdin::read_input(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for the sensitivity sweep")?;

    let result = if raw.get("scenario").is_some() {
        let mut request: SensitivityRequest = serde_json::from_value(raw)?;
        if let Some(variable) = args.variable {
            request.variable = variable;
        }
        request.run()?
    } else {
        let scenario: Scenario = serde_json::from_value(raw)?;
        let variable = args
            .variable
            .ok_or("--variable is required when the input is a bare scenario")?;
        sensitivity_analysis(&scenario, &variable, args.variation, args.steps)?
    };
    Ok(serde_json::to_value(result)?)
}
