use clap::Args;
use serde_json::Value;

use immo_invest_core::multi::{self, MultiInput};

use crate::input;

/// Arguments for the detailed MULTI analysis
#[derive(Args)]
pub struct MultiArgs {
    /// Path to a JSON/YAML building description
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_multi(args: MultiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let multi_input: MultiInput = input::stdin::read_input(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for the MULTI analysis")?;
    let result = multi::analyze_multi(&multi_input)?;
    Ok(serde_json::to_value(result)?)
}
