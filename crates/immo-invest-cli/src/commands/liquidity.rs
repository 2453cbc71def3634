use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use immo_invest_core::liquidity::{self, MaxOfferInput, MaxPurchasePriceInput};
use immo_invest_core::multi::MultiInput;

use crate::input;

/// Arguments for the MULTI maximum purchase price
#[derive(Args)]
pub struct MaxPriceArgs {
    /// Path to a solver input (`noi`, `units`, ...) or a full MULTI deal
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly cashflow per door to preserve (default 75)
    #[arg(long)]
    pub target_per_unit: Option<Decimal>,
}

pub fn run_max_price(args: MaxPriceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw: Value = input::stdin::read_input(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for the maximum price")?;

    let is_solver_input = raw.get("net_operating_income").is_some() || raw.get("noi").is_some();
    let result = if is_solver_input {
        let mut solver: MaxPurchasePriceInput = serde_json::from_value(raw)?;
        if let Some(target) = args.target_per_unit {
            solver.target_cashflow_per_unit = target;
        }
        liquidity::max_purchase_price(&solver)?
    } else {
        let deal: MultiInput = serde_json::from_value(raw)?;
        liquidity::max_purchase_price_for_deal(&deal, args.target_per_unit)?
    };
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the FLIP maximum offer
#[derive(Args)]
pub struct MaxOfferArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Expected resale price
    #[arg(long)]
    pub selling_price: Option<Decimal>,

    /// Renovation budget
    #[arg(long, default_value = "0")]
    pub renovation_cost: Decimal,

    /// Profit to keep
    #[arg(long, default_value = "25000")]
    pub target_profit: Decimal,
}

pub fn run_max_offer(args: MaxOfferArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let offer_input: MaxOfferInput = match input::stdin::read_input(args.input.as_deref())? {
        Some(data) => data,
        None => MaxOfferInput {
            selling_price: args
                .selling_price
                .ok_or("--selling-price is required (or provide --input)")?,
            renovation_cost: args.renovation_cost,
            target_profit: args.target_profit,
        },
    };
    let result = liquidity::max_offer_price(&offer_input)?;
    Ok(serde_json::to_value(result)?)
}
