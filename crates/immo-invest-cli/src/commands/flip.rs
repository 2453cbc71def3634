use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use immo_invest_core::flip::{self, FlipInput};

use crate::input;

/// Arguments for the detailed FLIP analysis
#[derive(Args)]
pub struct FlipArgs {
    /// Path to a JSON/YAML deal (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Purchase price
    #[arg(long)]
    pub purchase_price: Option<Decimal>,

    /// Expected selling price
    #[arg(long)]
    pub selling_price: Option<Decimal>,

    /// Renovation budget
    #[arg(long, default_value = "0")]
    pub renovation_cost: Decimal,

    /// Holding period in months
    #[arg(long, default_value = "6")]
    pub holding_months: Decimal,

    /// Lender requires a phase I environmental assessment
    #[arg(long)]
    pub environmental_assessment: bool,
}

pub fn run_flip(args: FlipArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let flip_input: FlipInput = match input::stdin::read_input(args.input.as_deref())? {
        Some(deal) => deal,
        None => {
            let purchase = args
                .purchase_price
                .ok_or("--purchase-price is required (or provide --input)")?;
            let selling = args
                .selling_price
                .ok_or("--selling-price is required (or provide --input)")?;
            let mut deal = FlipInput::new(purchase, selling, args.renovation_cost);
            deal.holding_period_months = args.holding_months;
            deal.environmental_assessment = args.environmental_assessment;
            deal
        }
    };

    let result = flip::analyze_flip(&flip_input)?;
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_flags_build_default_deal() {
        let value = run_flip(FlipArgs {
            input: None,
            purchase_price: Some(dec!(300_000)),
            selling_price: Some(dec!(400_000)),
            renovation_cost: dec!(30_000),
            holding_months: dec!(6),
            environmental_assessment: false,
        })
        .unwrap();
        let profit: Decimal = value["result"]["summary"]["profit"]
            .as_str()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(profit, dec!(28_400));
    }
}
