pub mod analysis;
pub mod costs;

pub use analysis::{analyze_flip, FlipAnalysis, FlipDetails, FlipSummary};
pub use costs::{acquisition_costs, financing_costs, holding_costs, selling_costs, FinancingCosts};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_HOLDING_PERIOD_MONTHS;
use crate::types::{CostSpec, Money, Percent, Rate};

/// A buy-renovate-resell deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlipInput {
    #[serde(default, alias = "initial_price")]
    pub purchase_price: Money,
    #[serde(default, alias = "sale_price", alias = "final_price")]
    pub selling_price: Money,
    #[serde(default)]
    pub renovation_cost: Money,
    #[serde(default = "default_holding_period")]
    pub holding_period_months: Decimal,
    /// Notary, transfer tax, inspection... Flat total or itemized map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquisition_costs: Option<CostSpec>,
    /// Itemized amounts are monthly; a flat amount covers the whole period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holding_costs: Option<CostSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selling_costs: Option<CostSpec>,
    /// Phase I environmental assessment required by the lender
    #[serde(default)]
    pub environmental_assessment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financing: Option<FlipFinancing>,
}

/// Short-term acquisition loan carried over the holding period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlipFinancing {
    /// Explicit loan amount; takes precedence over `loan_to_value`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_to_value: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate_percent: Option<Percent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origination_fee_rate: Option<Rate>,
}

fn default_holding_period() -> Decimal {
    DEFAULT_HOLDING_PERIOD_MONTHS
}

impl FlipInput {
    pub fn new(purchase_price: Money, selling_price: Money, renovation_cost: Money) -> Self {
        FlipInput {
            purchase_price,
            selling_price,
            renovation_cost,
            holding_period_months: DEFAULT_HOLDING_PERIOD_MONTHS,
            acquisition_costs: None,
            holding_costs: None,
            selling_costs: None,
            environmental_assessment: false,
            financing: None,
        }
    }
}
