pub mod analysis;
pub mod expenses;
pub mod financing;
pub mod optimization;
pub mod revenue;

pub use analysis::{analyze_multi, MultiAnalysis, MultiDetails, MultiRatios, MultiSummary};
pub use financing::{FinancingInstrument, InstrumentKind, MortgageTerms, MultiFinancing};
pub use optimization::{OptimizationAnalysis, OptimizationPlan};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Money, Percent, Rate};

/// An income-generating multi-unit building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiInput {
    #[serde(default, alias = "price")]
    pub purchase_price: Money,
    #[serde(default, alias = "units")]
    pub unit_count: u32,
    #[serde(default)]
    pub renovation_cost: Money,
    /// Closing costs added to the investment base
    #[serde(default)]
    pub acquisition_costs: Money,
    #[serde(default, alias = "revenue_details")]
    pub revenue: RevenueDetails,
    #[serde(default, alias = "expense_details")]
    pub expenses: ExpenseDetails,
    #[serde(default, alias = "financing_details")]
    pub financing: MultiFinancing,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimization: Option<OptimizationPlan>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueDetails {
    #[serde(default)]
    pub units: Vec<UnitRevenue>,
    /// Annual rental revenue, used when no unit list is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross_rental_revenue: Option<Money>,
    /// Parking, laundry, storage...
    #[serde(default)]
    pub additional_revenues: Vec<RevenueSource>,
    /// Explicit vacancy rate (0.03 = 3%). Derived from occupancy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vacancy_rate: Option<Rate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRevenue {
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub unit_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_rent: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_rent: Option<Money>,
    #[serde(default = "default_occupied")]
    pub occupied: bool,
}

fn default_occupied() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueSource {
    pub name: String,
    #[serde(alias = "amount")]
    pub annual_amount: Money,
}

/// Annual operating expenses by bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDetails {
    #[serde(default)]
    pub taxes: BTreeMap<String, Money>,
    #[serde(default)]
    pub operating: BTreeMap<String, Money>,
    #[serde(default)]
    pub maintenance: BTreeMap<String, Money>,
    #[serde(default)]
    pub management: ManagementExpenses,
}

/// Management bucket. Vacancy and bad-debt allowances are percentages of
/// potential gross revenue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManagementExpenses {
    #[serde(default)]
    pub fees: BTreeMap<String, Money>,
    #[serde(default)]
    pub vacancy_loss_percent: Percent,
    #[serde(default)]
    pub bad_debt_percent: Percent,
}
