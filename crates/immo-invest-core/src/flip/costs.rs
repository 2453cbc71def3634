//! Cost components of a flip. Each function works on its own so callers can
//! price one bucket without running the full analysis.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FlipInput;
use crate::config::{
    DEFAULT_FLIP_INTEREST_RATE_PERCENT, DEFAULT_FLIP_LOAN_TO_VALUE, ENVIRONMENTAL_ASSESSMENT_FEE,
    INSPECTION_FEE, INSURANCE_RATE, LOAN_ORIGINATION_FEE_RATE, MARKETING_COST,
    MISC_ACQUISITION_FEE, MONTHLY_MAINTENANCE, MONTHLY_UTILITIES, NOTARY_FEE_CAP,
    NOTARY_FEE_RATE, POST_INSPECTION_REPAIRS, PROPERTY_TAX_RATE, REALTOR_COMMISSION_RATE,
    STAGING_COST,
};
use crate::formulas::{interest_only_payment, transfer_tax};
use crate::types::{CostBreakdown, CostSpec, Money, Percent};

const MONTHS_PER_YEAR: Decimal = rust_decimal_macros::dec!(12);

/// Carrying cost of the acquisition loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingCosts {
    pub loan_amount: Money,
    pub interest_rate_percent: Percent,
    pub monthly_interest: Money,
    /// Interest-only carry over the holding period
    pub interest_cost: Money,
    pub origination_fee: Money,
    pub total: Money,
}

/// Closing costs at purchase. A caller-supplied breakdown is used verbatim.
pub fn acquisition_costs(input: &FlipInput) -> CostBreakdown {
    if let Some(spec) = &input.acquisition_costs {
        return spec.to_breakdown();
    }

    let price = input.purchase_price;
    let mut items = vec![
        ("notary", (price * NOTARY_FEE_RATE).min(NOTARY_FEE_CAP)),
        ("transfer_tax", transfer_tax(price)),
        ("inspection", INSPECTION_FEE),
        ("miscellaneous", MISC_ACQUISITION_FEE),
    ];
    if input.environmental_assessment {
        items.push(("environmental_assessment", ENVIRONMENTAL_ASSESSMENT_FEE));
    }
    CostBreakdown::from_items(items)
}

/// Costs of owning the property until resale.
///
/// Itemized overrides are monthly amounts and get multiplied by the holding
/// period; a flat override is taken as the total for the period.
pub fn holding_costs(input: &FlipInput) -> CostBreakdown {
    let months = input.holding_period_months;
    match &input.holding_costs {
        Some(CostSpec::Flat(total)) => CostBreakdown::flat("total", *total),
        Some(spec @ CostSpec::Itemized(_)) => spec.to_breakdown().scaled(months),
        None => {
            let price = input.purchase_price;
            let monthly = CostBreakdown::from_items([
                ("property_tax", price * PROPERTY_TAX_RATE / MONTHS_PER_YEAR),
                ("insurance", price * INSURANCE_RATE / MONTHS_PER_YEAR),
                ("utilities", MONTHLY_UTILITIES),
                ("maintenance", MONTHLY_MAINTENANCE),
            ]);
            monthly.scaled(months)
        }
    }
}

/// Costs of the resale.
pub fn selling_costs(input: &FlipInput) -> CostBreakdown {
    if let Some(spec) = &input.selling_costs {
        return spec.to_breakdown();
    }

    CostBreakdown::from_items([
        ("realtor_commission", input.selling_price * REALTOR_COMMISSION_RATE),
        ("marketing", MARKETING_COST),
        ("staging", STAGING_COST),
        ("post_inspection_repairs", POST_INSPECTION_REPAIRS),
    ])
}

/// Interest carry plus origination fee of the acquisition loan. Without
/// caller financing an 80% LTV loan at 5% is assumed.
pub fn financing_costs(input: &FlipInput) -> FinancingCosts {
    let financing = input.financing.as_ref();

    let loan_amount = financing
        .and_then(|f| f.loan_amount)
        .unwrap_or_else(|| {
            let ltv = financing
                .and_then(|f| f.loan_to_value)
                .unwrap_or(DEFAULT_FLIP_LOAN_TO_VALUE);
            input.purchase_price * ltv
        });
    let interest_rate_percent = financing
        .and_then(|f| f.interest_rate_percent)
        .unwrap_or(DEFAULT_FLIP_INTEREST_RATE_PERCENT);
    let fee_rate = financing
        .and_then(|f| f.origination_fee_rate)
        .unwrap_or(LOAN_ORIGINATION_FEE_RATE);

    let monthly_interest = interest_only_payment(loan_amount, interest_rate_percent);
    let interest_cost = monthly_interest * input.holding_period_months;
    let origination_fee = loan_amount.max(Decimal::ZERO) * fee_rate;

    FinancingCosts {
        loan_amount,
        interest_rate_percent,
        monthly_interest,
        interest_cost,
        origination_fee,
        total: interest_cost + origination_fee,
    }
}
