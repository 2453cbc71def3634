//! Inverse solvers: the highest price a deal supports for a target return.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::{DEFAULT_TARGET_CASHFLOW_PER_UNIT, DEFAULT_TARGET_FLIP_PROFIT, FIP10_COST_RATE};
use crate::error::ImmoInvestError;
use crate::formulas::{max_principal, round_money};
use crate::multi::analysis::operating_income;
use crate::multi::financing::validate_down_payment;
use crate::multi::{FinancingInstrument, MortgageTerms, MultiInput};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::ImmoInvestResult;

// ---------------------------------------------------------------------------
// MULTI: maximum purchase price for a cashflow target
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxPurchasePriceInput {
    #[serde(alias = "noi")]
    pub net_operating_income: Money,
    #[serde(alias = "units")]
    pub unit_count: u32,
    /// Monthly cashflow per door to preserve
    #[serde(default = "default_target_cashflow")]
    pub target_cashflow_per_unit: Money,
    pub down_payment_percentage: Rate,
    #[serde(default)]
    pub mortgage: MortgageTerms,
    /// Layers whose service is paid before the first mortgage
    #[serde(default, alias = "creative")]
    pub other_financing: Vec<FinancingInstrument>,
}

fn default_target_cashflow() -> Money {
    DEFAULT_TARGET_CASHFLOW_PER_UNIT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxPurchasePriceResult {
    pub max_purchase_price: Money,
    pub max_loan: Money,
    pub down_payment: Money,
    pub max_monthly_mortgage_payment: Money,
    pub target_annual_cashflow: Money,
    pub other_debt_service: Money,
    pub target_reachable: bool,
    pub message: String,
}

/// Solve for the price at which the deal yields exactly the target cashflow
/// per door: the payment left after the target and the other layers is
/// capitalized into a loan, then grossed up by the down payment.
pub fn max_purchase_price(
    input: &MaxPurchasePriceInput,
) -> ImmoInvestResult<ComputationOutput<MaxPurchasePriceResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.unit_count == 0 {
        return Err(ImmoInvestError::missing(
            "unit_count",
            "le nombre de logements est requis",
        ));
    }
    validate_down_payment(input.down_payment_percentage)?;
    input.mortgage.validate("mortgage")?;
    for (i, instrument) in input.other_financing.iter().enumerate() {
        instrument.validate(&format!("other_financing[{i}]"))?;
    }
    if input.target_cashflow_per_unit < Decimal::ZERO {
        warnings.push("Cible de liquidité négative : le prix inclut un déficit".into());
    }

    let target_annual_cashflow =
        input.target_cashflow_per_unit * Decimal::from(input.unit_count) * dec!(12);
    let other_debt_service = input
        .other_financing
        .iter()
        .map(|i| i.annual_payment())
        .sum::<ImmoInvestResult<Money>>()?;
    let available_annual =
        input.net_operating_income - target_annual_cashflow - other_debt_service;
    let max_monthly_mortgage_payment = available_annual / dec!(12);

    let result = if max_monthly_mortgage_payment <= Decimal::ZERO {
        MaxPurchasePriceResult {
            max_purchase_price: Decimal::ZERO,
            max_loan: Decimal::ZERO,
            down_payment: Decimal::ZERO,
            max_monthly_mortgage_payment: Decimal::ZERO,
            target_annual_cashflow,
            other_debt_service,
            target_reachable: false,
            message: format!(
                "Cible de {} $ par porte inatteignable : le revenu net ne couvre pas la cible",
                round_money(input.target_cashflow_per_unit)
            ),
        }
    } else {
        let max_loan = max_principal(
            max_monthly_mortgage_payment,
            input.mortgage.annual_rate_percent,
            input.mortgage.amortization_years,
        )?;
        let max_purchase_price = max_loan / (Decimal::ONE - input.down_payment_percentage);
        MaxPurchasePriceResult {
            max_purchase_price,
            max_loan,
            down_payment: max_purchase_price - max_loan,
            max_monthly_mortgage_payment,
            target_annual_cashflow,
            other_debt_service,
            target_reachable: true,
            message: format!(
                "Prix maximal de {} $ pour {} $ par porte par mois",
                round_money(max_purchase_price),
                round_money(input.target_cashflow_per_unit)
            ),
        }
    };

    tracing::debug!(price = %result.max_purchase_price, reachable = result.target_reachable, "max purchase price solved");

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Maximum purchase price (annuity present value of the residual payment)",
        input,
        warnings,
        elapsed,
        result,
    ))
}

/// [`max_purchase_price`] fed with a full deal's NOI and financing.
pub fn max_purchase_price_for_deal(
    deal: &MultiInput,
    target_cashflow_per_unit: Option<Money>,
) -> ImmoInvestResult<ComputationOutput<MaxPurchasePriceResult>> {
    let (_, _, noi) = operating_income(deal)?;
    max_purchase_price(&MaxPurchasePriceInput {
        net_operating_income: noi,
        unit_count: deal.unit_count,
        target_cashflow_per_unit: target_cashflow_per_unit
            .unwrap_or(DEFAULT_TARGET_CASHFLOW_PER_UNIT),
        down_payment_percentage: deal.financing.down_payment_percentage,
        mortgage: deal.financing.mortgage.clone(),
        other_financing: deal.financing.creative.clone(),
    })
}

// ---------------------------------------------------------------------------
// FLIP: maximum offer (FIP10 inverted)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxOfferInput {
    #[serde(alias = "final_price")]
    pub selling_price: Money,
    #[serde(default)]
    pub renovation_cost: Money,
    #[serde(default = "default_target_profit")]
    pub target_profit: Money,
}

fn default_target_profit() -> Money {
    DEFAULT_TARGET_FLIP_PROFIT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxOfferResult {
    pub max_offer_price: Money,
    pub carry_costs: Money,
    pub target_profit: Money,
    pub message: String,
}

/// Highest offer that still leaves the target profit after renovation and
/// the 10% carry.
pub fn max_offer_price(input: &MaxOfferInput) -> ImmoInvestResult<ComputationOutput<MaxOfferResult>> {
    let start = Instant::now();

    if input.selling_price <= Decimal::ZERO {
        return Err(ImmoInvestError::missing(
            "selling_price",
            "le prix de revente doit être positif",
        ));
    }
    if input.renovation_cost < Decimal::ZERO {
        return Err(ImmoInvestError::out_of_range(
            "renovation_cost",
            "le coût des rénovations ne peut pas être négatif",
        ));
    }

    let carry_costs = input.selling_price * FIP10_COST_RATE;
    let max_offer_price =
        input.selling_price - input.renovation_cost - carry_costs - input.target_profit;
    if max_offer_price <= Decimal::ZERO {
        return Err(ImmoInvestError::UnreachableTarget(format!(
            "un profit de {} $ est impossible à un prix de revente de {} $",
            round_money(input.target_profit),
            round_money(input.selling_price)
        )));
    }

    let result = MaxOfferResult {
        max_offer_price,
        carry_costs,
        target_profit: input.target_profit,
        message: format!(
            "Offre maximale de {} $ pour un profit de {} $",
            round_money(max_offer_price),
            round_money(input.target_profit)
        ),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Maximum offer price (FIP10 inverted)",
        input,
        Vec::new(),
        elapsed,
        result,
    ))
}
