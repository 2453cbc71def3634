//! Portfolio-growth projector: how many doors a target income takes, and how
//! fast savings and reinvested cashflow can buy them.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::{DEFAULT_TARGET_CASHFLOW_PER_UNIT, MAX_PROJECTION_YEARS};
use crate::error::ImmoInvestError;
use crate::formulas::round_money;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::ImmoInvestResult;

const DEFAULT_DOWN_PAYMENT: Rate = dec!(0.20);
const DEFAULT_MODEL_HORIZON_YEARS: u32 = 30;

fn default_cashflow_per_unit() -> Money {
    DEFAULT_TARGET_CASHFLOW_PER_UNIT
}

fn default_down_payment() -> Rate {
    DEFAULT_DOWN_PAYMENT
}

fn default_horizon() -> u32 {
    DEFAULT_MODEL_HORIZON_YEARS
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Required units
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredUnitsInput {
    pub target_monthly_income: Money,
    #[serde(default = "default_cashflow_per_unit")]
    pub cashflow_per_unit: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredUnitsResult {
    pub target_monthly_income: Money,
    pub cashflow_per_unit: Money,
    pub required_units: u32,
    /// Income once every required unit is owned; at least the target
    pub projected_monthly_income: Money,
}

/// Doors needed to reach a monthly income: ceil(target / cashflow per door).
pub fn required_units(
    target_monthly_income: Money,
    cashflow_per_unit: Money,
) -> ImmoInvestResult<ComputationOutput<RequiredUnitsResult>> {
    let start = Instant::now();
    let units = count_units(target_monthly_income, cashflow_per_unit)?;
    let result = RequiredUnitsResult {
        target_monthly_income,
        cashflow_per_unit,
        required_units: units,
        projected_monthly_income: Decimal::from(units) * cashflow_per_unit,
    };
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Required units (target income / cashflow per unit, rounded up)",
        &RequiredUnitsInput {
            target_monthly_income,
            cashflow_per_unit,
        },
        Vec::new(),
        elapsed,
        result,
    ))
}

fn count_units(target_monthly_income: Money, cashflow_per_unit: Money) -> ImmoInvestResult<u32> {
    if cashflow_per_unit <= Decimal::ZERO {
        return Err(ImmoInvestError::out_of_range(
            "cashflow_per_unit",
            "la liquidité par porte doit être positive",
        ));
    }
    if target_monthly_income <= Decimal::ZERO {
        return Err(ImmoInvestError::out_of_range(
            "target_monthly_income",
            "le revenu mensuel visé doit être positif",
        ));
    }
    (target_monthly_income / cashflow_per_unit)
        .ceil()
        .to_u32()
        .ok_or_else(|| {
            ImmoInvestError::out_of_range("target_monthly_income", "nombre de portes hors bornes")
        })
}

// ---------------------------------------------------------------------------
// Yearly strategy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionStrategyInput {
    pub target_monthly_income: Money,
    #[serde(default = "default_cashflow_per_unit")]
    pub cashflow_per_unit: Money,
    #[serde(alias = "years")]
    pub horizon_years: u32,
    pub price_per_unit: Money,
    #[serde(default = "default_down_payment")]
    pub down_payment_percentage: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyYear {
    pub year: u32,
    pub units_to_buy: u32,
    pub cumulative_units: u32,
    pub cumulative_monthly_cashflow: Money,
    pub down_payment_needed: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionStrategy {
    pub required_units: u32,
    pub years: Vec<StrategyYear>,
    pub total_down_payment: Money,
}

/// Spread the required doors over the horizon, earlier years taking the
/// remainder.
pub fn yearly_acquisition_strategy(
    input: &AcquisitionStrategyInput,
) -> ImmoInvestResult<ComputationOutput<AcquisitionStrategy>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let required = count_units(input.target_monthly_income, input.cashflow_per_unit)?;
    validate_horizon("horizon_years", input.horizon_years)?;
    validate_purchase_terms(input.price_per_unit, input.down_payment_percentage)?;

    let per_year = required / input.horizon_years;
    let remainder = required % input.horizon_years;
    let down_payment_per_unit = input.price_per_unit * input.down_payment_percentage;

    let mut cumulative = 0u32;
    let years: Vec<StrategyYear> = (1..=input.horizon_years)
        .map(|year| {
            let units_to_buy = per_year + u32::from(year <= remainder);
            cumulative += units_to_buy;
            StrategyYear {
                year,
                units_to_buy,
                cumulative_units: cumulative,
                cumulative_monthly_cashflow: Decimal::from(cumulative) * input.cashflow_per_unit,
                down_payment_needed: Decimal::from(units_to_buy) * down_payment_per_unit,
            }
        })
        .collect();

    if per_year == 0 {
        warnings.push(format!(
            "{required} portes sur {} ans : certaines années sans acquisition",
            input.horizon_years
        ));
    }

    let result = AcquisitionStrategy {
        required_units: required,
        total_down_payment: years.iter().map(|y| y.down_payment_needed).sum(),
        years,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Yearly acquisition strategy (even spread, remainder first)",
        input,
        warnings,
        elapsed,
        result,
    ))
}

fn validate_horizon(field: &str, years: u32) -> ImmoInvestResult<()> {
    if years == 0 {
        return Err(ImmoInvestError::out_of_range(
            field,
            "l'horizon doit compter au moins une année",
        ));
    }
    if years > MAX_PROJECTION_YEARS {
        return Err(ImmoInvestError::out_of_range(
            field,
            format!("l'horizon ne peut pas dépasser {MAX_PROJECTION_YEARS} ans"),
        ));
    }
    Ok(())
}

fn validate_purchase_terms(price_per_unit: Money, down_payment: Rate) -> ImmoInvestResult<()> {
    if price_per_unit <= Decimal::ZERO {
        return Err(ImmoInvestError::missing(
            "price_per_unit",
            "le prix moyen par porte est requis",
        ));
    }
    if down_payment <= Decimal::ZERO || down_payment > Decimal::ONE {
        return Err(ImmoInvestError::out_of_range(
            "down_payment_percentage",
            "la mise de fonds doit être entre 0 et 1",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Capital-constrained model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionModelInput {
    pub target_monthly_income: Money,
    #[serde(default = "default_cashflow_per_unit")]
    pub cashflow_per_unit: Money,
    pub price_per_unit: Money,
    #[serde(default = "default_down_payment")]
    pub down_payment_percentage: Rate,
    /// Closing costs paid in cash per door
    #[serde(default)]
    pub closing_costs_per_unit: Money,
    #[serde(default)]
    pub starting_capital: Money,
    #[serde(default)]
    pub annual_savings: Money,
    #[serde(default = "default_true")]
    pub reinvest_cashflow: bool,
    #[serde(default = "default_horizon", alias = "years")]
    pub max_years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelYear {
    pub year: u32,
    pub units_bought: u32,
    pub total_units: u32,
    pub capital_invested: Money,
    pub monthly_cashflow: Money,
    /// Capital carried into the next year
    pub capital_end: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionModel {
    pub required_units: u32,
    pub cash_needed_per_unit: Money,
    pub years: Vec<ModelYear>,
    pub target_reached: bool,
    pub years_to_target: Option<u32>,
    pub final_units: u32,
    pub final_monthly_cashflow: Money,
    pub message: String,
}

/// Year-by-year simulation. Each year starts by buying as many doors as the
/// capital covers (never past the requirement); savings and, optionally, the
/// year's cashflow are added at year end.
pub fn generate_acquisition_model(
    input: &AcquisitionModelInput,
) -> ImmoInvestResult<ComputationOutput<AcquisitionModel>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let required = count_units(input.target_monthly_income, input.cashflow_per_unit)?;
    validate_purchase_terms(input.price_per_unit, input.down_payment_percentage)?;
    validate_horizon("max_years", input.max_years)?;
    if input.starting_capital < Decimal::ZERO
        || input.annual_savings < Decimal::ZERO
        || input.closing_costs_per_unit < Decimal::ZERO
    {
        return Err(ImmoInvestError::out_of_range(
            "starting_capital",
            "le capital, l'épargne et les frais ne peuvent pas être négatifs",
        ));
    }

    let cash_needed_per_unit =
        input.price_per_unit * input.down_payment_percentage + input.closing_costs_per_unit;
    let mut capital = input.starting_capital;
    let mut units = 0u32;
    let mut years = Vec::new();
    let mut years_to_target = None;

    for year in 1..=input.max_years {
        let affordable = (capital / cash_needed_per_unit).floor().to_u32().unwrap_or(u32::MAX);
        let units_bought = affordable.min(required - units);
        let capital_invested = Decimal::from(units_bought) * cash_needed_per_unit;
        capital -= capital_invested;
        units += units_bought;

        let monthly_cashflow = Decimal::from(units) * input.cashflow_per_unit;
        if input.reinvest_cashflow {
            capital += monthly_cashflow * dec!(12);
        }
        capital += input.annual_savings;

        years.push(ModelYear {
            year,
            units_bought,
            total_units: units,
            capital_invested,
            monthly_cashflow,
            capital_end: capital,
        });

        if units >= required {
            years_to_target = Some(year);
            break;
        }
    }

    let final_monthly_cashflow = Decimal::from(units) * input.cashflow_per_unit;
    let target_reached = years_to_target.is_some();
    let message = match years_to_target {
        Some(y) => format!(
            "Objectif de {} $ par mois atteint en {y} ans avec {units} portes",
            round_money(input.target_monthly_income)
        ),
        None => {
            warnings.push(format!(
                "Objectif non atteint après {} ans ({units} portes sur {required})",
                input.max_years
            ));
            format!(
                "{units} portes et {} $ par mois après {} ans",
                round_money(final_monthly_cashflow),
                input.max_years
            )
        }
    };

    tracing::debug!(required, units, target_reached, "acquisition model simulated");

    let result = AcquisitionModel {
        required_units: required,
        cash_needed_per_unit,
        years,
        target_reached,
        years_to_target,
        final_units: units,
        final_monthly_cashflow,
        message,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Capital-constrained acquisition model",
        input,
        warnings,
        elapsed,
        result,
    ))
}
