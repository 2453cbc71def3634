//! Single-pass quick estimators: FIP10 for flips, PAR + HIGH-5 for
//! multi-unit buildings.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::{FIP10_COST_RATE, FLIP_PROFIT_SCALE, HIGH5_MONTHLY_FACTOR, MULTI_CASHFLOW_SCALE};
use crate::error::ImmoInvestError;
use crate::formulas::{expense_ratio, round_money};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rating};
use crate::ImmoInvestResult;

// ---------------------------------------------------------------------------
// FLIP: FIP10
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlipNapkinInput {
    /// Expected resale price
    #[serde(alias = "selling_price")]
    pub final_price: Money,
    /// Acquisition price
    #[serde(alias = "purchase_price")]
    pub initial_price: Money,
    #[serde(default)]
    pub renovation_cost: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlipNapkinOutput {
    pub final_price: Money,
    pub initial_price: Money,
    pub renovation_cost: Money,
    /// 10% of the final price: financing, transaction and holding costs
    pub carry_costs: Money,
    pub profit: Money,
    pub rating: Rating,
    pub message: String,
}

/// Quick flip estimate: final − initial − renovation − 10% of final.
pub fn napkin_flip(input: &FlipNapkinInput) -> ImmoInvestResult<ComputationOutput<FlipNapkinOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.final_price <= Decimal::ZERO {
        return Err(ImmoInvestError::missing(
            "final_price",
            "le prix de revente doit être positif",
        ));
    }
    if input.initial_price <= Decimal::ZERO {
        return Err(ImmoInvestError::missing(
            "initial_price",
            "le prix d'achat doit être positif",
        ));
    }
    if input.initial_price >= input.final_price {
        return Err(ImmoInvestError::out_of_range(
            "initial_price",
            "le prix d'achat doit être inférieur au prix de revente",
        ));
    }
    if input.renovation_cost < Decimal::ZERO {
        return Err(ImmoInvestError::out_of_range(
            "renovation_cost",
            "le coût des rénovations ne peut pas être négatif",
        ));
    }

    let carry_costs = input.final_price * FIP10_COST_RATE;
    let profit = input.final_price - input.initial_price - input.renovation_cost - carry_costs;
    let rating = FLIP_PROFIT_SCALE.rate(profit);

    if profit < Decimal::ZERO {
        warnings.push(format!("Perte estimée de {} $", round_money(-profit)));
    }

    let message = flip_message(rating, profit);
    tracing::debug!(%profit, %rating, "napkin flip computed");

    let output = FlipNapkinOutput {
        final_price: input.final_price,
        initial_price: input.initial_price,
        renovation_cost: input.renovation_cost,
        carry_costs,
        profit,
        rating,
        message,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "FIP10 Napkin Flip Estimate",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn flip_message(rating: Rating, profit: Money) -> String {
    let profit = round_money(profit);
    match rating {
        Rating::Excellent => format!("Excellent projet : profit estimé de {profit} $"),
        Rating::Good => format!("Bon projet : profit estimé de {profit} $"),
        Rating::Acceptable => format!(
            "Projet acceptable : profit estimé de {profit} $, sous le seuil de {} $",
            FLIP_PROFIT_SCALE.good
        ),
        Rating::Insufficient => format!(
            "Profit insuffisant : {profit} $ (minimum {} $)",
            FLIP_PROFIT_SCALE.acceptable
        ),
    }
}

// ---------------------------------------------------------------------------
// MULTI: PAR + HIGH-5
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiNapkinInput {
    #[serde(alias = "price")]
    pub purchase_price: Money,
    #[serde(alias = "units")]
    pub unit_count: u32,
    /// Annual gross revenue
    pub gross_revenue: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiNapkinOutput {
    pub purchase_price: Money,
    pub unit_count: u32,
    pub gross_revenue: Money,
    pub expense_percentage: Percent,
    pub expenses: Money,
    pub noi: Money,
    /// Annual HIGH-5 mortgage estimate
    pub mortgage_payment: Money,
    pub cashflow: Money,
    /// Monthly cashflow per unit
    pub cashflow_per_unit: Money,
    pub rating: Rating,
    pub message: String,
}

/// Quick multi-unit estimate: PAR expense ratio and HIGH-5 mortgage.
pub fn napkin_multi(
    input: &MultiNapkinInput,
) -> ImmoInvestResult<ComputationOutput<MultiNapkinOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.purchase_price <= Decimal::ZERO {
        return Err(ImmoInvestError::missing(
            "purchase_price",
            "le prix d'achat doit être positif",
        ));
    }
    if input.gross_revenue <= Decimal::ZERO {
        return Err(ImmoInvestError::missing(
            "gross_revenue",
            "les revenus bruts doivent être positifs",
        ));
    }
    let expense_percentage = expense_ratio(input.unit_count)?;

    let expenses = input.gross_revenue * expense_percentage / Decimal::ONE_HUNDRED;
    let noi = input.gross_revenue - expenses;
    let mortgage_payment = input.purchase_price * HIGH5_MONTHLY_FACTOR * dec!(12);
    let cashflow = noi - mortgage_payment;
    let cashflow_per_unit = cashflow / dec!(12) / Decimal::from(input.unit_count);
    let rating = MULTI_CASHFLOW_SCALE.rate(cashflow_per_unit);

    if cashflow < Decimal::ZERO {
        warnings.push("Liquidité négative : le revenu net ne couvre pas l'hypothèque".into());
    }

    let message = multi_message(rating, cashflow_per_unit);
    tracing::debug!(%cashflow_per_unit, %rating, "napkin multi computed");

    let output = MultiNapkinOutput {
        purchase_price: input.purchase_price,
        unit_count: input.unit_count,
        gross_revenue: input.gross_revenue,
        expense_percentage,
        expenses,
        noi,
        mortgage_payment,
        cashflow,
        cashflow_per_unit,
        rating,
        message,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "PAR + HIGH-5 Napkin Multi-Unit Estimate",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn multi_message(rating: Rating, per_unit: Money) -> String {
    let per_unit = round_money(per_unit);
    match rating {
        Rating::Excellent => {
            format!("Excellent : {per_unit} $ par porte par mois")
        }
        Rating::Good => format!("Bon : {per_unit} $ par porte par mois, cible atteinte"),
        Rating::Acceptable => format!(
            "Acceptable : {per_unit} $ par porte par mois, sous la cible de {} $",
            MULTI_CASHFLOW_SCALE.good
        ),
        Rating::Insufficient => format!(
            "Insuffisant : {per_unit} $ par porte par mois (minimum {} $)",
            MULTI_CASHFLOW_SCALE.acceptable
        ),
    }
}
