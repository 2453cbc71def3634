use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::costs::{acquisition_costs, financing_costs, holding_costs, selling_costs, FinancingCosts};
use super::FlipInput;
use crate::config::{
    FLIP_MINIMUM_PROFIT, FLIP_PROFIT_SCALE, MAX_HOLDING_PERIOD_MONTHS, MAX_INTEREST_RATE_PERCENT,
};
use crate::error::ImmoInvestError;
use crate::formulas::{annualize_percent, round_money, round_percent};
use crate::types::{
    percent_ratio, with_metadata, AnalysisResult, ComputationOutput, CostBreakdown, Money, Rating,
    Ratio,
};
use crate::ImmoInvestResult;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlipSummary {
    pub purchase_price: Money,
    pub selling_price: Money,
    /// Price + renovation + acquisition + financing
    pub total_investment: Money,
    /// Total investment + holding + selling
    pub total_costs: Money,
    pub profit: Money,
    /// Profit over total investment, in percent
    pub roi: Ratio,
    /// ROI compounded to a 12-month horizon
    pub annualized_roi: Ratio,
    pub rating: Rating,
    pub is_viable: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlipDetails {
    pub renovation_cost: Money,
    pub holding_period_months: Decimal,
    pub acquisition_costs: CostBreakdown,
    pub holding_costs: CostBreakdown,
    pub selling_costs: CostBreakdown,
    pub financing_costs: FinancingCosts,
}

pub type FlipAnalysis = AnalysisResult<FlipSummary, FlipDetails>;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Itemized flip analysis: acquisition, holding, selling and financing costs,
/// profit, ROI and viability against the minimum profit.
pub fn analyze_flip(input: &FlipInput) -> ImmoInvestResult<ComputationOutput<FlipAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let acquisition = acquisition_costs(input);
    let holding = holding_costs(input);
    let selling = selling_costs(input);
    let financing = financing_costs(input);

    let total_investment =
        input.purchase_price + input.renovation_cost + acquisition.total + financing.total;
    let total_costs = total_investment + holding.total + selling.total;
    let profit = input.selling_price - total_costs;

    let roi = percent_ratio(profit, total_investment);
    let annualized_roi = roi.and_then(|r| annualize_percent(r, input.holding_period_months));

    let rating = FLIP_PROFIT_SCALE.rate(profit);
    let is_viable = profit >= FLIP_MINIMUM_PROFIT;
    let message = viability_message(is_viable, profit, roi);

    if profit < Decimal::ZERO {
        warnings.push(format!(
            "Le projet génère une perte de {} $",
            round_money(-profit)
        ));
    }
    if roi.is_some() && annualized_roi.is_none() {
        warnings.push("ROI annualisé non représentable (perte totale ou période trop courte)".into());
    }
    if input.holding_period_months > Decimal::from(24) {
        warnings.push(format!(
            "Période de détention de {} mois : inhabituelle pour un flip",
            input.holding_period_months
        ));
    }

    tracing::debug!(%profit, is_viable, "flip analysis computed");

    let output = FlipAnalysis {
        summary: FlipSummary {
            purchase_price: input.purchase_price,
            selling_price: input.selling_price,
            total_investment,
            total_costs,
            profit,
            roi,
            annualized_roi,
            rating,
            is_viable,
            message,
        },
        details: FlipDetails {
            renovation_cost: input.renovation_cost,
            holding_period_months: input.holding_period_months,
            acquisition_costs: acquisition,
            holding_costs: holding,
            selling_costs: selling,
            financing_costs: financing,
        },
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Detailed FLIP Analysis (itemized costs)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &FlipInput) -> ImmoInvestResult<()> {
    if input.purchase_price <= Decimal::ZERO {
        return Err(ImmoInvestError::missing(
            "purchase_price",
            "le prix d'achat est requis et doit être positif",
        ));
    }
    if input.selling_price <= Decimal::ZERO {
        return Err(ImmoInvestError::missing(
            "selling_price",
            "le prix de vente est requis et doit être positif",
        ));
    }
    if input.purchase_price >= input.selling_price {
        return Err(ImmoInvestError::out_of_range(
            "purchase_price",
            "le prix d'achat doit être inférieur au prix de vente",
        ));
    }
    if input.renovation_cost < Decimal::ZERO {
        return Err(ImmoInvestError::out_of_range(
            "renovation_cost",
            "le coût des rénovations ne peut pas être négatif",
        ));
    }
    if input.holding_period_months <= Decimal::ZERO {
        return Err(ImmoInvestError::out_of_range(
            "holding_period_months",
            "la période de détention doit être positive",
        ));
    }
    if input.holding_period_months > MAX_HOLDING_PERIOD_MONTHS {
        return Err(ImmoInvestError::out_of_range(
            "holding_period_months",
            format!(
                "la période de détention ne peut pas dépasser {MAX_HOLDING_PERIOD_MONTHS} mois"
            ),
        ));
    }
    if let Some(financing) = &input.financing {
        if let Some(ltv) = financing.loan_to_value {
            if ltv <= Decimal::ZERO || ltv >= Decimal::ONE {
                return Err(ImmoInvestError::out_of_range(
                    "financing.loan_to_value",
                    "le ratio prêt-valeur doit être entre 0 et 1",
                ));
            }
        }
        if financing
            .interest_rate_percent
            .is_some_and(|r| r.abs() > MAX_INTEREST_RATE_PERCENT)
        {
            return Err(ImmoInvestError::out_of_range(
                "financing.interest_rate_percent",
                format!(
                    "le taux ne peut pas dépasser {MAX_INTEREST_RATE_PERCENT} % en valeur absolue"
                ),
            ));
        }
        if financing.loan_amount.is_some_and(|l| l < Decimal::ZERO) {
            return Err(ImmoInvestError::out_of_range(
                "financing.loan_amount",
                "le montant du prêt ne peut pas être négatif",
            ));
        }
    }
    Ok(())
}

fn viability_message(is_viable: bool, profit: Money, roi: Ratio) -> String {
    let roi_text = roi
        .map(|r| format!("{} %", round_percent(r)))
        .unwrap_or_else(|| "n/d".into());
    if is_viable {
        format!(
            "Projet viable : profit de {} $ (ROI {roi_text})",
            round_money(profit)
        )
    } else {
        format!(
            "Projet non viable : profit de {} $ sous le minimum de {} $ (ROI {roi_text})",
            round_money(profit),
            FLIP_MINIMUM_PROFIT
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CostSpec;
    use rust_decimal_macros::dec;

    fn sample() -> FlipInput {
        FlipInput::new(dec!(300_000), dec!(400_000), dec!(30_000))
    }

    #[test]
    fn test_profit_consistency_defaults() {
        let out = analyze_flip(&sample()).unwrap().result;
        let d = &out.details;
        let expected = dec!(400_000)
            - (dec!(300_000)
                + dec!(30_000)
                + d.acquisition_costs.total
                + d.holding_costs.total
                + d.selling_costs.total
                + d.financing_costs.total);
        assert_eq!(out.summary.profit, expected);
    }

    #[test]
    fn test_very_short_holding_period_has_no_annualized_roi() {
        let mut input = sample();
        input.holding_period_months = dec!(0.001);
        let out = analyze_flip(&input).unwrap();
        assert!(out.result.summary.roi.is_some());
        assert_eq!(out.result.summary.annualized_roi, None);
        assert!(out.warnings.iter().any(|w| w.contains("ROI annualisé")));
    }

    #[test]
    fn test_holding_period_and_rate_bounds() {
        let mut input = sample();
        input.holding_period_months = dec!(500);
        let err = analyze_flip(&input).unwrap_err();
        assert!(matches!(err, ImmoInvestError::InvalidRange { ref field, .. }
            if field == "holding_period_months"));

        let mut input = sample();
        input.financing = Some(crate::flip::FlipFinancing {
            loan_amount: None,
            loan_to_value: None,
            interest_rate_percent: Some(dec!(1_000_000)),
            origination_fee_rate: None,
        });
        let err = analyze_flip(&input).unwrap_err();
        assert!(matches!(err, ImmoInvestError::InvalidRange { ref field, .. }
            if field == "financing.interest_rate_percent"));
    }

    #[test]
    fn test_known_default_profit() {
        let out = analyze_flip(&sample()).unwrap().result;
        // acquisition 6,300; holding 3,900; selling 23,000; financing 8,400
        assert_eq!(out.details.acquisition_costs.total, dec!(6300));
        assert_eq!(out.summary.total_investment, dec!(344_700));
        assert_eq!(out.summary.total_costs, dec!(371_600));
        assert_eq!(out.summary.profit, dec!(28_400));
        assert!(out.summary.is_viable);
        assert_eq!(out.summary.rating, Rating::Good);
    }

    #[test]
    fn test_profit_consistency_itemized() {
        let mut input = sample();
        input.acquisition_costs = Some(CostSpec::Flat(dec!(5000)));
        input.selling_costs = Some(
            serde_json::from_value(serde_json::json!({"broker": 15000, "legal": 1200})).unwrap(),
        );
        let out = analyze_flip(&input).unwrap().result;
        let d = &out.details;
        assert_eq!(d.acquisition_costs.total, dec!(5000));
        assert_eq!(d.selling_costs.total, dec!(16_200));
        assert_eq!(
            out.summary.profit,
            dec!(400_000) - out.summary.total_costs
        );
        assert_eq!(
            out.summary.total_costs,
            dec!(330_000)
                + d.acquisition_costs.total
                + d.holding_costs.total
                + d.selling_costs.total
                + d.financing_costs.total
        );
    }

    #[test]
    fn test_roi_and_annualized() {
        let out = analyze_flip(&sample()).unwrap().result;
        let roi = out.summary.roi.unwrap();
        assert_eq!(roi, dec!(28_400) / dec!(344_700) * dec!(100));
        let annual = out.summary.annualized_roi.unwrap();
        // Six months: roughly (1 + roi)^2 - 1
        assert!(annual > roi * dec!(2));
    }

    #[test]
    fn test_not_viable_below_minimum() {
        let input = FlipInput::new(dec!(300_000), dec!(360_000), dec!(10_000));
        let out = analyze_flip(&input).unwrap().result;
        assert!(!out.summary.is_viable);
        assert!(out.summary.message.starts_with("Projet non viable"));
    }

    #[test]
    fn test_missing_selling_price() {
        let input: FlipInput =
            serde_json::from_value(serde_json::json!({"purchase_price": 250000})).unwrap();
        let err = analyze_flip(&input).unwrap_err();
        match err {
            ImmoInvestError::MissingRequiredField { field, .. } => {
                assert_eq!(field, "selling_price")
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_defaults_from_json() {
        let input: FlipInput = serde_json::from_value(serde_json::json!({
            "purchase_price": 250000,
            "sale_price": 330000
        }))
        .unwrap();
        assert_eq!(input.holding_period_months, dec!(6));
        assert_eq!(input.renovation_cost, Decimal::ZERO);
    }

    #[test]
    fn test_invalid_ltv() {
        let mut input = sample();
        input.financing = Some(super::super::FlipFinancing {
            loan_amount: None,
            loan_to_value: Some(dec!(1.2)),
            interest_rate_percent: None,
            origination_fee_rate: None,
        });
        assert!(matches!(
            analyze_flip(&input).unwrap_err(),
            ImmoInvestError::InvalidRange { .. }
        ));
    }

    #[test]
    fn test_idempotent() {
        let input = sample();
        let a = analyze_flip(&input).unwrap();
        let b = analyze_flip(&input).unwrap();
        assert_eq!(a.result, b.result);
        assert_eq!(a.warnings, b.warnings);
    }
}
