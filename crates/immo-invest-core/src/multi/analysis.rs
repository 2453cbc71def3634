use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::expenses::{analyze_expenses, ExpenseAnalysis};
use super::financing::{analyze_financing, validate_down_payment, FinancingAnalysis};
use super::optimization::{analyze_optimization, OptimizationAnalysis};
use super::revenue::{analyze_revenue, RevenueAnalysis};
use super::MultiInput;
use crate::config::{
    APPRECIATION_ASSUMPTION_PERCENT, MAX_EXPENSE_RATIO_PERCENT, MAX_LTV_PERCENT,
    MIN_CAP_RATE_PERCENT, MIN_CASH_ON_CASH_PERCENT, MIN_DSCR, MULTI_CASHFLOW_SCALE,
    MULTI_MINIMUM_CASHFLOW_PER_UNIT, MULTI_TARGET_CASHFLOW_PER_UNIT,
};
use crate::error::ImmoInvestError;
use crate::formulas::{round_money, round_percent};
use crate::types::{
    percent_ratio, ratio, with_metadata, AnalysisResult, ComputationOutput, Money, Rating, Ratio,
};
use crate::ImmoInvestResult;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiSummary {
    pub purchase_price: Money,
    pub unit_count: u32,
    /// Price + renovation + acquisition costs
    pub total_investment: Money,
    pub net_operating_income: Money,
    pub annual_debt_service: Money,
    pub annual_cashflow: Money,
    pub monthly_cashflow: Money,
    pub cashflow_per_unit: Money,
    pub cap_rate: Ratio,
    pub cash_on_cash: Ratio,
    pub rating: Rating,
    pub meets_minimum: bool,
    pub meets_target: bool,
    pub is_viable: bool,
    pub message: String,
}

/// Return ratios, all in percent except GRM and DSCR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiRatios {
    pub cap_rate: Ratio,
    pub grm: Ratio,
    pub cash_on_cash: Ratio,
    pub dscr: Ratio,
    pub ltv: Ratio,
    pub break_even_ratio: Ratio,
    pub expense_ratio: Ratio,
    /// Cap rate plus the appreciation assumption
    pub tga: Ratio,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiDetails {
    pub revenue: RevenueAnalysis,
    pub expenses: ExpenseAnalysis,
    pub financing: FinancingAnalysis,
    pub ratios: MultiRatios,
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimization: Option<OptimizationAnalysis>,
}

pub type MultiAnalysis = AnalysisResult<MultiSummary, MultiDetails>;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Full return analysis of a multi-unit building: revenue, expenses, NOI,
/// layered financing, cashflow per door, ratios and recommendations.
pub fn analyze_multi(input: &MultiInput) -> ImmoInvestResult<ComputationOutput<MultiAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let (revenue, expenses, noi) = operating_income(input)?;
    let financing = analyze_financing(input.purchase_price, &input.financing)?;

    let units = Decimal::from(input.unit_count);
    let debt_service = financing.annual_debt_service;
    let annual_cashflow = noi - debt_service;
    let monthly_cashflow = annual_cashflow / dec!(12);
    let cashflow_per_unit = monthly_cashflow / units;

    let total_investment = input.purchase_price + input.renovation_cost + input.acquisition_costs;
    let cap_rate = percent_ratio(noi, total_investment);
    let ratios = MultiRatios {
        cap_rate,
        grm: ratio(total_investment, revenue.rental_revenue),
        cash_on_cash: percent_ratio(annual_cashflow, financing.down_payment),
        dscr: ratio(noi, debt_service),
        ltv: percent_ratio(financing.total_financed, input.purchase_price),
        break_even_ratio: percent_ratio(
            expenses.total_expenses + debt_service,
            revenue.potential_gross_revenue,
        ),
        expense_ratio: expenses.expense_ratio,
        tga: cap_rate.map(|c| c + APPRECIATION_ASSUMPTION_PERCENT),
    };

    let meets_minimum = cashflow_per_unit >= MULTI_MINIMUM_CASHFLOW_PER_UNIT;
    let meets_target = cashflow_per_unit >= MULTI_TARGET_CASHFLOW_PER_UNIT;
    let rating = MULTI_CASHFLOW_SCALE.rate(cashflow_per_unit);
    let message = viability_message(meets_minimum, meets_target, cashflow_per_unit);
    let mut recommendations = recommendations(&ratios);

    let optimization = input
        .optimization
        .as_ref()
        .map(|plan| analyze_optimization(plan, noi, annual_cashflow, input.unit_count))
        .transpose()?;
    // Optimization advice also lands in the main list, after the ratio checks
    if let Some(opt) = &optimization {
        recommendations.extend(opt.recommendations.iter().cloned());
    }

    if !input.revenue.units.is_empty() && input.revenue.units.len() != input.unit_count as usize {
        warnings.push(format!(
            "{} logements listés pour un immeuble de {} portes",
            input.revenue.units.len(),
            input.unit_count
        ));
    }
    if annual_cashflow < Decimal::ZERO {
        warnings.push(format!(
            "Liquidité négative de {} $ par année",
            round_money(-annual_cashflow)
        ));
    }
    if noi < Decimal::ZERO {
        warnings.push("Le revenu net d'exploitation est négatif".into());
    }

    tracing::debug!(%noi, %cashflow_per_unit, meets_target, "multi analysis computed");

    let output = MultiAnalysis {
        summary: MultiSummary {
            purchase_price: input.purchase_price,
            unit_count: input.unit_count,
            total_investment,
            net_operating_income: noi,
            annual_debt_service: debt_service,
            annual_cashflow,
            monthly_cashflow,
            cashflow_per_unit,
            cap_rate,
            cash_on_cash: ratios.cash_on_cash,
            rating,
            meets_minimum,
            meets_target,
            is_viable: meets_minimum,
            message,
        },
        details: MultiDetails {
            revenue,
            expenses,
            financing,
            ratios,
            recommendations,
            optimization,
        },
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "MULTI Return Analysis (NOI, layered financing, cashflow per unit)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Revenue, expenses and NOI of a building. Independent of the price and
/// financing, which is what the liquidity solver relies on.
pub fn operating_income(
    input: &MultiInput,
) -> ImmoInvestResult<(RevenueAnalysis, ExpenseAnalysis, Money)> {
    if input.unit_count == 0 {
        return Err(ImmoInvestError::missing(
            "unit_count",
            "le nombre de logements est requis",
        ));
    }
    let revenue = analyze_revenue(&input.revenue)?;
    let expenses = analyze_expenses(&input.expenses, &revenue, input.unit_count)?;
    let noi = revenue.effective_gross_revenue - expenses.total_expenses;
    Ok((revenue, expenses, noi))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &MultiInput) -> ImmoInvestResult<()> {
    if input.purchase_price <= Decimal::ZERO {
        return Err(ImmoInvestError::missing(
            "purchase_price",
            "le prix d'achat est requis et doit être positif",
        ));
    }
    if input.unit_count == 0 {
        return Err(ImmoInvestError::missing(
            "unit_count",
            "le nombre de logements est requis",
        ));
    }
    if input.renovation_cost < Decimal::ZERO {
        return Err(ImmoInvestError::out_of_range(
            "renovation_cost",
            "le coût des rénovations ne peut pas être négatif",
        ));
    }
    if input.acquisition_costs < Decimal::ZERO {
        return Err(ImmoInvestError::out_of_range(
            "acquisition_costs",
            "les frais d'acquisition ne peuvent pas être négatifs",
        ));
    }
    validate_down_payment(input.financing.down_payment_percentage)
}

fn viability_message(meets_minimum: bool, meets_target: bool, per_unit: Money) -> String {
    let per_unit = round_money(per_unit);
    if meets_target {
        format!("Projet viable : {per_unit} $ par porte par mois")
    } else if meets_minimum {
        format!(
            "Projet acceptable : {per_unit} $ par porte par mois, sous la cible de {} $",
            MULTI_TARGET_CASHFLOW_PER_UNIT
        )
    } else {
        format!(
            "Projet non viable : {per_unit} $ par porte par mois, sous le minimum de {} $",
            MULTI_MINIMUM_CASHFLOW_PER_UNIT
        )
    }
}

fn recommendations(ratios: &MultiRatios) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(cap) = ratios.cap_rate.filter(|c| *c < MIN_CAP_RATE_PERCENT) {
        out.push(format!(
            "Taux de capitalisation faible ({} %) : négocier le prix ou augmenter les revenus",
            round_percent(cap)
        ));
    }
    if let Some(coc) = ratios.cash_on_cash.filter(|c| *c < MIN_CASH_ON_CASH_PERCENT) {
        out.push(format!(
            "Rendement sur mise de fonds faible ({} %) : revoir la structure de financement",
            round_percent(coc)
        ));
    }
    if let Some(er) = ratios.expense_ratio.filter(|e| *e > MAX_EXPENSE_RATIO_PERCENT) {
        out.push(format!(
            "Ratio de dépenses élevé ({} %) : identifier les économies possibles",
            round_percent(er)
        ));
    }
    if let Some(dscr) = ratios.dscr.filter(|d| *d < MIN_DSCR) {
        out.push(format!(
            "Ratio de couverture de la dette insuffisant ({}) : les prêteurs exigent {}",
            round_percent(dscr),
            MIN_DSCR
        ));
    }
    if let Some(ltv) = ratios.ltv.filter(|l| *l > MAX_LTV_PERCENT) {
        out.push(format!(
            "Ratio prêt-valeur élevé ({} %) : effet de levier risqué",
            round_percent(ltv)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multi::{
        ExpenseDetails, FinancingInstrument, InstrumentKind, MortgageTerms, MultiFinancing,
        RevenueDetails,
    };
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    /// 4 doors, 48,000 gross, 18,000 expenses, zero-rate mortgage so the
    /// debt service is exact.
    fn quadruplex() -> MultiInput {
        MultiInput {
            purchase_price: dec!(400_000),
            unit_count: 4,
            renovation_cost: Decimal::ZERO,
            acquisition_costs: Decimal::ZERO,
            revenue: RevenueDetails {
                gross_rental_revenue: Some(dec!(48_000)),
                vacancy_rate: Some(Decimal::ZERO),
                ..Default::default()
            },
            expenses: ExpenseDetails {
                operating: BTreeMap::from([("all".to_string(), dec!(18_000))]),
                ..Default::default()
            },
            financing: MultiFinancing {
                down_payment_percentage: dec!(0.25),
                mortgage: MortgageTerms {
                    annual_rate_percent: Decimal::ZERO,
                    amortization_years: 25,
                    term_years: 5,
                },
                creative: vec![],
            },
            optimization: None,
        }
    }

    #[test]
    fn test_noi_cashflow_and_ratios() {
        let out = analyze_multi(&quadruplex()).unwrap();
        let s = &out.result.summary;
        let r = &out.result.details.ratios;
        assert_eq!(s.net_operating_income, dec!(30_000));
        // 300,000 over 300 months
        assert_eq!(s.annual_debt_service, dec!(12_000));
        assert_eq!(s.annual_cashflow, dec!(18_000));
        assert_eq!(s.cashflow_per_unit, dec!(375));
        assert_eq!(s.rating, Rating::Excellent);
        assert!(s.meets_target);
        assert_eq!(r.cap_rate, Some(dec!(7.5)));
        assert_eq!(r.tga, Some(dec!(9.5)));
        assert_eq!(r.cash_on_cash, Some(dec!(18)));
        assert_eq!(r.dscr, Some(dec!(2.5)));
        assert_eq!(r.ltv, Some(dec!(75)));
        assert_eq!(r.break_even_ratio, Some(dec!(62.5)));
        assert!(out.result.details.recommendations.is_empty());
    }

    #[test]
    fn test_all_recommendations_collected() {
        let mut input = quadruplex();
        input.expenses.operating.insert("all".into(), dec!(40_000));
        input.financing.creative.push(FinancingInstrument {
            kind: InstrumentKind::SecondMortgage,
            label: None,
            principal: dec!(50_000),
            annual_rate_percent: Decimal::ZERO,
            amortization_years: 10,
            term_years: None,
            interest_only: false,
        });
        let out = analyze_multi(&input).unwrap();
        // NOI 8,000: cap 2%, negative cash on cash, expense ratio 83%,
        // DSCR below 1, LTV 87.5%
        assert_eq!(out.result.details.recommendations.len(), 5);
        assert!(!out.result.summary.meets_minimum);
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_missing_down_payment() {
        let mut input = quadruplex();
        input.financing.down_payment_percentage = Decimal::ZERO;
        let err = analyze_multi(&input).unwrap_err();
        assert!(matches!(err, ImmoInvestError::MissingRequiredField { .. }));
    }

    #[test]
    fn test_zero_units_rejected() {
        let mut input = quadruplex();
        input.unit_count = 0;
        assert!(analyze_multi(&input).is_err());
    }

    #[test]
    fn test_optimization_attached() {
        let mut input = quadruplex();
        input.optimization = Some(serde_json::from_value(serde_json::json!({
            "revenue_additions": [{ "description": "Stationnement", "annual_revenue": 2400, "cost": 6000 }]
        })).unwrap());
        let out = analyze_multi(&input).unwrap();
        let opt = out.result.details.optimization.unwrap();
        assert_eq!(opt.optimized_cashflow, dec!(20_400));
        assert_eq!(opt.roi, Some(dec!(40)));
    }

    #[test]
    fn test_optimization_advice_reaches_main_recommendations() {
        let mut input = quadruplex();
        input.optimization = Some(serde_json::from_value(serde_json::json!({
            "revenue_additions": [{ "description": "Stationnement", "annual_revenue": 2400, "cost": 6000 }]
        })).unwrap());
        let out = analyze_multi(&input).unwrap();
        let details = &out.result.details;
        let opt = details.optimization.as_ref().unwrap();
        assert!(!opt.recommendations.is_empty());
        // the ratio checks are all clean, so the main list is exactly the optimization advice
        assert_eq!(details.recommendations, opt.recommendations);
        assert!(details.recommendations[0].contains("rendement des optimisations"));
    }
}
