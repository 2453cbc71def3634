use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::{
    OPTIMIZATION_EXCELLENT_ROI_PERCENT, OPTIMIZATION_FAST_PAYBACK_YEARS,
    OPTIMIZATION_GOOD_ROI_PERCENT, OPTIMIZATION_SIGNIFICANT_CASHFLOW_PER_UNIT,
};
use crate::error::ImmoInvestError;
use crate::formulas::round_money;
use crate::types::{percent_ratio, ratio, Money, Ratio};
use crate::ImmoInvestResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationPlan {
    #[serde(default)]
    pub rent_increases: Vec<RentIncrease>,
    #[serde(default)]
    pub revenue_additions: Vec<RevenueAddition>,
    #[serde(default)]
    pub expense_reductions: Vec<ExpenseReduction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentIncrease {
    #[serde(default)]
    pub description: String,
    pub units_affected: u32,
    pub monthly_increase: Money,
    #[serde(default)]
    pub cost: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueAddition {
    #[serde(default)]
    pub description: String,
    pub annual_revenue: Money,
    #[serde(default)]
    pub cost: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseReduction {
    #[serde(default)]
    pub description: String,
    pub annual_savings: Money,
    #[serde(default)]
    pub cost: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationAnalysis {
    pub rent_increase_gain: Money,
    pub revenue_addition_gain: Money,
    pub expense_savings: Money,
    /// Added NOI per year
    pub total_annual_gain: Money,
    pub total_cost: Money,
    /// Annual gain over cost, in percent
    pub roi: Ratio,
    pub payback_years: Ratio,
    /// Monthly cashflow added per door
    pub added_cashflow_per_unit: Money,
    pub optimized_noi: Money,
    pub optimized_cashflow: Money,
    pub optimized_cashflow_per_unit: Money,
    pub recommendations: Vec<String>,
}

pub fn analyze_optimization(
    plan: &OptimizationPlan,
    base_noi: Money,
    base_cashflow: Money,
    unit_count: u32,
) -> ImmoInvestResult<OptimizationAnalysis> {
    let costs = plan
        .rent_increases
        .iter()
        .map(|r| r.cost)
        .chain(plan.revenue_additions.iter().map(|r| r.cost))
        .chain(plan.expense_reductions.iter().map(|r| r.cost));
    for cost in costs {
        if cost < Decimal::ZERO {
            return Err(ImmoInvestError::out_of_range(
                "optimization.cost",
                "le coût d'une optimisation ne peut pas être négatif",
            ));
        }
    }

    let rent_increase_gain: Money = plan
        .rent_increases
        .iter()
        .map(|r| r.monthly_increase * Decimal::from(r.units_affected) * dec!(12))
        .sum();
    let revenue_addition_gain: Money = plan.revenue_additions.iter().map(|r| r.annual_revenue).sum();
    let expense_savings: Money = plan.expense_reductions.iter().map(|r| r.annual_savings).sum();
    let total_annual_gain = rent_increase_gain + revenue_addition_gain + expense_savings;

    let total_cost: Money = plan.rent_increases.iter().map(|r| r.cost).sum::<Decimal>()
        + plan.revenue_additions.iter().map(|r| r.cost).sum::<Decimal>()
        + plan.expense_reductions.iter().map(|r| r.cost).sum::<Decimal>();

    let roi = percent_ratio(total_annual_gain, total_cost);
    let payback_years = if total_annual_gain > Decimal::ZERO {
        ratio(total_cost, total_annual_gain)
    } else {
        None
    };

    let per_unit = |annual: Money| {
        if unit_count == 0 {
            Decimal::ZERO
        } else {
            annual / dec!(12) / Decimal::from(unit_count)
        }
    };
    let added_cashflow_per_unit = per_unit(total_annual_gain);
    let optimized_noi = base_noi + total_annual_gain;
    let optimized_cashflow = base_cashflow + total_annual_gain;
    let optimized_cashflow_per_unit = per_unit(optimized_cashflow);

    let mut recommendations = Vec::new();
    match roi {
        Some(r) if r > OPTIMIZATION_EXCELLENT_ROI_PERCENT => recommendations.push(format!(
            "Excellent rendement des optimisations ({} % par année) : à prioriser",
            round_money(r)
        )),
        Some(r) if r > OPTIMIZATION_GOOD_ROI_PERCENT => recommendations.push(format!(
            "Bon rendement des optimisations ({} % par année)",
            round_money(r)
        )),
        _ => {}
    }
    if payback_years.is_some_and(|p| p < OPTIMIZATION_FAST_PAYBACK_YEARS) {
        recommendations.push("Récupération rapide de l'investissement (moins de 2 ans)".into());
    }
    if added_cashflow_per_unit > OPTIMIZATION_SIGNIFICANT_CASHFLOW_PER_UNIT {
        recommendations.push(format!(
            "Gain significatif de {} $ par porte par mois",
            round_money(added_cashflow_per_unit)
        ));
    }

    Ok(OptimizationAnalysis {
        rent_increase_gain,
        revenue_addition_gain,
        expense_savings,
        total_annual_gain,
        total_cost,
        roi,
        payback_years,
        added_cashflow_per_unit,
        optimized_noi,
        optimized_cashflow,
        optimized_cashflow_per_unit,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> OptimizationPlan {
        OptimizationPlan {
            rent_increases: vec![RentIncrease {
                description: "Rénovation cuisine".into(),
                units_affected: 2,
                monthly_increase: dec!(100),
                cost: dec!(8_000),
            }],
            revenue_additions: vec![RevenueAddition {
                description: "Buanderie".into(),
                annual_revenue: dec!(1_200),
                cost: dec!(2_000),
            }],
            expense_reductions: vec![ExpenseReduction {
                description: "Thermopompe".into(),
                annual_savings: dec!(600),
                cost: Decimal::ZERO,
            }],
        }
    }

    #[test]
    fn test_gains_and_payback() {
        let o = analyze_optimization(&plan(), dec!(30_000), dec!(4_000), 4).unwrap();
        assert_eq!(o.rent_increase_gain, dec!(2_400));
        assert_eq!(o.total_annual_gain, dec!(4_200));
        assert_eq!(o.total_cost, dec!(10_000));
        assert_eq!(o.roi, Some(dec!(42)));
        assert_eq!(o.payback_years, Some(dec!(10_000) / dec!(4_200)));
        assert_eq!(o.optimized_noi, dec!(34_200));
        assert_eq!(o.optimized_cashflow, dec!(8_200));
        // 4,200 / 12 / 4
        assert_eq!(o.added_cashflow_per_unit, dec!(87.5));
        assert_eq!(o.recommendations.len(), 2);
    }

    #[test]
    fn test_free_improvements_have_no_roi() {
        let plan = OptimizationPlan {
            expense_reductions: vec![ExpenseReduction {
                description: String::new(),
                annual_savings: dec!(120),
                cost: Decimal::ZERO,
            }],
            ..Default::default()
        };
        let o = analyze_optimization(&plan, dec!(10_000), dec!(1_000), 2).unwrap();
        assert_eq!(o.roi, None);
        assert_eq!(o.payback_years, Some(Decimal::ZERO));
        assert!(o.recommendations[0].contains("moins de 2 ans"));
    }

    #[test]
    fn test_negative_cost_rejected() {
        let mut p = plan();
        p.revenue_additions[0].cost = dec!(-1);
        assert!(analyze_optimization(&p, Decimal::ZERO, Decimal::ZERO, 1).is_err());
    }
}
