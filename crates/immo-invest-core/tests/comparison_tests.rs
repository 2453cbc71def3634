use immo_invest_core::comparison::{
    compare_scenarios, sensitivity_analysis, ComparisonOptions, Criterion, Scenario,
};
use immo_invest_core::{DealType, ImmoInvestError};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

fn scenario(value: serde_json::Value) -> Scenario {
    serde_json::from_value(value).unwrap()
}

/// Cashflow 375 per door, cap rate 7.5%, cash-on-cash 18%
fn strong_multi() -> Scenario {
    scenario(json!({
        "name": "Quadruplex Limoilou",
        "purchase_price": 400000,
        "unit_count": 4,
        "revenue": { "gross_rental_revenue": 48000, "vacancy_rate": 0 },
        "expenses": { "operating": { "all": 18000 } },
        "financing": {
            "down_payment_percentage": 0.25,
            "mortgage": { "annual_rate_percent": 0, "amortization_years": 25 }
        }
    }))
}

/// Negative cashflow: penalized
fn weak_multi() -> Scenario {
    scenario(json!({
        "name": "Triplex Verdun",
        "purchase_price": 400000,
        "unit_count": 4,
        "revenue": { "gross_rental_revenue": 48000, "vacancy_rate": 0 },
        "expenses": { "operating": { "all": 40000 } },
        "financing": {
            "down_payment_percentage": 0.25,
            "mortgage": { "annual_rate_percent": 0, "amortization_years": 25 }
        }
    }))
}

/// Profit 28,400 on 344,700 invested
fn flip(name: &str) -> Scenario {
    scenario(json!({
        "name": name,
        "purchase_price": 300000,
        "selling_price": 400000,
        "renovation_cost": 30000
    }))
}

#[test]
fn test_ranking_mixed_deals() {
    let scenarios = vec![weak_multi(), flip("Bungalow"), strong_multi()];
    let out = compare_scenarios(&scenarios, &ComparisonOptions::default())
        .unwrap()
        .result;

    let order: Vec<&str> = out.ranked_scenarios.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(order, vec!["Quadruplex Limoilou", "Bungalow", "Triplex Verdun"]);
    let ranks: Vec<usize> = out.ranked_scenarios.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);

    // 375 × 0.5 + 7.5 × 0.3 + 18 × 0.2
    assert_eq!(out.ranked_scenarios[0].score, Some(dec!(193.35)));
    assert_eq!(out.best_overall.as_deref(), Some("Quadruplex Limoilou"));

    assert_eq!(out.best_by_metric[&Criterion::Profit], "Bungalow");
    assert_eq!(out.best_by_metric[&Criterion::CashflowPerUnit], "Quadruplex Limoilou");

    assert_eq!(out.summary.total, 3);
    assert_eq!(out.summary.flip_count, 1);
    assert_eq!(out.summary.multi_count, 2);
    assert_eq!(out.summary.viable_count, 2);
    assert_eq!(out.summary.max_score, Some(dec!(193.35)));
}

#[test]
fn test_ties_keep_input_order() {
    let scenarios = vec![flip("A"), flip("B"), flip("C")];
    let out = compare_scenarios(&scenarios, &ComparisonOptions::default())
        .unwrap()
        .result;
    let order: Vec<&str> = out.ranked_scenarios.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(order, vec!["A", "B", "C"]);
    assert_eq!(out.best_by_metric[&Criterion::Roi], "A");
}

#[test]
fn test_criterion_overrides_score() {
    let scenarios = vec![strong_multi(), flip("Bungalow")];
    let out = compare_scenarios(&scenarios, &ComparisonOptions::ranked_by(Criterion::Profit))
        .unwrap();
    let ranked = &out.result.ranked_scenarios;
    assert_eq!(ranked[0].name, "Bungalow");
    assert_eq!(ranked[0].score, Some(dec!(28_400)));
    // MULTI deals have no profit metric and sink to the bottom
    assert_eq!(ranked[1].score, None);
    assert!(!out.warnings.is_empty());
}

#[test]
fn test_options_from_json() {
    let options: ComparisonOptions = serde_json::from_value(json!({
        "weights": { "cashflow_per_unit": 1, "cap_rate": 0, "cash_on_cash": 0 },
        "viability_penalty": 0
    }))
    .unwrap();
    assert_eq!(options.min_viable_cashflow_per_unit, dec!(75));
    let out = compare_scenarios(&[weak_multi()], &options).unwrap().result;
    assert_eq!(
        out.ranked_scenarios[0].score,
        Some(out.ranked_scenarios[0].metrics[&Criterion::CashflowPerUnit])
    );
}

#[test]
fn test_empty_comparison() {
    let err = compare_scenarios(&[], &ComparisonOptions::default()).unwrap_err();
    assert!(matches!(err, ImmoInvestError::InsufficientData(_)));
}

// ===========================================================================
// Sensitivity
// ===========================================================================

#[test]
fn test_sensitivity_symmetry() {
    let out = sensitivity_analysis(&strong_multi(), "revenue.gross_rental_revenue", dec!(100), 2)
        .unwrap()
        .result;
    assert_eq!(out.scenarios.len(), 5);

    let changes: Vec<Decimal> = out.scenarios.iter().map(|v| v.percent_change).collect();
    assert_eq!(changes, vec![dec!(-100), dec!(-50), dec!(50), dec!(100), Decimal::ZERO]);

    let values: Vec<Decimal> = out.scenarios.iter().map(|v| v.value).collect();
    assert_eq!(values, vec![Decimal::ZERO, dec!(24_000), dec!(72_000), dec!(96_000), dec!(48_000)]);
    assert!(out.scenarios[4].name.ends_with("(base)"));

    assert_eq!(out.criterion, Criterion::CashflowPerUnit);
    assert_eq!(out.comparison.ranked_scenarios[0].name, out.scenarios[3].name);
}

#[test]
fn test_sensitivity_flip_criterion_and_invalid_variants() {
    let out = sensitivity_analysis(&flip("Bungalow"), "purchase_price", dec!(100), 1).unwrap();
    assert_eq!(out.result.criterion, Criterion::Profit);
    // −100% leaves no purchase price, +100% prices above the sale: both dropped
    assert_eq!(out.result.scenarios.len(), 3);
    assert_eq!(out.result.comparison.ranked_scenarios.len(), 1);
    assert_eq!(out.result.comparison.ranked_scenarios[0].deal_type, DealType::Flip);
    assert!(out.warnings.iter().any(|w| w.contains("écarté")));
}

#[test]
fn test_sensitivity_integer_field() {
    let out = sensitivity_analysis(
        &strong_multi(),
        "financing.mortgage.amortization_years",
        dec!(20),
        1,
    )
    .unwrap()
    .result;
    let values: Vec<Decimal> = out.scenarios.iter().map(|v| v.value).collect();
    assert_eq!(values, vec![dec!(20), dec!(30), dec!(25)]);
}

#[test]
fn test_sensitivity_errors() {
    let base = strong_multi();
    assert!(matches!(
        sensitivity_analysis(&base, "purchase_price", dec!(10), 0).unwrap_err(),
        ImmoInvestError::InvalidRange { .. }
    ));
    assert!(matches!(
        sensitivity_analysis(&base, "purchase_price", Decimal::ZERO, 2).unwrap_err(),
        ImmoInvestError::InvalidRange { .. }
    ));
    assert!(matches!(
        sensitivity_analysis(&base, "revenue.nonexistent", dec!(10), 2).unwrap_err(),
        ImmoInvestError::MissingRequiredField { .. }
    ));
    assert!(matches!(
        sensitivity_analysis(&base, "revenue.units", dec!(10), 2).unwrap_err(),
        ImmoInvestError::InvalidRange { .. }
    ));
    assert!(matches!(
        sensitivity_analysis(&base, "renovation_cost", dec!(10), 2).unwrap_err(),
        ImmoInvestError::InvalidRange { .. }
    ));
}
