use immo_invest_core::acquisition::{
    generate_acquisition_model, required_units, yearly_acquisition_strategy,
    AcquisitionModelInput, AcquisitionStrategyInput,
};
use immo_invest_core::liquidity::{
    max_offer_price, max_purchase_price, max_purchase_price_for_deal, MaxOfferInput,
    MaxPurchasePriceInput,
};
use immo_invest_core::multi::{self, MultiInput};
use immo_invest_core::napkin::{napkin_flip, FlipNapkinInput};
use immo_invest_core::ImmoInvestError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

fn sixplex() -> MultiInput {
    serde_json::from_value(json!({
        "purchase_price": 700000,
        "unit_count": 6,
        "revenue": {
            "units": [
                { "monthly_rent": 1200 }, { "monthly_rent": 1200 }, { "monthly_rent": 1100 },
                { "monthly_rent": 1100 }, { "monthly_rent": 950 }, { "monthly_rent": 950 }
            ],
            "vacancy_rate": 0.03
        },
        "expenses": {
            "taxes": { "municipal": 7800 },
            "operating": { "assurances": 3200, "deneigement": 1500 },
            "maintenance": { "reserve": 3000 },
            "management": { "fees": { "gestion": 2800 } }
        },
        "financing": {
            "down_payment_percentage": 0.2,
            "mortgage": { "annual_rate_percent": 5.25, "amortization_years": 30 },
            "creative": [
                { "kind": "private_investor", "principal": 30000, "annual_rate_percent": 8,
                  "amortization_years": 10 }
            ]
        }
    }))
    .unwrap()
}

// ===========================================================================
// Max purchase price
// ===========================================================================

#[test]
fn test_max_purchase_price_round_trip() {
    let deal = sixplex();
    let solved = max_purchase_price_for_deal(&deal, Some(dec!(75))).unwrap().result;
    assert!(solved.target_reachable);

    let mut at_price = deal.clone();
    at_price.purchase_price = solved.max_purchase_price;
    let out = multi::analyze_multi(&at_price).unwrap().result;
    let gap = (out.summary.cashflow_per_unit - dec!(75)).abs();
    assert!(gap < dec!(0.01), "cashflow per unit off by {gap}");
}

#[test]
fn test_higher_target_lowers_price() {
    let deal = sixplex();
    let p75 = max_purchase_price_for_deal(&deal, None).unwrap().result;
    let p150 = max_purchase_price_for_deal(&deal, Some(dec!(150))).unwrap().result;
    assert!(p150.max_purchase_price < p75.max_purchase_price);
}

#[test]
fn test_defaults_from_json() {
    let input: MaxPurchasePriceInput = serde_json::from_value(json!({
        "noi": 30000,
        "units": 4,
        "down_payment_percentage": 0.2,
        "mortgage": { "annual_rate_percent": 0 }
    }))
    .unwrap();
    assert_eq!(input.target_cashflow_per_unit, dec!(75));
    assert_eq!(input.mortgage.amortization_years, 25);
    let out = max_purchase_price(&input).unwrap().result;
    assert_eq!(out.max_purchase_price, dec!(825_000));
}

#[test]
fn test_max_purchase_price_requires_down_payment() {
    let input: MaxPurchasePriceInput = serde_json::from_value(json!({
        "noi": 30000, "units": 4, "down_payment_percentage": 0
    }))
    .unwrap();
    assert!(matches!(
        max_purchase_price(&input).unwrap_err(),
        ImmoInvestError::MissingRequiredField { .. }
    ));
}

// ===========================================================================
// Max offer (FLIP)
// ===========================================================================

#[test]
fn test_max_offer_inverts_fip10() {
    let offer = max_offer_price(&MaxOfferInput {
        selling_price: dec!(425_000),
        renovation_cost: dec!(10_000),
        target_profit: dec!(13_500),
    })
    .unwrap()
    .result;
    assert_eq!(offer.max_offer_price, dec!(359_000));

    let napkin = napkin_flip(&FlipNapkinInput {
        final_price: dec!(425_000),
        initial_price: offer.max_offer_price,
        renovation_cost: dec!(10_000),
    })
    .unwrap()
    .result;
    assert_eq!(napkin.profit, dec!(13_500));
}

#[test]
fn test_max_offer_unreachable() {
    let input: MaxOfferInput =
        serde_json::from_value(json!({ "final_price": 50000, "renovation_cost": 20000 })).unwrap();
    assert!(matches!(
        max_offer_price(&input).unwrap_err(),
        ImmoInvestError::UnreachableTarget(_)
    ));
}

// ===========================================================================
// Portfolio growth
// ===========================================================================

#[test]
fn test_required_units_exact_division() {
    let out = required_units(dec!(1_500), dec!(75)).unwrap().result;
    assert_eq!(out.required_units, 20);
    assert_eq!(out.projected_monthly_income, dec!(1_500));
}

#[test]
fn test_strategy_cumulative_matches_requirement() {
    let input: AcquisitionStrategyInput = serde_json::from_value(json!({
        "target_monthly_income": 2000,
        "years": 4,
        "price_per_unit": 120000
    }))
    .unwrap();
    let out = yearly_acquisition_strategy(&input).unwrap().result;
    // ceil(2000 / 75) = 27 over 4 years
    assert_eq!(out.required_units, 27);
    let per_year: Vec<u32> = out.years.iter().map(|y| y.units_to_buy).collect();
    assert_eq!(per_year, vec![7, 7, 7, 6]);
    assert_eq!(out.years.last().map(|y| y.cumulative_units), Some(27));
    // 20% down on 120,000
    assert_eq!(out.years[0].down_payment_needed, dec!(168_000));
}

#[test]
fn test_strategy_zero_horizon() {
    let input: AcquisitionStrategyInput = serde_json::from_value(json!({
        "target_monthly_income": 2000, "years": 0, "price_per_unit": 120000
    }))
    .unwrap();
    assert!(matches!(
        yearly_acquisition_strategy(&input).unwrap_err(),
        ImmoInvestError::InvalidRange { .. }
    ));
}

#[test]
fn test_model_without_reinvestment_is_slower() {
    let base: AcquisitionModelInput = serde_json::from_value(json!({
        "target_monthly_income": 1500,
        "price_per_unit": 100000,
        "starting_capital": 40000,
        "annual_savings": 25000
    }))
    .unwrap();
    let reinvested = generate_acquisition_model(&base).unwrap().result;

    let mut no_reinvest = base.clone();
    no_reinvest.reinvest_cashflow = false;
    let saved_only = generate_acquisition_model(&no_reinvest).unwrap().result;

    assert!(reinvested.target_reached);
    assert!(saved_only.target_reached);
    assert!(reinvested.years_to_target <= saved_only.years_to_target);
    assert_eq!(reinvested.final_units, 20);
    assert_eq!(
        reinvested.final_monthly_cashflow,
        Decimal::from(reinvested.final_units) * dec!(75)
    );
}
