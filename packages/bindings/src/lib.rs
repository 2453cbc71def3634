use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Serialize;

use immo_invest_core::comparison::{ComparisonRequest, Scenario, SensitivityRequest};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<T: DeserializeOwned>(input_json: &str) -> NapiResult<T> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

fn emit<T: Serialize>(output: &T) -> NapiResult<String> {
    serde_json::to_string(output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Napkin
// ---------------------------------------------------------------------------

#[napi]
pub fn napkin_flip(input_json: String) -> NapiResult<String> {
    let input: immo_invest_core::napkin::FlipNapkinInput = parse(&input_json)?;
    let output = immo_invest_core::napkin::napkin_flip(&input).map_err(to_napi_error)?;
    emit(&output)
}

#[napi]
pub fn napkin_multi(input_json: String) -> NapiResult<String> {
    let input: immo_invest_core::napkin::MultiNapkinInput = parse(&input_json)?;
    let output = immo_invest_core::napkin::napkin_multi(&input).map_err(to_napi_error)?;
    emit(&output)
}

// ---------------------------------------------------------------------------
// Detailed calculators
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_flip(input_json: String) -> NapiResult<String> {
    let input: immo_invest_core::flip::FlipInput = parse(&input_json)?;
    let output = immo_invest_core::flip::analyze_flip(&input).map_err(to_napi_error)?;
    emit(&output)
}

#[napi]
pub fn analyze_multi(input_json: String) -> NapiResult<String> {
    let input: immo_invest_core::multi::MultiInput = parse(&input_json)?;
    let output = immo_invest_core::multi::analyze_multi(&input).map_err(to_napi_error)?;
    emit(&output)
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_scenario(input_json: String) -> NapiResult<String> {
    let scenario: Scenario = parse(&input_json)?;
    let output =
        immo_invest_core::comparison::analyze_scenario(&scenario).map_err(to_napi_error)?;
    emit(&output)
}

/// Accepts `{scenarios, options}` or a bare array of scenarios.
#[napi]
pub fn compare_scenarios(input_json: String) -> NapiResult<String> {
    let raw: serde_json::Value = parse(&input_json)?;
    let request = if raw.is_array() {
        ComparisonRequest {
            scenarios: serde_json::from_value(raw).map_err(to_napi_error)?,
            ..Default::default()
        }
    } else {
        serde_json::from_value(raw).map_err(to_napi_error)?
    };
    let output = request.run().map_err(to_napi_error)?;
    emit(&output)
}

#[napi]
pub fn sensitivity_analysis(input_json: String) -> NapiResult<String> {
    let request: SensitivityRequest = parse(&input_json)?;
    let output = request.run().map_err(to_napi_error)?;
    emit(&output)
}

// ---------------------------------------------------------------------------
// Liquidity
// ---------------------------------------------------------------------------

#[napi]
pub fn max_purchase_price(input_json: String) -> NapiResult<String> {
    let input: immo_invest_core::liquidity::MaxPurchasePriceInput = parse(&input_json)?;
    let output =
        immo_invest_core::liquidity::max_purchase_price(&input).map_err(to_napi_error)?;
    emit(&output)
}

#[napi]
pub fn max_offer_price(input_json: String) -> NapiResult<String> {
    let input: immo_invest_core::liquidity::MaxOfferInput = parse(&input_json)?;
    let output = immo_invest_core::liquidity::max_offer_price(&input).map_err(to_napi_error)?;
    emit(&output)
}

// ---------------------------------------------------------------------------
// Acquisition
// ---------------------------------------------------------------------------

#[napi]
pub fn required_units(input_json: String) -> NapiResult<String> {
    let input: immo_invest_core::acquisition::RequiredUnitsInput = parse(&input_json)?;
    let output = immo_invest_core::acquisition::required_units(
        input.target_monthly_income,
        input.cashflow_per_unit,
    )
    .map_err(to_napi_error)?;
    emit(&output)
}

#[napi]
pub fn yearly_acquisition_strategy(input_json: String) -> NapiResult<String> {
    let input: immo_invest_core::acquisition::AcquisitionStrategyInput = parse(&input_json)?;
    let output = immo_invest_core::acquisition::yearly_acquisition_strategy(&input)
        .map_err(to_napi_error)?;
    emit(&output)
}

#[napi]
pub fn generate_acquisition_model(input_json: String) -> NapiResult<String> {
    let input: immo_invest_core::acquisition::AcquisitionModelInput = parse(&input_json)?;
    let output = immo_invest_core::acquisition::generate_acquisition_model(&input)
        .map_err(to_napi_error)?;
    emit(&output)
}
