use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, routing::post, Json, Router};

use immo_invest_core::acquisition::{
    generate_acquisition_model, required_units, yearly_acquisition_strategy, AcquisitionModel,
    AcquisitionModelInput, AcquisitionStrategy, AcquisitionStrategyInput, RequiredUnitsInput,
    RequiredUnitsResult,
};
use immo_invest_core::flip::{analyze_flip, FlipAnalysis, FlipInput};
use immo_invest_core::liquidity::{
    max_offer_price, max_purchase_price, MaxOfferInput, MaxOfferResult, MaxPurchasePriceInput,
    MaxPurchasePriceResult,
};
use immo_invest_core::multi::{analyze_multi, MultiAnalysis, MultiInput};
use immo_invest_core::napkin::{
    napkin_flip, napkin_multi, FlipNapkinInput, FlipNapkinOutput, MultiNapkinInput,
    MultiNapkinOutput,
};
use immo_invest_core::types::ComputationOutput;

use crate::{error::ApiResult, main_lib::AppState};

type Body<T> = Result<Json<T>, JsonRejection>;
type Output<T> = ApiResult<Json<ComputationOutput<T>>>;

async fn flip(body: Body<FlipInput>) -> Output<FlipAnalysis> {
    let Json(input) = body?;
    Ok(Json(analyze_flip(&input)?))
}

async fn multi(body: Body<MultiInput>) -> Output<MultiAnalysis> {
    let Json(input) = body?;
    Ok(Json(analyze_multi(&input)?))
}

async fn flip_napkin(body: Body<FlipNapkinInput>) -> Output<FlipNapkinOutput> {
    let Json(input) = body?;
    Ok(Json(napkin_flip(&input)?))
}

async fn multi_napkin(body: Body<MultiNapkinInput>) -> Output<MultiNapkinOutput> {
    let Json(input) = body?;
    Ok(Json(napkin_multi(&input)?))
}

async fn max_purchase(body: Body<MaxPurchasePriceInput>) -> Output<MaxPurchasePriceResult> {
    let Json(input) = body?;
    Ok(Json(max_purchase_price(&input)?))
}

async fn max_offer(body: Body<MaxOfferInput>) -> Output<MaxOfferResult> {
    let Json(input) = body?;
    Ok(Json(max_offer_price(&input)?))
}

async fn units_needed(body: Body<RequiredUnitsInput>) -> Output<RequiredUnitsResult> {
    let Json(input) = body?;
    Ok(Json(required_units(
        input.target_monthly_income,
        input.cashflow_per_unit,
    )?))
}

async fn acquisition_strategy(body: Body<AcquisitionStrategyInput>) -> Output<AcquisitionStrategy> {
    let Json(input) = body?;
    Ok(Json(yearly_acquisition_strategy(&input)?))
}

async fn acquisition_model(body: Body<AcquisitionModelInput>) -> Output<AcquisitionModel> {
    let Json(input) = body?;
    Ok(Json(generate_acquisition_model(&input)?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/calculators/flip", post(flip))
        .route("/calculators/multi", post(multi))
        .route("/calculators/napkin/flip", post(flip_napkin))
        .route("/calculators/napkin/multi", post(multi_napkin))
        .route("/calculators/max-purchase-price", post(max_purchase))
        .route("/calculators/max-offer-price", post(max_offer))
        .route("/calculators/required-units", post(units_needed))
        .route(
            "/calculators/yearly-acquisition-strategy",
            post(acquisition_strategy),
        )
        .route(
            "/calculators/generate-acquisition-model",
            post(acquisition_model),
        )
}
