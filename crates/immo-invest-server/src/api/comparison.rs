use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

use immo_invest_core::comparison::{
    analyze_scenario, ComparisonRequest, ComparisonResult, DealAnalysis, Scenario,
    SensitivityRequest, SensitivityResult,
};
use immo_invest_core::types::ComputationOutput;
use immo_invest_core::ImmoInvestError;

use crate::{
    error::{ApiError, EnvelopeResult},
    main_lib::AppState,
};

#[derive(Serialize)]
pub struct Success<T> {
    success: bool,
    data: T,
}

fn success<T>(data: T) -> Json<Success<T>> {
    Json(Success {
        success: true,
        data,
    })
}

#[derive(Serialize)]
pub struct AnalyzedScenario {
    scenario: Scenario,
    analysis: ComputationOutput<DealAnalysis>,
}

fn is_blank(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> EnvelopeResult<Json<Success<AnalyzedScenario>>> {
    const CONTEXT: &str = "Erreur lors de l'analyse du scénario";
    let Json(raw) = body.map_err(|e| state.envelope_error(CONTEXT, e))?;
    if is_blank(&raw) {
        return Err(state.envelope_error(
            CONTEXT,
            ApiError::BadRequest("Données du scénario manquantes".into()),
        ));
    }
    let scenario: Scenario =
        serde_json::from_value(raw).map_err(|e| state.envelope_error(CONTEXT, e))?;
    tracing::debug!(name = %scenario.name, "analyzing scenario");

    let out = analyze_scenario(&scenario).map_err(|e| state.envelope_error(CONTEXT, e))?;
    let ComputationOutput {
        result,
        methodology,
        assumptions,
        warnings,
        metadata,
    } = out;
    Ok(success(AnalyzedScenario {
        scenario: result.scenario,
        analysis: ComputationOutput {
            result: result.analysis,
            methodology,
            assumptions,
            warnings,
            metadata,
        },
    }))
}

async fn compare(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ComparisonRequest>, JsonRejection>,
) -> EnvelopeResult<Json<Success<ComputationOutput<ComparisonResult>>>> {
    const CONTEXT: &str = "Erreur lors de la comparaison des scénarios";
    let Json(request) = body.map_err(|e| state.envelope_error(CONTEXT, e))?;
    if request.scenarios.is_empty() {
        return Err(state.envelope_error(
            CONTEXT,
            ImmoInvestError::InsufficientData("Aucun scénario à comparer".into()),
        ));
    }
    tracing::debug!(count = request.scenarios.len(), "comparing scenarios");
    let out = request.run().map_err(|e| state.envelope_error(CONTEXT, e))?;
    Ok(success(out))
}

async fn sensitivity(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SensitivityRequest>, JsonRejection>,
) -> EnvelopeResult<Json<Success<ComputationOutput<SensitivityResult>>>> {
    const CONTEXT: &str = "Erreur lors de l'analyse de sensibilité";
    let Json(request) = body.map_err(|e| state.envelope_error(CONTEXT, e))?;
    tracing::debug!(variable = %request.variable, "sensitivity sweep");
    let out = request.run().map_err(|e| state.envelope_error(CONTEXT, e))?;
    Ok(success(out))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/comparison/analyze", post(analyze))
        .route("/comparison/compare", post(compare))
        .route("/comparison/sensitivity", post(sensitivity))
}
