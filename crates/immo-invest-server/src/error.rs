use std::any::Any;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use immo_invest_core::ImmoInvestError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] ImmoInvestError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            // Every calculator error is rooted in the request payload
            ApiError::Core(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn log(&self) {
        if self.status().is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Corps JSON invalide : {}", rejection.body_text()))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Core(ImmoInvestError::from(e))
    }
}

/// Calculator routes answer `{ "error": message }`.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Turns a handler panic into the calculator error body with a 500.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "cause inconnue".to_string());
    ApiError::Internal(format!("Erreur interne du calcul : {detail}")).into_response()
}

/// Comparison routes answer `{ "success": false, "message", "error" }`.
#[derive(Debug)]
pub struct EnvelopeError {
    context: String,
    source: ApiError,
    expose_details: bool,
}

#[derive(Serialize)]
struct EnvelopeBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl EnvelopeError {
    pub fn new(context: &str, source: ApiError, expose_details: bool) -> Self {
        Self {
            context: context.to_string(),
            source,
            expose_details,
        }
    }
}

impl IntoResponse for EnvelopeError {
    fn into_response(self) -> Response {
        self.source.log();
        let status = self.source.status();
        // Validation messages are meant for the user; internal ones are not
        let message = if status.is_client_error() {
            self.source.to_string()
        } else {
            self.context
        };
        let body = Json(EnvelopeBody {
            success: false,
            message,
            error: self.expose_details.then(|| self.source.to_string()),
        });
        (status, body).into_response()
    }
}

pub type EnvelopeResult<T> = Result<T, EnvelopeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_bad_request() {
        let err = ApiError::from(ImmoInvestError::missing("purchase_price", "requis"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let err = ApiError::from(ImmoInvestError::out_of_range("horizon_years", "trop long"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_errors_map_to_server_error() {
        let err = ApiError::Internal("panique".into());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn malformed_json_is_a_client_error() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(ApiError::from(parse).status(), StatusCode::BAD_REQUEST);
    }
}
