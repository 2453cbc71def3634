use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, LogFormat};
use crate::error::{ApiError, EnvelopeError};

/// Shared, immutable request state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Echo the underlying error text in comparison responses
    pub expose_error_details: bool,
}

impl AppState {
    pub fn new(config: &Config) -> Arc<Self> {
        Arc::new(Self {
            expose_error_details: !config.is_production(),
        })
    }

    pub fn envelope_error(&self, context: &str, error: impl Into<ApiError>) -> EnvelopeError {
        EnvelopeError::new(context, error.into(), self.expose_error_details)
    }
}

pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init(),
    }
}
