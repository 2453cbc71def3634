use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImmoInvestError {
    #[error("Champ requis manquant : {field} ({reason})")]
    MissingRequiredField { field: String, reason: String },

    #[error("Valeur hors limites : {field} ({reason})")]
    InvalidRange { field: String, reason: String },

    #[error("Objectif inatteignable : {0}")]
    UnreachableTarget(String),

    #[error("Données insuffisantes : {0}")]
    InsufficientData(String),

    #[error("Erreur de sérialisation : {0}")]
    SerializationError(String),
}

impl ImmoInvestError {
    pub fn missing(field: &str, reason: impl Into<String>) -> Self {
        ImmoInvestError::MissingRequiredField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn out_of_range(field: &str, reason: impl Into<String>) -> Self {
        ImmoInvestError::InvalidRange {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ImmoInvestError {
    fn from(e: serde_json::Error) -> Self {
        ImmoInvestError::SerializationError(e.to_string())
    }
}
