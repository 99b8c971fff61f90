//! Error kinds for the chat endpoint and their HTTP envelopes.
//!
//! Every failure is turned into `{ "error": ..., "allowed"?: [...], "model"?: ... }` here and
//! nowhere else. Variants only carry what the client may see; anything more detailed is
//! logged where the error is raised.
use crate::models::ErrorEnvelope;
use crate::provider::ProviderKind;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("API keys not configured. Please set environment variables.")]
    NoCredentials,
    #[error("{0} API key not configured. Please set {env}.", env = .0.env_var())]
    MissingCredential(ProviderKind),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Request body must be a JSON object")]
    InvalidBody,
    #[error("No message provided")]
    MissingMessage,
    #[error("Unsupported model selected")]
    UnsupportedModel { allowed: Vec<&'static str> },
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to get response from AI")]
    UpstreamTransport,
    #[error("{provider} API returned unexpected response. Please check API configuration.")]
    UpstreamContent {
        provider: ProviderKind,
        model: String,
    },
    #[error("Internal server error")]
    Internal,
}

impl ChatError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ChatError::Validation(_) => StatusCode::BAD_REQUEST,
            ChatError::Configuration(_)
            | ChatError::UpstreamTransport
            | ChatError::UpstreamContent { .. }
            | ChatError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn envelope(&self) -> ErrorEnvelope {
        let mut envelope = ErrorEnvelope::new(self.to_string());
        match self {
            ChatError::Validation(ValidationError::UnsupportedModel { allowed }) => {
                envelope.allowed = Some(allowed.iter().map(|m| m.to_string()).collect());
            }
            ChatError::UpstreamContent { model, .. } => {
                envelope.model = Some(model.clone());
            }
            _ => {}
        }
        envelope
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.envelope())).into_response()
    }
}
