//! Axum handlers for the chat proxy
use crate::AppState;
use crate::allowlist::resolve_provider;
use crate::client::HttpClient;
use crate::dispatch::dispatch;
use crate::errors::{ChatError, ConfigurationError, ValidationError};
use crate::models::{ChatResponse, HealthResponse};
use crate::normalize::normalize_reply;
use crate::prompt::{PROMPT_VERSION, build_prompt};
use crate::validate::validate_chat_body;
use axum::{Json, body::Bytes, extract::State};
use tracing::{debug, info, instrument, warn};

/// Validates the request, forwards it to the provider serving the chosen model and returns
/// the normalized answer.
///
/// The body is taken as raw bytes so that malformed JSON ends up in our own error envelope
/// rather than axum's rejection text.
#[instrument(skip(state, body), fields(prompt_version = PROMPT_VERSION))]
pub async fn chat_handler<T: HttpClient>(
    State(state): State<AppState<T>>,
    body: Bytes,
) -> Result<Json<ChatResponse>, ChatError> {
    if state.config.credentials.is_empty() {
        warn!("Rejecting chat request: no provider API keys configured");
        return Err(ConfigurationError::NoCredentials.into());
    }

    let body: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
        debug!("Request body is not valid JSON: {}", e);
        ValidationError::InvalidBody
    })?;
    let request = validate_chat_body(&body)?;

    let provider = resolve_provider(&request.model);
    info!("Received request for model {} via {}", request.model, provider);

    let prompt = build_prompt(&request.message);
    let reply = dispatch(
        &state.http_client,
        &state.config,
        provider,
        &request.model,
        &prompt,
    )
    .await?;

    normalize_reply(provider, &request.model, &reply).map(Json)
}

#[instrument]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}
