//! Turns a raw JSON body into a [`ChatRequest`].
use crate::allowlist::{self, DEFAULT_MODEL};
use crate::errors::ValidationError;
use crate::models::ChatRequest;
use serde_json::Value;
use tracing::debug;

/// Checks the body for a non-empty `message` and an allowlisted `model`.
///
/// A missing `model` falls back to [`DEFAULT_MODEL`]. Anything else that is not a string
/// naming an allowlisted model, explicit `null` included, is rejected together with the
/// sorted allowlist.
pub fn validate_chat_body(body: &Value) -> Result<ChatRequest, ValidationError> {
    let object = body.as_object().ok_or(ValidationError::InvalidBody)?;

    let message = match object.get("message").and_then(Value::as_str) {
        Some(message) if !message.is_empty() => message,
        _ => return Err(ValidationError::MissingMessage),
    };

    let model = match object.get("model") {
        None => DEFAULT_MODEL,
        Some(Value::String(model)) if allowlist::is_allowed(model) => model.as_str(),
        Some(other) => {
            debug!("Rejecting unsupported model {}", other);
            return Err(ValidationError::UnsupportedModel {
                allowed: allowlist::sorted_models(),
            });
        }
    };

    Ok(ChatRequest {
        message: message.to_owned(),
        model: model.to_owned(),
    })
}
