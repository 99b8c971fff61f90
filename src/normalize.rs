//! Turns a raw provider reply into the envelope the browser gets.
use crate::allowlist::is_reasoning_model;
use crate::dispatch::UpstreamReply;
use crate::errors::ChatError;
use crate::models::{ChatResponse, CompletionResponse};
use crate::provider::ProviderKind;
use tracing::{debug, error};

/// Text a misconfigured upstream has been seen answering with instead of the user's question.
pub const PLACEHOLDER_MARKER: &str =
    "Hello! I'm your NVIDIA-powered chatbot with advanced capabilities";

const LOG_PREVIEW_CHARS: usize = 200;

pub fn normalize_reply(
    provider: ProviderKind,
    model: &str,
    reply: &UpstreamReply,
) -> Result<ChatResponse, ChatError> {
    if !reply.status.is_success() {
        error!(
            "{} API Error: {} - {}",
            provider,
            reply.status,
            String::from_utf8_lossy(&reply.body)
        );
        return Err(ChatError::UpstreamTransport);
    }

    let parsed: CompletionResponse = serde_json::from_slice(&reply.body).map_err(|e| {
        error!("Unexpected {} response shape: {}", provider, e);
        ChatError::Internal
    })?;

    let Some(choice) = parsed.choices.into_iter().next() else {
        error!("{} response for {} contained no choices", provider, model);
        return Err(ChatError::Internal);
    };
    let message = choice.message;

    debug!(
        "{} API Response: {}...",
        provider,
        message.content.chars().take(LOG_PREVIEW_CHARS).collect::<String>()
    );

    if message.content.contains(PLACEHOLDER_MARKER) {
        error!(
            "{} returned its placeholder greeting instead of answering for {}",
            provider, model
        );
        return Err(ChatError::UpstreamContent {
            provider,
            model: model.to_owned(),
        });
    }

    let reasoning = message
        .reasoning_content
        .filter(|reasoning| is_reasoning_model(model) && !reasoning.is_empty());

    Ok(ChatResponse {
        response: message.content,
        model: model.to_owned(),
        reasoning,
    })
}
