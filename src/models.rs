//! Wire types for the `/api/chat` endpoint and the OpenAI-style upstream APIs.
use serde::{Deserialize, Serialize};

/// A validated chat request: a non-empty message and an allowlisted model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    pub model: String,
}

/// Successful reply to the browser.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub response: String,
    pub model: String,
    /// Only ever set for the reasoning model; absent from the JSON otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// Failure reply to the browser.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            allowed: None,
            model: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}

/// One message in an upstream chat-completion request.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub(crate) struct UpstreamMessage<'a> {
    pub(crate) role: &'static str,
    pub(crate) content: &'a str,
}

/// The body sent to either provider. Sampling parameters are fixed.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub(crate) struct CompletionRequest<'a> {
    pub(crate) model: &'a str,
    pub(crate) messages: Vec<UpstreamMessage<'a>>,
    pub(crate) max_tokens: u32,
    pub(crate) temperature: f64,
    pub(crate) top_p: f64,
    pub(crate) frequency_penalty: f64,
    pub(crate) presence_penalty: f64,
    pub(crate) stream: bool,
}

impl<'a> CompletionRequest<'a> {
    /// A single-turn, non-streaming request carrying only `prompt`.
    pub(crate) fn single_turn(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            messages: vec![UpstreamMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: 1024,
            temperature: 0.7,
            top_p: 0.9,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            stream: false,
        }
    }
}

/// The slice of an upstream chat completion we read. Everything else is ignored.
#[derive(Deserialize, Debug)]
pub(crate) struct CompletionResponse {
    pub(crate) choices: Vec<CompletionChoice>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct CompletionChoice {
    pub(crate) message: CompletionMessage,
}

#[derive(Deserialize, Debug)]
pub(crate) struct CompletionMessage {
    pub(crate) content: String,
    #[serde(default)]
    pub(crate) reasoning_content: Option<String>,
}
