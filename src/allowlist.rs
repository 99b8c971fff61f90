//! The fixed set of models the proxy will forward, and which upstream serves each one.
//!
//! Membership and routing are two separate tables so that adding a model and moving it
//! between providers are independent edits.
use crate::provider::ProviderKind;

/// Used when the client does not name a model.
pub const DEFAULT_MODEL: &str = "meta/llama-4-maverick-17b-128e-instruct";

/// The only model whose `reasoning_content` is passed back to the client.
pub const REASONING_MODEL: &str = "deepseek-ai/deepseek-r1";

/// Models the frontend is allowed to select.
pub const ALLOWED_MODELS: &[&str] = &[
    "meta/llama-4-maverick-17b-128e-instruct",
    "deepseek-ai/deepseek-r1",
    "qwen/qwen2.5-coder-32b-instruct",
    "qwen/qwen3-coder-480b-a35b-instruct",
    "deepseek-ai/deepseek-v3.1",
    "openai/gpt-oss-120b",
    "qwen/qwen3-235b-a22b:free",
    "google/gemma-3-27b-it:free",
];

/// Free-tier models served through OpenRouter. Anything else goes to NVIDIA.
pub const OPENROUTER_MODELS: &[&str] = &["qwen/qwen3-235b-a22b:free", "google/gemma-3-27b-it:free"];

pub fn is_allowed(model: &str) -> bool {
    ALLOWED_MODELS.contains(&model)
}

/// The allowlist in sorted order, as reported to clients that pick an unknown model.
pub fn sorted_models() -> Vec<&'static str> {
    let mut models = ALLOWED_MODELS.to_vec();
    models.sort_unstable();
    models
}

/// Picks the upstream for a model from the routing table.
pub fn resolve_provider(model: &str) -> ProviderKind {
    if OPENROUTER_MODELS.contains(&model) {
        ProviderKind::OpenRouter
    } else {
        ProviderKind::Nvidia
    }
}

pub fn is_reasoning_model(model: &str) -> bool {
    model == REASONING_MODEL
}
