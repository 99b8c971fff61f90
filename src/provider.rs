//! Upstream providers and the immutable configuration used to reach them.
//!
//! There are exactly two upstreams. Which one serves a request is decided by
//! [`crate::allowlist::resolve_provider`]; everything needed to actually talk to it
//! (endpoint, credential, extra headers) lives in the [`ProxyConfig`] built once at startup.
use bon::Builder;
use std::fmt;
use url::Url;

pub const NVIDIA_API_URL: &str = "https://integrate.api.nvidia.com/v1/chat/completions";
pub const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

pub const NVIDIA_API_KEY_ENV: &str = "NVIDIA_API_KEY";
pub const OPENROUTER_API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// OpenRouter attributes traffic using these two headers.
pub const DEFAULT_OPENROUTER_REFERER: &str = "http://localhost:8000";
pub const DEFAULT_OPENROUTER_TITLE: &str = "NVIDIA Chatbot";

/// The upstream that serves a given model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Nvidia,
    OpenRouter,
}

impl ProviderKind {
    /// Environment variable holding this provider's API key.
    pub fn env_var(self) -> &'static str {
        match self {
            ProviderKind::Nvidia => NVIDIA_API_KEY_ENV,
            ProviderKind::OpenRouter => OPENROUTER_API_KEY_ENV,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Nvidia => f.write_str("NVIDIA"),
            ProviderKind::OpenRouter => f.write_str("OpenRouter"),
        }
    }
}

/// API keys for the upstream providers. Either may be absent; requests that need a
/// missing key fail without touching the network. Blank keys count as absent however the
/// value was constructed.
#[derive(Clone, Default, Builder)]
pub struct Credentials {
    #[builder(into)]
    nvidia_api_key: Option<String>,
    #[builder(into)]
    openrouter_api_key: Option<String>,
}

impl Credentials {
    pub fn new(nvidia_api_key: Option<String>, openrouter_api_key: Option<String>) -> Self {
        Self {
            nvidia_api_key,
            openrouter_api_key,
        }
    }

    /// The usable key for `kind`. Every other accessor goes through here.
    pub fn key_for(&self, kind: ProviderKind) -> Option<&str> {
        let key = match kind {
            ProviderKind::Nvidia => self.nvidia_api_key.as_deref(),
            ProviderKind::OpenRouter => self.openrouter_api_key.as_deref(),
        };
        key.filter(|k| !k.trim().is_empty())
    }

    /// True when no provider can be reached at all.
    pub fn is_empty(&self) -> bool {
        self.missing().len() == 2
    }

    /// Providers whose key is not configured, in a stable order.
    pub fn missing(&self) -> Vec<ProviderKind> {
        [ProviderKind::Nvidia, ProviderKind::OpenRouter]
            .into_iter()
            .filter(|kind| self.key_for(*kind).is_none())
            .collect()
    }
}

// Keys must never end up in logs, so Debug only reports presence.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |kind| self.key_for(kind).map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("nvidia_api_key", &redact(ProviderKind::Nvidia))
            .field("openrouter_api_key", &redact(ProviderKind::OpenRouter))
            .finish()
    }
}

/// Where the providers live, plus the attribution headers OpenRouter expects.
#[derive(Debug, Clone, Builder)]
pub struct Upstreams {
    #[builder(default = default_url(NVIDIA_API_URL))]
    pub nvidia_url: Url,
    #[builder(default = default_url(OPENROUTER_API_URL))]
    pub openrouter_url: Url,
    #[builder(into, default = DEFAULT_OPENROUTER_REFERER.to_string())]
    pub openrouter_referer: String,
    #[builder(into, default = DEFAULT_OPENROUTER_TITLE.to_string())]
    pub openrouter_title: String,
}

fn default_url(raw: &str) -> Url {
    Url::parse(raw).expect("built-in provider URLs are valid")
}

impl Default for Upstreams {
    fn default() -> Self {
        Upstreams::builder().build()
    }
}

impl Upstreams {
    pub fn url_for(&self, kind: ProviderKind) -> &Url {
        match kind {
            ProviderKind::Nvidia => &self.nvidia_url,
            ProviderKind::OpenRouter => &self.openrouter_url,
        }
    }
}

/// Everything the chat handler needs that is fixed for the life of the process.
#[derive(Debug, Clone, Default, Builder)]
pub struct ProxyConfig {
    #[builder(default)]
    pub credentials: Credentials,
    #[builder(default)]
    pub upstreams: Upstreams,
}
