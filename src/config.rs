//! Configuration parsing and validation for the chat proxy
//!
//! Every option can come from the command line or the environment. Provider keys are read
//! here once and never again.
use anyhow::anyhow;
use chatrelay::DEFAULT_ALLOWED_ORIGINS;
use chatrelay::client::PoolSettings;
use chatrelay::provider::{
    Credentials, DEFAULT_OPENROUTER_REFERER, DEFAULT_OPENROUTER_TITLE, NVIDIA_API_URL,
    OPENROUTER_API_URL, ProxyConfig, Upstreams,
};
use clap::Parser;
use std::fmt;
use std::time::Duration;
use url::Url;

#[derive(Clone, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// The address on which the proxy server will listen.
    #[arg(long, env = "CHATRELAY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// The port on which the proxy server will listen.
    #[arg(short = 'p', long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// API key for NVIDIA's hosted models.
    #[arg(long, env = "NVIDIA_API_KEY", hide_env_values = true)]
    pub nvidia_api_key: Option<String>,

    /// API key for OpenRouter's free-tier models.
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub openrouter_api_key: Option<String>,

    /// Chat-completions endpoint for NVIDIA-backed models.
    #[arg(long, env = "NVIDIA_API_URL", default_value = NVIDIA_API_URL)]
    pub nvidia_api_url: Url,

    /// Chat-completions endpoint for OpenRouter-backed models.
    #[arg(long, env = "OPENROUTER_API_URL", default_value = OPENROUTER_API_URL)]
    pub openrouter_api_url: Url,

    /// Value of the HTTP-Referer header sent to OpenRouter.
    #[arg(long, default_value = DEFAULT_OPENROUTER_REFERER)]
    pub openrouter_referer: String,

    /// Value of the X-Title header sent to OpenRouter.
    #[arg(long, default_value = DEFAULT_OPENROUTER_TITLE)]
    pub openrouter_title: String,

    /// Browser origins allowed to call the proxy, comma separated.
    #[arg(
        long,
        env = "CHATRELAY_ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_values_t = DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string())
    )]
    pub allowed_origins: Vec<String>,

    /// The port on which the metrics server will listen.
    #[arg(long, default_value_t = 9090)]
    pub metrics_port: u16,

    /// Whether to enable the metrics endpoint.
    #[arg(short = 'm', long, default_value_t = true, action = clap::ArgAction::Set)]
    pub metrics: bool,

    /// The prefix to use for metrics.
    #[arg(long, default_value = "chatrelay")]
    pub metrics_prefix: String,

    /// Maximum number of idle HTTP connections to keep alive per upstream host.
    #[arg(long, default_value_t = 32)]
    pub pool_max_idle_per_host: usize,

    /// How long (in seconds) to keep idle HTTP connections alive.
    #[arg(long, default_value_t = 90)]
    pub pool_idle_timeout_secs: u64,
}

impl Config {
    pub fn validate(self) -> Result<Self, anyhow::Error> {
        if self.allowed_origins.iter().all(|o| o.trim().is_empty()) {
            return Err(anyhow!("At least one allowed origin must be configured"));
        }
        if self.metrics && self.metrics_port == self.port {
            return Err(anyhow!(
                "Metrics port {} must differ from the proxy port",
                self.metrics_port
            ));
        }
        Ok(self)
    }

    pub fn allowed_origins(&self) -> Vec<&str> {
        self.allowed_origins
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .collect()
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.nvidia_api_key.clone(),
            self.openrouter_api_key.clone(),
        )
    }

    pub fn proxy_config(&self) -> ProxyConfig {
        ProxyConfig::builder()
            .credentials(self.credentials())
            .upstreams(
                Upstreams::builder()
                    .nvidia_url(self.nvidia_api_url.clone())
                    .openrouter_url(self.openrouter_api_url.clone())
                    .openrouter_referer(self.openrouter_referer.clone())
                    .openrouter_title(self.openrouter_title.clone())
                    .build(),
            )
            .build()
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_idle_per_host: self.pool_max_idle_per_host,
            idle_timeout: Duration::from_secs(self.pool_idle_timeout_secs),
        }
    }
}

// Hand-written so the API keys never reach the startup log.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("credentials", &self.credentials())
            .field("nvidia_api_url", &self.nvidia_api_url.as_str())
            .field("openrouter_api_url", &self.openrouter_api_url.as_str())
            .field("allowed_origins", &self.allowed_origins)
            .field("metrics", &self.metrics)
            .field("metrics_port", &self.metrics_port)
            .field("metrics_prefix", &self.metrics_prefix)
            .field("pool_max_idle_per_host", &self.pool_max_idle_per_host)
            .field("pool_idle_timeout_secs", &self.pool_idle_timeout_secs)
            .finish()
    }
}
