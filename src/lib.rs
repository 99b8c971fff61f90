//! chatrelay - a small chat proxy in front of hosted LLM providers
//!
//! The browser posts a message and a model name to `/api/chat`. The proxy checks the model
//! against a fixed allowlist, forwards a single-turn request to NVIDIA or OpenRouter with the
//! server-side API key, and hands back `{ response, model, reasoning? }`.

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use axum_prometheus::{
    GenericMetricLayer, Handle, PrometheusMetricLayerBuilder,
    metrics_exporter_prometheus::PrometheusHandle,
};
use std::borrow::Cow;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, instrument};

pub mod allowlist;
pub mod client;
pub mod dispatch;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod prompt;
pub mod provider;
pub mod validate;

use client::{HttpClient, HyperClient, PoolSettings};
use handlers::{chat_handler, health_handler};
use provider::ProxyConfig;

/// Origins allowed to call the proxy when none are configured.
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "https://antonjijo.github.io",
    "http://localhost:8000",
    "http://127.0.0.1:8000",
    "http://localhost:3000",
];

/// The main application state: the upstream HTTP client and the read-only proxy config
#[derive(Clone, Debug)]
pub struct AppState<T: HttpClient> {
    pub http_client: T,
    pub config: Arc<ProxyConfig>,
}

impl AppState<HyperClient> {
    /// Create a new AppState with the default Hyper client
    pub fn new(config: ProxyConfig, pool: PoolSettings) -> Self {
        let http_client = client::create_hyper_client(pool);
        Self {
            http_client,
            config: Arc::new(config),
        }
    }
}

impl<T: HttpClient> AppState<T> {
    /// Create a new AppState with a custom HTTP client (useful for testing)
    pub fn with_client(config: ProxyConfig, http_client: T) -> Self {
        Self {
            http_client,
            config: Arc::new(config),
        }
    }
}

/// Build the main router for the proxy
/// This creates routes for:
/// - `/api/chat` - Forwards a chat message to the provider serving the chosen model
/// - `/health` - Liveness check, independent of provider configuration
#[instrument(skip(state))]
pub fn build_router<T: HttpClient + Clone + Send + Sync + 'static>(state: AppState<T>) -> Router {
    info!("Building router");
    Router::new()
        .route("/api/chat", post(chat_handler::<T>))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Builds the CORS layer that restricts which browser origins may call the proxy.
pub fn build_cors_layer<S: AsRef<str>>(origins: &[S]) -> Result<CorsLayer, anyhow::Error> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin.as_ref())
                .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", origin.as_ref(), e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]))
}

/// Builds a router for the metrics endpoint.
#[instrument(skip(handle))]
pub fn build_metrics_router(handle: PrometheusHandle) -> Router {
    info!("Building metrics router");
    Router::new().route(
        "/metrics",
        axum::routing::get(move || async move { handle.render() }),
    )
}

type MetricsLayerAndHandle = (
    GenericMetricLayer<'static, PrometheusHandle, Handle>,
    PrometheusHandle,
);

/// Builds a layer and handle for prometheus metrics collection.
///
/// `prefix` is prepended to every metric name, e.g. `chatrelay_http_requests_total`.
pub fn build_metrics_layer_and_handle(
    prefix: impl Into<Cow<'static, str>>,
) -> MetricsLayerAndHandle {
    info!("Building metrics layer");
    PrometheusMetricLayerBuilder::new()
        .with_prefix(prefix)
        .enable_response_body_size(true)
        .with_endpoint_label_type(axum_prometheus::EndpointLabel::Exact)
        .with_default_metrics()
        .build_pair()
}
