mod config;

use chatrelay::{
    AppState, build_cors_layer, build_metrics_layer_and_handle, build_metrics_router,
    build_router,
};
use clap::Parser as _;
use config::Config;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

#[tokio::main]
#[instrument]
pub async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse().validate()?;
    info!("Starting chat proxy with config: {:?}", config);

    let proxy_config = config.proxy_config();
    for provider in proxy_config.credentials.missing() {
        warn!(
            "{} environment variable not set! Requests for {} models will fail.",
            provider.env_var(),
            provider
        );
    }

    let cors = build_cors_layer(config.allowed_origins().as_slice())?;
    let app_state = AppState::new(proxy_config, config.pool_settings());
    let mut router = build_router(app_state).layer(cors);

    if config.metrics {
        let (prometheus_layer, handle) =
            build_metrics_layer_and_handle(config.metrics_prefix.clone());
        router = router.layer(prometheus_layer);

        let metrics_addr = format!("{}:{}", config.host, config.metrics_port);
        let metrics_listener = TcpListener::bind(&metrics_addr).await?;
        info!("Metrics endpoint listening on {}", metrics_addr);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(metrics_listener, build_metrics_router(handle)).await {
                warn!("Metrics server stopped: {}", e);
            }
        });
    }

    let bind_addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Chat proxy listening on {}", bind_addr);

    axum::serve(listener, router).await?;

    Ok(())
}
