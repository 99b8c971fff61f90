//! Builds the provider-specific request and sends it upstream, exactly once.
use crate::client::HttpClient;
use crate::errors::{ChatError, ConfigurationError};
use crate::models::CompletionRequest;
use crate::provider::{ProviderKind, ProxyConfig};
use axum::body::{Body, Bytes};
use axum::http::{HeaderValue, Method, Request, StatusCode, Uri, header};
use tracing::{debug, error, instrument};

/// Upstream bodies larger than this are treated as a transport failure.
pub const MAX_UPSTREAM_BODY_BYTES: usize = 4 * 1024 * 1024;

/// What came back from the provider, untouched.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Builds the outbound request for `provider` without sending it.
///
/// Fails with a configuration error when the provider's key is not set.
pub fn build_upstream_request(
    config: &ProxyConfig,
    provider: ProviderKind,
    model: &str,
    prompt: &str,
) -> Result<Request<Body>, ChatError> {
    let key = config
        .credentials
        .key_for(provider)
        .ok_or(ConfigurationError::MissingCredential(provider))?;

    let url = config.upstreams.url_for(provider);
    let uri = Uri::try_from(url.as_str()).map_err(|e| {
        error!("Invalid upstream URL {}: {}", url, e);
        ChatError::Internal
    })?;

    let body = serde_json::to_vec(&CompletionRequest::single_turn(model, prompt)).map_err(|e| {
        error!("Failed to serialize upstream request: {}", e);
        ChatError::Internal
    })?;

    let authorization = HeaderValue::try_from(format!("Bearer {key}")).map_err(|_| {
        error!("{} API key contains characters not allowed in a header", provider);
        ChatError::Internal
    })?;

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, authorization)
        .header(header::CONTENT_TYPE, "application/json");

    builder = match provider {
        ProviderKind::Nvidia => builder.header(header::ACCEPT, "application/json"),
        ProviderKind::OpenRouter => builder
            .header("HTTP-Referer", config.upstreams.openrouter_referer.as_str())
            .header("X-Title", config.upstreams.openrouter_title.as_str()),
    };

    builder.body(Body::from(body)).map_err(|e| {
        error!("Failed to build request for {}: {}", provider, e);
        ChatError::Internal
    })
}

/// Sends one request to `provider` and collects the whole response body.
#[instrument(skip(client, config, prompt))]
pub async fn dispatch<T: HttpClient>(
    client: &T,
    config: &ProxyConfig,
    provider: ProviderKind,
    model: &str,
    prompt: &str,
) -> Result<UpstreamReply, ChatError> {
    let request = build_upstream_request(config, provider, model, prompt)?;
    debug!("Forwarding to {}", request.uri());

    let response = client.request(request).await.map_err(|e| {
        error!("Error forwarding request to {}: {}", provider, e);
        ChatError::UpstreamTransport
    })?;

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), MAX_UPSTREAM_BODY_BYTES)
        .await
        .map_err(|e| {
            error!("Failed to read {} response body: {}", provider, e);
            ChatError::UpstreamTransport
        })?;

    Ok(UpstreamReply { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Credentials, Upstreams};
    use crate::test_utils::MockHttpClient;

    fn both_keys() -> ProxyConfig {
        ProxyConfig::builder()
            .credentials(
                Credentials::builder()
                    .nvidia_api_key("nv-key")
                    .openrouter_api_key("or-key")
                    .build(),
            )
            .build()
    }

    fn header<'a>(request: &'a crate::test_utils::MockRequest, name: &str) -> Option<&'a str> {
        request
            .headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[tokio::test]
    async fn test_nvidia_request_details() {
        let mock_client = MockHttpClient::new(StatusCode::OK, r#"{"choices": []}"#);
        let reply = dispatch(
            &mock_client,
            &both_keys(),
            ProviderKind::Nvidia,
            "deepseek-ai/deepseek-r1",
            "wrapped",
        )
        .await
        .unwrap();
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(&reply.body[..], br#"{"choices": []}"#);

        let requests = mock_client.get_requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, "POST");
        assert_eq!(
            request.uri,
            "https://integrate.api.nvidia.com/v1/chat/completions"
        );
        assert_eq!(header(request, "authorization"), Some("Bearer nv-key"));
        assert_eq!(header(request, "accept"), Some("application/json"));
        assert_eq!(header(request, "content-type"), Some("application/json"));
        assert_eq!(header(request, "x-title"), None);

        let sent: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(sent["model"], "deepseek-ai/deepseek-r1");
        assert_eq!(sent["messages"].as_array().unwrap().len(), 1);
        assert_eq!(sent["messages"][0]["role"], "user");
        assert_eq!(sent["messages"][0]["content"], "wrapped");
        assert_eq!(sent["stream"], false);
    }

    #[tokio::test]
    async fn test_openrouter_request_details() {
        let mock_client = MockHttpClient::new(StatusCode::OK, "{}");
        dispatch(
            &mock_client,
            &both_keys(),
            ProviderKind::OpenRouter,
            "google/gemma-3-27b-it:free",
            "wrapped",
        )
        .await
        .unwrap();

        let requests = mock_client.get_requests();
        let request = &requests[0];
        assert_eq!(request.uri, "https://openrouter.ai/api/v1/chat/completions");
        assert_eq!(header(request, "authorization"), Some("Bearer or-key"));
        assert_eq!(header(request, "http-referer"), Some("http://localhost:8000"));
        assert_eq!(header(request, "x-title"), Some("NVIDIA Chatbot"));
    }

    #[tokio::test]
    async fn test_custom_upstreams_are_used() {
        let config = ProxyConfig::builder()
            .credentials(Credentials::builder().openrouter_api_key("or-key").build())
            .upstreams(
                Upstreams::builder()
                    .openrouter_url("http://localhost:9999/v1/chat/completions".parse().unwrap())
                    .openrouter_title("Docs Bot")
                    .build(),
            )
            .build();
        let mock_client = MockHttpClient::new(StatusCode::OK, "{}");
        dispatch(&mock_client, &config, ProviderKind::OpenRouter, "m", "p")
            .await
            .unwrap();

        let request = &mock_client.get_requests()[0];
        assert_eq!(request.uri, "http://localhost:9999/v1/chat/completions");
        assert_eq!(header(request, "x-title"), Some("Docs Bot"));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network_call() {
        let config = ProxyConfig::builder()
            .credentials(Credentials::builder().nvidia_api_key("nv-key").build())
            .build();
        let mock_client = MockHttpClient::new(StatusCode::OK, "{}");
        let err = dispatch(&mock_client, &config, ProviderKind::OpenRouter, "m", "p")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ChatError::Configuration(ConfigurationError::MissingCredential(
                ProviderKind::OpenRouter
            ))
        ));
        assert_eq!(mock_client.get_requests().len(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_is_upstream_error() {
        let mock_client = MockHttpClient::failing("connection refused");
        let err = dispatch(&mock_client, &both_keys(), ProviderKind::Nvidia, "m", "p")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::UpstreamTransport));
        assert_eq!(mock_client.get_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_oversized_upstream_body_is_transport_error() {
        let body = "a".repeat(MAX_UPSTREAM_BODY_BYTES + 1);
        let mock_client = MockHttpClient::new(StatusCode::OK, &body);
        let err = dispatch(&mock_client, &both_keys(), ProviderKind::Nvidia, "m", "p")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::UpstreamTransport));
    }

    #[tokio::test]
    async fn test_non_success_status_is_returned_raw() {
        let mock_client = MockHttpClient::new(StatusCode::SERVICE_UNAVAILABLE, "overloaded");
        let reply = dispatch(&mock_client, &both_keys(), ProviderKind::Nvidia, "m", "p")
            .await
            .unwrap();
        assert_eq!(reply.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(&reply.body[..], b"overloaded");
    }
}
