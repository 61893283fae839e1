//! Fetching descriptors from `/.well-known/socket-agent`.

use std::time::Duration;

use tracing::{Span, debug, instrument};
use url::Url;

use crate::descriptor::Descriptor;
use crate::error::DiscoveryError;
use crate::method::RestMethod;
use crate::transport::{Transport, TransportRequest};

/// Path of the descriptor document, relative to the service base URL.
pub const WELL_KNOWN_PATH: &str = "/.well-known/socket-agent";

/// Normalizes a user-supplied base URL.
///
/// A missing scheme defaults to `http://`, trailing slashes are dropped and
/// a URL without a host is rejected.
///
/// ## Examples
///
/// ```rust
/// use socket_agent::discovery::normalize_url;
///
/// let url = normalize_url("localhost:8000/").unwrap();
/// assert_eq!(url.as_str(), "http://localhost:8000/");
/// assert!(normalize_url("file:///etc/passwd").is_err());
/// ```
///
/// ## Errors
///
/// Returns [`DiscoveryError::InvalidUrl`] if the input is empty, does not
/// parse or has no host.
pub fn normalize_url(input: &str) -> Result<Url, DiscoveryError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DiscoveryError::InvalidUrl("empty URL".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    let mut url = Url::parse(&candidate)
        .map_err(|e| DiscoveryError::InvalidUrl(format!("{input}: {e}")))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(DiscoveryError::InvalidUrl(format!("{input}: missing host")));
    }

    let path = url.path().trim_end_matches('/').to_string();
    url.set_path(&path);
    Ok(url)
}

/// Full URL of the descriptor document for a base URL.
///
/// The well-known path is appended to the base URL's own path.
pub fn descriptor_url(base: &Url) -> Result<Url, DiscoveryError> {
    let joined = format!("{}{WELL_KNOWN_PATH}", base.as_str().trim_end_matches('/'));
    Url::parse(&joined).map_err(|e| DiscoveryError::InvalidUrl(format!("{joined}: {e}")))
}

/// Fetches and validates the descriptor served under `base`.
///
/// The request is unauthenticated. When the payload declares no `baseUrl`,
/// `base` becomes the descriptor's base URL.
///
/// ## Errors
///
/// - [`DiscoveryError::NotFound`] on a 404
/// - [`DiscoveryError::HttpStatus`] on any other non-2xx status
/// - [`DiscoveryError::Transport`] if the round trip fails
/// - [`DiscoveryError::Invalid`] if the payload is not a valid descriptor
#[instrument(
    name = "discover",
    skip(transport),
    fields(
        http.url = tracing::field::Empty,
        http.status_code = tracing::field::Empty,
        otel.kind = "client",
        endpoints = tracing::field::Empty,
    )
)]
pub async fn fetch_descriptor<T: Transport>(
    transport: &T,
    base: &Url,
    timeout: Duration,
) -> Result<Descriptor, DiscoveryError> {
    let url = descriptor_url(base)?;
    Span::current().record("http.url", url.as_str());

    let mut request = TransportRequest::new(RestMethod::Get, url.clone());
    request
        .headers
        .push(("Accept".to_string(), "application/json".to_string()));
    request.timeout = Some(timeout);

    let response = transport.send(request).await?;
    Span::current().record("http.status_code", response.status);

    match response.status {
        200..=299 => {}
        404 => {
            return Err(DiscoveryError::NotFound {
                url: url.to_string(),
            });
        }
        status => {
            return Err(DiscoveryError::HttpStatus {
                status,
                url: url.to_string(),
            });
        }
    }

    let descriptor = Descriptor::from_discovery(&response.body, base)?;
    Span::current().record("endpoints", descriptor.endpoints().len());
    debug!(service = descriptor.name(), "Descriptor discovered");
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DescriptorError, TransportError};
    use crate::transport::RecordingTransport;
    use serde_json::json;

    fn base() -> Url {
        Url::parse("http://shop.test").unwrap()
    }

    #[test]
    fn test_normalize_adds_scheme_and_trims() {
        assert_eq!(
            normalize_url("localhost:8000").unwrap().as_str(),
            "http://localhost:8000/"
        );
        assert_eq!(
            normalize_url("https://shop.example.com/api//").unwrap().as_str(),
            "https://shop.example.com/api"
        );
        assert_eq!(
            normalize_url("  http://127.0.0.1:9000/ ").unwrap().as_str(),
            "http://127.0.0.1:9000/"
        );
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize_url("").is_err());
        assert!(normalize_url("/").is_err());
        assert!(normalize_url("http://").is_err());
        assert!(normalize_url("file:///tmp/x").is_err());
    }

    #[test]
    fn test_descriptor_url_keeps_base_path() {
        let base = Url::parse("https://shop.example.com/api").unwrap();
        assert_eq!(
            descriptor_url(&base).unwrap().as_str(),
            "https://shop.example.com/api/.well-known/socket-agent"
        );
        assert_eq!(
            descriptor_url(&Url::parse("http://localhost:8000/").unwrap())
                .unwrap()
                .as_str(),
            "http://localhost:8000/.well-known/socket-agent"
        );
    }

    #[tokio::test]
    async fn test_fetch_success_fills_base_url() {
        let transport = RecordingTransport::new();
        transport
            .push_json(
                200,
                json!({ "name": "Shop", "endpoints": [{ "path": "/ping", "method": "GET" }] }),
            )
            .await;

        let descriptor = fetch_descriptor(&transport, &base(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(descriptor.endpoint_names(), vec!["list_ping"]);
        assert_eq!(descriptor.base_url(), Some(&base()));

        let request = transport.last_request().await.unwrap();
        assert_eq!(request.url.path(), "/.well-known/socket-agent");
        assert_eq!(request.header("accept"), Some("application/json"));
        assert!(request.header("authorization").is_none());
    }

    #[tokio::test]
    async fn test_fetch_404() {
        let transport = RecordingTransport::new();
        transport.push_json(404, json!({ "detail": "Not Found" })).await;

        let err = fetch_descriptor(&transport, &base(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_fetch_other_status() {
        let transport = RecordingTransport::new();
        transport.push_json(503, json!({})).await;

        let err = fetch_descriptor(&transport, &base(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::HttpStatus { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_fetch_invalid_payload() {
        let transport = RecordingTransport::new();
        transport.push_json(200, json!({ "name": "Shop", "endpoints": [] })).await;

        let err = fetch_descriptor(&transport, &base(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DiscoveryError::Invalid(DescriptorError::NoEndpoints)
        ));
    }

    #[tokio::test]
    async fn test_fetch_transport_failure() {
        let transport = RecordingTransport::new();
        transport.push_connection_error("connection refused").await;

        let err = fetch_descriptor(&transport, &base(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DiscoveryError::Transport(TransportError::Connection(_))
        ));
    }
}
