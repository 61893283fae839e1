//! reqwest-backed transport with tracing instrumentation.

use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use tracing::{Span, instrument};

use super::{Transport, TransportRequest, TransportResponse};
use crate::error::{ConfigError, TransportError};

/// User agent sent with every request.
pub(crate) const DEFAULT_USER_AGENT: &str = concat!("socket-agent/", env!("CARGO_PKG_VERSION"));

/// HTTP transport over a pooled `reqwest::Client`.
///
/// Timeouts are per request (taken from [`TransportRequest::timeout`]), so a
/// single transport can serve clients with different limits.
///
/// ## Examples
///
/// ```rust,ignore
/// use socket_agent::transport::{HttpTransport, Transport, TransportRequest};
/// use socket_agent::RestMethod;
///
/// let transport = HttpTransport::new()?;
/// let request = TransportRequest::new(RestMethod::Get, "http://localhost:8000/ping".parse()?);
/// let response = transport.send(request).await?;
/// println!("{}", response.status);
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport sending `Accept: application/json` and the crate
    /// user agent by default.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_headers(HeaderMap::new())
    }

    /// Creates a transport with extra default headers.
    ///
    /// Headers in `extra` override the built-in defaults.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_headers(extra: HeaderMap) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        for (name, value) in extra.iter() {
            headers.insert(name.clone(), value.clone());
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self { client })
    }

    /// Wraps an existing `reqwest::Client`.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    #[instrument(
        name = "http_request",
        skip(self, request),
        fields(
            http.method = tracing::field::Empty,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
            otel.status_code = tracing::field::Empty,
        )
    )]
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        Span::current().record("http.method", request.method.to_string().as_str());
        Span::current().record("http.url", request.url.as_str());

        let mut builder = self
            .client
            .request(request.method.to_reqwest(), request.url.clone());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            let header_name = HeaderName::try_from(name.as_str()).map_err(|e| {
                TransportError::InvalidRequest(format!("invalid header name '{name}': {e}"))
            })?;
            let header_value = HeaderValue::try_from(value.as_str()).map_err(|e| {
                TransportError::InvalidRequest(format!("invalid value for header '{name}': {e}"))
            })?;
            builder = builder.header(header_name, header_value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let started = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| classify(e, request.timeout))?;

        let status = response.status();
        Span::current().record("http.status_code", status.as_u16());
        let otel_status = if status.is_server_error() { "ERROR" } else { "OK" };
        Span::current().record("otel.status_code", otel_status);

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| classify(e, request.timeout))?;

        Ok(TransportResponse {
            status: status.as_u16(),
            headers,
            body,
            duration: started.elapsed(),
        })
    }
}

/// Maps a reqwest failure onto the transport error taxonomy.
fn classify(error: reqwest::Error, timeout: Option<Duration>) -> TransportError {
    if error.is_timeout() {
        Span::current().record("otel.status_code", "ERROR");
        let duration_ms = timeout.map_or(0, |t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX));
        return TransportError::Timeout { duration_ms };
    }
    if error.is_connect() {
        Span::current().record("otel.status_code", "ERROR");
        return TransportError::Connection(error.to_string());
    }
    TransportError::Request(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::RestMethod;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(method: RestMethod, server: &MockServer, route: &str) -> TransportRequest {
        let url = Url::parse(&format!("{}{route}", server.uri())).unwrap();
        TransportRequest::new(method, url)
    }

    #[tokio::test]
    async fn test_get_with_query_and_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/products"))
            .and(query_param("limit", "10"))
            .and(header("x-tenant", "acme"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new().unwrap();
        let mut req = request(RestMethod::Get, &mock_server, "/products");
        req.query.push(("limit".to_string(), "10".to_string()));
        req.headers.push(("X-Tenant".to_string(), "acme".to_string()));

        let response = transport.send(req).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&response.body).unwrap(),
            json!([{ "id": 1 }])
        );
    }

    #[tokio::test]
    async fn test_post_json_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/products"))
            .and(body_json(json!({ "name": "Widget", "price": 9.99 })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "p1" })))
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new().unwrap();
        let mut req = request(RestMethod::Post, &mock_server, "/products");
        req.body = Some(json!({ "name": "Widget", "price": 9.99 }));

        let response = transport.send(req).await.unwrap();
        assert_eq!(response.status, 201);
    }

    #[tokio::test]
    async fn test_error_status_is_not_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not here"))
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new().unwrap();
        let response = transport
            .send(request(RestMethod::Get, &mock_server, "/missing"))
            .await
            .unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(&response.body[..], b"Not here");
    }

    #[tokio::test]
    async fn test_extra_default_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/with-header"))
            .and(header("x-custom-header", "custom-value"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let mut extra = HeaderMap::new();
        extra.insert("x-custom-header", HeaderValue::from_static("custom-value"));
        let transport = HttpTransport::with_headers(extra).unwrap();

        let response = transport
            .send(request(RestMethod::Get, &mock_server, "/with-header"))
            .await
            .unwrap();
        assert_eq!(response.status, 204);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new().unwrap();
        let mut req = request(RestMethod::Get, &mock_server, "/slow");
        req.timeout = Some(Duration::from_millis(100));

        let err = transport.send(req).await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout { duration_ms: 100 }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let transport = HttpTransport::new().unwrap();
        let req = TransportRequest::new(
            RestMethod::Get,
            Url::parse("http://127.0.0.1:1/ping").unwrap(),
        );

        let err = transport.send(req).await.unwrap_err();
        assert!(matches!(err, TransportError::Connection(_)));
    }

    #[tokio::test]
    async fn test_invalid_header_value() {
        let mock_server = MockServer::start().await;
        let transport = HttpTransport::new().unwrap();
        let mut req = request(RestMethod::Get, &mock_server, "/ping");
        req.headers.push(("X-Bad".to_string(), "line\nbreak".to_string()));

        let err = transport.send(req).await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }
}
