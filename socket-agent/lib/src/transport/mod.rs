//! The transport seam: one HTTP round trip, nothing more.
//!
//! The dispatcher and discovery only ever talk to a [`Transport`]. The
//! production implementation is [`HttpTransport`] (reqwest); tests swap in
//! [`RecordingTransport`] to observe what would have gone on the wire.

mod http;
mod recording;

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use serde_json::Value;
use url::Url;

pub use http::HttpTransport;
pub use recording::RecordingTransport;

use crate::error::TransportError;
use crate::method::RestMethod;

/// A fully resolved request, ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: RestMethod,
    /// Absolute URL without the query string.
    pub url: Url,
    /// Query pairs, in order. Repeated keys are allowed.
    pub query: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<Value>,
    /// Headers, in order.
    pub headers: Vec<(String, String)>,
    /// Upper bound on the whole round trip.
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    /// Creates a request with no query, body or headers.
    pub fn new(method: RestMethod, url: Url) -> Self {
        Self {
            method,
            url,
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
            timeout: None,
        }
    }

    /// Returns the first header with this name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns all values of a query key, in order.
    pub fn query_values(&self, key: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

/// A raw HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// Status code.
    pub status: u16,
    /// Response headers, in the order received.
    pub headers: Vec<(String, String)>,
    /// Undecoded body.
    pub body: Bytes,
    /// Time from send to fully read body.
    pub duration: Duration,
}

/// Performs HTTP round trips.
///
/// Implementations must not interpret status codes: any response that
/// arrived is `Ok`, only a failed round trip is `Err`.
pub trait Transport: Send + Sync {
    /// Sends one request and reads the whole response.
    fn send(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}
