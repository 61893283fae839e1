//! Normalized call results.
//!
//! Every dispatched call that produced an HTTP response, whatever its
//! status, ends as an [`ApiResponse`]. Error statuses are data here, not
//! errors: `success` is `false` and `error` carries a message.

mod value;

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;

pub use value::ResponseData;

use crate::transport::TransportResponse;

/// Normalized result of a call.
///
/// Immutable once constructed; middleware that wants to change a response
/// builds a new one with the consuming `with_*` methods.
///
/// ## Examples
///
/// ```rust
/// use serde_json::json;
/// use socket_agent::ApiResponse;
///
/// let response = ApiResponse::new(200, json!({ "id": "123" }));
/// assert!(response.success());
/// assert_eq!(response.json().unwrap()["id"], "123");
///
/// let missing = ApiResponse::new(404, json!({ "error": "Product not found" }));
/// assert!(!missing.success());
/// assert_eq!(missing.error(), Some("Product not found"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    success: bool,
    status_code: u16,
    data: ResponseData,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    headers: BTreeMap<String, String>,
    duration_ms: f64,
}

impl ApiResponse {
    /// Builds a response from a status and JSON body, deriving `success`
    /// and `error` the same way transport responses are normalized.
    pub fn new(status_code: u16, data: impl Into<ResponseData>) -> Self {
        let data = data.into();
        let success = is_success(status_code);
        let error = (!success).then(|| error_message(status_code, &data));
        Self {
            success,
            status_code,
            data,
            error,
            headers: BTreeMap::new(),
            duration_ms: 0.0,
        }
    }

    /// Normalizes a raw transport response.
    pub(crate) fn from_transport(response: TransportResponse) -> Self {
        let data = ResponseData::decode(response.body);
        let headers = response
            .headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        Self {
            headers,
            duration_ms: duration_ms(response.duration),
            ..Self::new(response.status, data)
        }
    }

    /// Whether the status was in `200..=399`.
    pub fn success(&self) -> bool {
        self.success
    }

    /// HTTP status code.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Decoded body.
    pub fn data(&self) -> &ResponseData {
        &self.data
    }

    /// The body as JSON, if it decoded as JSON.
    pub fn json(&self) -> Option<&Value> {
        self.data.as_json()
    }

    /// Error message for unsuccessful statuses.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Response headers, names lowercased.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Looks up a header case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Wall-clock time of the round trip, in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Consumes the response and returns its body.
    pub fn into_data(self) -> ResponseData {
        self.data
    }

    /// Returns a copy with a different body.
    pub fn with_data(self, data: impl Into<ResponseData>) -> Self {
        Self {
            data: data.into(),
            ..self
        }
    }

    /// Returns a copy with an added (or replaced) header.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Returns a copy with a different error message.
    pub fn with_error(self, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..self
        }
    }

    /// Returns a copy with a different duration.
    pub fn with_duration(self, duration: Duration) -> Self {
        Self {
            duration_ms: duration_ms(duration),
            ..self
        }
    }
}

fn is_success(status: u16) -> bool {
    (200..=399).contains(&status)
}

fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Message for an unsuccessful response: the body's `error` or `message`
/// field if it has one, else `HTTP <status>: <reason>`.
fn error_message(status: u16, data: &ResponseData) -> String {
    let from_body = data.as_json().and_then(|json| {
        ["error", "message"]
            .into_iter()
            .find_map(|key| json.get(key).filter(|v| !v.is_null()))
    });

    match from_body {
        Some(Value::String(message)) => message.clone(),
        Some(other) => other.to_string(),
        None => {
            let reason = StatusCode::from_u16(status)
                .ok()
                .and_then(|code| code.canonical_reason())
                .unwrap_or("Unknown Status");
            format!("HTTP {status}: {reason}")
        }
    }
}
