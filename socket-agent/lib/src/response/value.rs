//! Decoded response bodies.

use bytes::Bytes;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Body of an [`ApiResponse`](super::ApiResponse), decoded by content.
///
/// Decoding is content-driven rather than header-driven: a body that parses
/// as JSON is JSON regardless of its `Content-Type`.
///
/// ## Examples
///
/// ```rust
/// use bytes::Bytes;
/// use socket_agent::ResponseData;
///
/// let data = ResponseData::decode(Bytes::from_static(br#"{"id": 1}"#));
/// assert_eq!(data.as_json().unwrap()["id"], 1);
///
/// assert!(ResponseData::decode(Bytes::new()).is_empty());
/// assert_eq!(ResponseData::decode(Bytes::from_static(b"pong")).as_text(), Some("pong"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResponseData {
    /// The body was empty.
    #[default]
    Empty,
    /// Parsed JSON body.
    Json(Value),
    /// Non-JSON UTF-8 body.
    Text(String),
    /// Anything else, kept as raw bytes.
    Binary(Bytes),
}

impl ResponseData {
    /// Decodes a raw body: empty, then JSON, then UTF-8 text, then bytes.
    pub fn decode(body: Bytes) -> Self {
        if body.is_empty() {
            return Self::Empty;
        }
        if let Ok(json) = serde_json::from_slice::<Value>(&body) {
            return Self::Json(json);
        }
        match String::from_utf8(body.to_vec()) {
            Ok(text) => Self::Text(text),
            Err(_) => Self::Binary(body),
        }
    }

    /// Returns `true` if there is no body.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Attempt to get the JSON value, returning `None` for other shapes.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Attempt to get text content, returning `None` for other shapes.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Attempt to get binary content, returning `None` for other shapes.
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// Convert into the JSON value, returning `Err(self)` for other shapes.
    pub fn into_json(self) -> Result<Value, Self> {
        match self {
            Self::Json(v) => Ok(v),
            other => Err(other),
        }
    }

    /// Renders the body as a JSON value for display.
    ///
    /// Binary bodies become a placeholder string with their length.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Json(v) => v.clone(),
            Self::Text(s) => Value::String(s.clone()),
            Self::Binary(b) => Value::String(format!("<{} bytes>", b.len())),
        }
    }
}

impl From<Value> for ResponseData {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            other => Self::Json(other),
        }
    }
}

impl Serialize for ResponseData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
