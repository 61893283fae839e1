//! Rendering JSON parameter values into their HTTP locations.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::HeaderValue;
use serde_json::Value;

use crate::error::ResolutionError;

/// Everything except RFC 3986 unreserved characters is encoded in a path segment.
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Textual form of a value: strings raw, scalars as JSON text, composites as
/// compact JSON.
pub(crate) fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Percent-encoded path segment.
///
/// `.` and `..` are rejected: URL parsing would treat them as dot segments
/// and move the request to another path.
pub(crate) fn path_segment(name: &str, value: &Value) -> Result<String, ResolutionError> {
    let segment = utf8_percent_encode(&to_text(value), PATH_SEGMENT_ENCODE_SET).to_string();
    if segment == "." || segment == ".." {
        return Err(ResolutionError::InvalidParameter {
            name: name.to_string(),
            reason: format!("'{segment}' is not a usable path segment"),
        });
    }
    Ok(segment)
}

/// Query pairs for one parameter. Arrays repeat the key once per element.
pub(crate) fn query_pairs(name: &str, value: &Value) -> Vec<(String, String)> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| (name.to_string(), to_text(item)))
            .collect(),
        other => vec![(name.to_string(), to_text(other))],
    }
}

/// Header value, rejected if it is not a legal HTTP header value.
pub(crate) fn header_value(name: &str, value: &Value) -> Result<String, ResolutionError> {
    let text = to_text(value);
    HeaderValue::from_str(&text).map_err(|e| ResolutionError::InvalidParameter {
        name: name.to_string(),
        reason: format!("not a valid header value: {e}"),
    })?;
    Ok(text)
}
