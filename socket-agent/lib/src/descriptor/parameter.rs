//! Parameter definitions for descriptor endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

/// Where a parameter travels in the HTTP request.
///
/// The dispatcher routes every supplied value by this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Substituted into a `{placeholder}` of the path template.
    Path,
    /// Appended to the query string.
    Query,
    /// Collected into the JSON request body.
    Body,
    /// Sent as an HTTP header.
    Header,
}

impl ParameterLocation {
    /// Label used in generated parameter descriptions ("Path", "Query", ...).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Path => "Path",
            Self::Query => "Query",
            Self::Body => "Body",
            Self::Header => "Header",
        }
    }
}

/// JSON-schema primitive type of a parameter.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// A JSON string.
    #[default]
    String,
    /// Any JSON number.
    Number,
    /// An integral JSON number.
    Integer,
    /// `true` or `false`.
    Boolean,
    /// A JSON array.
    Array,
    /// A JSON object.
    Object,
}

/// One parameter of an endpoint.
///
/// ## Examples
///
/// ```
/// use socket_agent::{ParameterLocation, ParameterSpec, ParamType};
///
/// let id = ParameterSpec::path("id").with_description("Product id");
/// assert!(id.required);
/// assert_eq!(id.location, ParameterLocation::Path);
///
/// let limit = ParameterSpec::query("limit").of_type(ParamType::Integer).optional();
/// assert!(!limit.required);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter name, as supplied by callers.
    pub name: String,
    /// JSON-schema type.
    #[serde(rename = "type")]
    pub kind: ParamType,
    /// Where the value goes in the request.
    pub location: ParameterLocation,
    /// Whether callers must supply it.
    pub required: bool,
    /// Human-readable description, used in tool schemas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Item schema for array parameters, passed through to tool schemas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Value>,
}

impl ParameterSpec {
    /// Creates a parameter with an explicit location.
    ///
    /// Path parameters start out required, everything else optional.
    pub fn new(name: impl Into<String>, location: ParameterLocation) -> Self {
        Self {
            name: name.into(),
            kind: ParamType::String,
            location,
            required: location == ParameterLocation::Path,
            description: None,
            items: None,
        }
    }

    /// Creates a required string path parameter.
    pub fn path(name: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::Path)
    }

    /// Creates an optional string query parameter.
    pub fn query(name: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::Query)
    }

    /// Creates a required string body field.
    pub fn body(name: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::Body).required()
    }

    /// Creates an optional header parameter.
    pub fn header(name: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::Header)
    }

    /// Sets the JSON-schema type.
    pub fn of_type(mut self, kind: ParamType) -> Self {
        self.kind = kind;
        self
    }

    /// Marks the parameter required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the parameter optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the item schema of an array parameter.
    pub fn with_items(mut self, items: Value) -> Self {
        self.items = Some(items);
        self
    }

    /// Returns `true` if this parameter is exposed to LLM tool schemas.
    ///
    /// Header parameters are transport concerns, not model-controlled arguments.
    pub fn is_tool_argument(&self) -> bool {
        self.location != ParameterLocation::Header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_defaults() {
        assert!(ParameterSpec::path("id").required);
        assert!(!ParameterSpec::query("q").required);
        assert!(ParameterSpec::body("name").required);
        assert!(!ParameterSpec::header("X-Tenant").required);
    }

    #[test]
    fn test_builder_chain() {
        let param = ParameterSpec::query("tags")
            .of_type(ParamType::Array)
            .required()
            .with_description("Filter tags")
            .with_items(serde_json::json!({ "type": "string" }));

        assert_eq!(param.kind, ParamType::Array);
        assert!(param.required);
        assert_eq!(param.description.as_deref(), Some("Filter tags"));
        assert!(param.items.is_some());
    }

    #[test]
    fn test_type_parsing() {
        assert_eq!("integer".parse::<ParamType>().unwrap(), ParamType::Integer);
        assert_eq!("object".parse::<ParamType>().unwrap(), ParamType::Object);
        assert!("date".parse::<ParamType>().is_err());
    }

    #[test]
    fn test_location_parsing_and_display() {
        assert_eq!(
            "header".parse::<ParameterLocation>().unwrap(),
            ParameterLocation::Header
        );
        assert!("cookie".parse::<ParameterLocation>().is_err());
        assert_eq!(ParameterLocation::Query.to_string(), "query");
        assert_eq!(ParameterLocation::Query.label(), "Query");
    }

    #[test]
    fn test_header_is_not_tool_argument() {
        assert!(!ParameterSpec::header("X-Trace").is_tool_argument());
        assert!(ParameterSpec::body("name").is_tool_argument());
    }
}
