//! Projection of a descriptor into LLM tool-calling schemas.
//!
//! The projection is a pure function of the descriptor: same descriptor,
//! same output, in declared endpoint order. Header parameters are transport
//! concerns and never appear as tool arguments.

use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value, json};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::descriptor::{Descriptor, EndpointSpec, ParamType, ParameterSpec};
use crate::error::ProjectionError;

/// Target tool-schema dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ToolFormat {
    /// `{"type": "function", "function": {...}}`.
    #[default]
    OpenAi,
    /// `{"name", "description", "input_schema"}`.
    Anthropic,
    /// Flat description including method, path and parameter locations.
    Generic,
}

impl FromStr for ToolFormat {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::iter()
            .find(|format| format.to_string().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ProjectionError::UnsupportedFormat {
                format: s.to_string(),
            })
    }
}

/// JSON-schema object describing a tool's arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSchema {
    #[serde(rename = "type")]
    kind: &'static str,
    /// Argument schemas keyed by parameter name, in declared order.
    pub properties: Map<String, Value>,
    /// Required argument names, in declared order.
    pub required: Vec<String>,
}

/// The `function` member of an OpenAI tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionSpec {
    /// Tool name (the endpoint name).
    pub name: String,
    /// Tool description.
    pub description: String,
    /// Argument schema.
    pub parameters: InputSchema,
}

/// One parameter in the generic dialect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericParameter {
    /// Parameter name.
    pub name: String,
    /// Location (`path`, `query`, `body`).
    #[serde(rename = "in")]
    pub location: String,
    /// JSON-schema type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the argument is required.
    pub required: bool,
    /// Description.
    pub description: String,
}

/// A projected tool, serialized in its dialect's exact shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolSchema {
    /// OpenAI function tool.
    OpenAi {
        /// Always `"function"`.
        #[serde(rename = "type")]
        kind: &'static str,
        /// The function definition.
        function: FunctionSpec,
    },
    /// Anthropic tool.
    Anthropic {
        /// Tool name.
        name: String,
        /// Tool description.
        description: String,
        /// Argument schema.
        input_schema: InputSchema,
    },
    /// Generic tool.
    Generic {
        /// Tool name.
        name: String,
        /// Tool description.
        description: String,
        /// HTTP method.
        method: String,
        /// Path template.
        path: String,
        /// Arguments.
        parameters: Vec<GenericParameter>,
    },
}

impl ToolSchema {
    /// The tool name, whatever the dialect.
    pub fn name(&self) -> &str {
        match self {
            Self::OpenAi { function, .. } => &function.name,
            Self::Anthropic { name, .. } | Self::Generic { name, .. } => name,
        }
    }

    /// Argument names, whatever the dialect, in declared order.
    pub fn argument_names(&self) -> Vec<&str> {
        match self {
            Self::OpenAi { function, .. } => function.parameters.properties.keys().map(String::as_str).collect(),
            Self::Anthropic { input_schema, .. } => input_schema.properties.keys().map(String::as_str).collect(),
            Self::Generic { parameters, .. } => parameters.iter().map(|p| p.name.as_str()).collect(),
        }
    }

    /// Serializes to a JSON value.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Projects every endpoint of a descriptor into the given dialect.
///
/// ## Examples
///
/// ```rust
/// use socket_agent::{Descriptor, EndpointSpec, ParameterSpec, RestMethod};
/// use socket_agent::tools::{project, ToolFormat};
///
/// let descriptor = Descriptor::new("Shop", vec![
///     EndpointSpec::builder()
///         .name("get_product")
///         .method(RestMethod::Get)
///         .path("/products/{id}")
///         .summary("Get a product")
///         .param(ParameterSpec::path("id"))
///         .build()
///         .unwrap(),
/// ]).unwrap();
///
/// let tools = project(&descriptor, ToolFormat::Anthropic);
/// let json = tools[0].to_value();
/// assert_eq!(json["name"], "get_product");
/// assert_eq!(json["input_schema"]["required"][0], "id");
/// ```
pub fn project(descriptor: &Descriptor, format: ToolFormat) -> Vec<ToolSchema> {
    descriptor
        .endpoints()
        .iter()
        .map(|endpoint| project_endpoint(endpoint, format))
        .collect()
}

/// Projects a single endpoint.
pub fn project_endpoint(endpoint: &EndpointSpec, format: ToolFormat) -> ToolSchema {
    let name = endpoint.name().to_string();
    let description = tool_description(endpoint);
    match format {
        ToolFormat::OpenAi => ToolSchema::OpenAi {
            kind: "function",
            function: FunctionSpec {
                name,
                description,
                parameters: input_schema(endpoint),
            },
        },
        ToolFormat::Anthropic => ToolSchema::Anthropic {
            name,
            description,
            input_schema: input_schema(endpoint),
        },
        ToolFormat::Generic => ToolSchema::Generic {
            name,
            description,
            method: endpoint.method().to_string(),
            path: endpoint.path().to_string(),
            parameters: arguments(endpoint)
                .map(|param| GenericParameter {
                    name: param.name.clone(),
                    location: param.location.to_string(),
                    kind: param.kind.to_string(),
                    required: param.required,
                    description: parameter_description(param),
                })
                .collect(),
        },
    }
}

fn arguments(endpoint: &EndpointSpec) -> impl Iterator<Item = &ParameterSpec> {
    endpoint
        .parameters()
        .iter()
        .filter(|param| param.is_tool_argument())
}

fn tool_description(endpoint: &EndpointSpec) -> String {
    endpoint
        .summary()
        .or(endpoint.description())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} {}", endpoint.method(), endpoint.path()))
}

fn parameter_description(param: &ParameterSpec) -> String {
    param
        .description
        .clone()
        .unwrap_or_else(|| format!("{} parameter: {}", param.location.label(), param.name))
}

fn input_schema(endpoint: &EndpointSpec) -> InputSchema {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for param in arguments(endpoint) {
        let mut property = json!({
            "type": param.kind.to_string(),
            "description": parameter_description(param),
        });
        if param.kind == ParamType::Array {
            property["items"] = param.items.clone().unwrap_or_else(|| json!({}));
        }
        properties.insert(param.name.clone(), property);
        if param.required {
            required.push(param.name.clone());
        }
    }
    InputSchema {
        kind: "object",
        properties,
        required,
    }
}
