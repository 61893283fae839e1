//! HTTP methods a descriptor endpoint may declare.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// HTTP methods accepted in a socket-agent descriptor.
///
/// Descriptors only ever declare these five verbs; anything else is rejected
/// while the descriptor is parsed.
///
/// ## Examples
///
/// ```rust
/// use socket_agent::RestMethod;
///
/// let method: RestMethod = "post".parse().unwrap();
/// assert_eq!(method, RestMethod::Post);
/// assert!(method.has_body());
/// assert_eq!(method.to_string(), "POST");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum RestMethod {
    /// HTTP GET - Retrieve a resource.
    Get,
    /// HTTP POST - Create a resource or trigger an action.
    Post,
    /// HTTP PUT - Replace a resource entirely.
    Put,
    /// HTTP PATCH - Partially update a resource.
    Patch,
    /// HTTP DELETE - Remove a resource.
    Delete,
}

impl RestMethod {
    /// Returns `true` if this method typically has a request body.
    pub fn has_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }

    /// Verb used when generating an endpoint name from method and path.
    ///
    /// `GET` on a collection reads as `list`, on a single resource as `get`.
    pub fn name_prefix(&self, path_has_placeholder: bool) -> &'static str {
        match self {
            Self::Get if path_has_placeholder => "get",
            Self::Get => "list",
            Self::Post => "create",
            Self::Put => "update",
            Self::Patch => "patch",
            Self::Delete => "delete",
        }
    }

    /// Converts to the equivalent `reqwest::Method`.
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl From<RestMethod> for reqwest::Method {
    fn from(method: RestMethod) -> Self {
        method.to_reqwest()
    }
}
