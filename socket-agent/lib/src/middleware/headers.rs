//! Fixed header parameters for every call.

use serde_json::Value;

use super::{Middleware, MiddlewareContext};
use crate::dispatch::Params;

/// Supplies fixed values (a tenant id, a trace flag) for parameters the
/// caller left out.
///
/// Values are merged into the call's parameters, so they only reach the
/// wire for endpoints that declare a parameter of that name; declare them
/// as `header` parameters in the descriptor. Under the strict unknown
/// parameter policy an endpoint that does not declare one of these names
/// rejects the call, so pair this middleware with
/// [`UnknownParameterPolicy::Ignore`](crate::UnknownParameterPolicy::Ignore)
/// unless every endpoint declares them.
#[derive(Debug, Clone, Default)]
pub struct HeaderMiddleware {
    values: Vec<(String, Value)>,
}

impl HeaderMiddleware {
    /// Creates an empty middleware.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a default value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push((name.into(), value.into()));
        self
    }
}

impl Middleware for HeaderMiddleware {
    fn name(&self) -> &str {
        "headers"
    }

    fn before_request(&self, _endpoint: &str, mut params: Params, _ctx: &mut MiddlewareContext) -> Params {
        for (name, value) in &self.values {
            if params.get(name).is_none_or(Value::is_null) {
                params.insert(name.clone(), value.clone());
            }
        }
        params
    }
}
