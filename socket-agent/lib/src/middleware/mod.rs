//! Middleware pipeline wrapping every dispatched call.
//!
//! Per call the pipeline creates a fresh [`MiddlewareContext`], folds the
//! parameters through every `before_request` hook in registration order,
//! dispatches, and then folds the result through `after_response` (or the
//! error through `on_error`) in reverse registration order. The first
//! `on_error` hook that recovers short-circuits the rest.
//!
//! ## Examples
//!
//! ```rust
//! use socket_agent::middleware::{Middleware, MiddlewareContext};
//! use socket_agent::{ApiResponse, Params};
//!
//! struct Stamp;
//!
//! impl Middleware for Stamp {
//!     fn name(&self) -> &str {
//!         "stamp"
//!     }
//!
//!     fn after_response(
//!         &self,
//!         _endpoint: &str,
//!         response: ApiResponse,
//!         _ctx: &mut MiddlewareContext,
//!     ) -> ApiResponse {
//!         response.with_header("x-stamped", "yes")
//!     }
//! }
//! ```

mod context;
mod headers;
mod logging;
mod telemetry;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

pub use context::MiddlewareContext;
pub use headers::HeaderMiddleware;
pub use logging::TracingMiddleware;
pub use telemetry::{CallRecord, TelemetryMiddleware};

use crate::dispatch::Params;
use crate::error::SocketAgentError;
use crate::response::ApiResponse;

/// Result of an `on_error` hook.
#[derive(Debug)]
pub enum ErrorOutcome {
    /// Pass the (possibly replaced) error on to the next hook.
    Propagate(SocketAgentError),
    /// Stop error handling and return this response to the caller.
    Recover(ApiResponse),
}

/// An interceptor around dispatched calls.
///
/// Every hook has a pass-through default, so implementors override only the
/// stages they care about. `endpoint` is the endpoint name for `call` and
/// `"<METHOD> <path>"` for `call_raw`.
pub trait Middleware: Send + Sync {
    /// Name used by `remove_middleware`. Defaults to the type name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Runs before dispatch, in registration order.
    fn before_request(&self, _endpoint: &str, params: Params, _ctx: &mut MiddlewareContext) -> Params {
        params
    }

    /// Runs after a response arrived, in reverse registration order.
    fn after_response(
        &self,
        _endpoint: &str,
        response: ApiResponse,
        _ctx: &mut MiddlewareContext,
    ) -> ApiResponse {
        response
    }

    /// Runs when dispatch failed, in reverse registration order.
    fn on_error(
        &self,
        _endpoint: &str,
        error: SocketAgentError,
        _ctx: &mut MiddlewareContext,
    ) -> ErrorOutcome {
        ErrorOutcome::Propagate(error)
    }
}

/// Ordered list of middleware.
#[derive(Clone, Default)]
pub struct Pipeline {
    layers: Vec<Arc<dyn Middleware>>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware; it runs last before and first after.
    pub fn push(&mut self, middleware: Arc<dyn Middleware>) {
        self.layers.push(middleware);
    }

    /// Removes every middleware with this name. Returns `true` if any matched.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.layers.len();
        self.layers.retain(|layer| layer.name() != name);
        self.layers.len() != before
    }

    /// Middleware names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.layers.iter().map(|layer| layer.name()).collect()
    }

    /// Number of registered middleware.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Runs one call through the pipeline.
    ///
    /// `dispatch` receives the parameters as rewritten by the `before` hooks.
    pub async fn run<F, Fut>(&self, endpoint: &str, params: Params, dispatch: F) -> Result<ApiResponse, SocketAgentError>
    where
        F: FnOnce(Params) -> Fut,
        Fut: Future<Output = Result<ApiResponse, SocketAgentError>>,
    {
        let mut ctx = MiddlewareContext::new();
        let params = self.before(endpoint, params, &mut ctx);
        match dispatch(params).await {
            Ok(response) => Ok(self.after(endpoint, response, &mut ctx)),
            Err(error) => self.error(endpoint, error, &mut ctx),
        }
    }

    fn before(&self, endpoint: &str, params: Params, ctx: &mut MiddlewareContext) -> Params {
        self.layers
            .iter()
            .fold(params, |params, layer| layer.before_request(endpoint, params, ctx))
    }

    fn after(&self, endpoint: &str, response: ApiResponse, ctx: &mut MiddlewareContext) -> ApiResponse {
        self.layers
            .iter()
            .rev()
            .fold(response, |response, layer| layer.after_response(endpoint, response, ctx))
    }

    fn error(
        &self,
        endpoint: &str,
        mut error: SocketAgentError,
        ctx: &mut MiddlewareContext,
    ) -> Result<ApiResponse, SocketAgentError> {
        for layer in self.layers.iter().rev() {
            match layer.on_error(endpoint, error, ctx) {
                ErrorOutcome::Recover(response) => return Ok(response),
                ErrorOutcome::Propagate(next) => error = next,
            }
        }
        Err(error)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
