//! Structured `tracing` events for every pipeline stage.

use std::time::Instant;

use tracing::{debug, info, warn};

use super::{ErrorOutcome, Middleware, MiddlewareContext};
use crate::dispatch::Params;
use crate::error::SocketAgentError;
use crate::response::ApiResponse;

const STARTED_KEY: &str = "tracing.started_us";

/// Emits a `debug` event before dispatch, `info` after a response and
/// `warn` on errors. Never changes the call.
#[derive(Debug, Clone)]
pub struct TracingMiddleware {
    epoch: Instant,
}

impl TracingMiddleware {
    /// Creates the middleware.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    fn elapsed_ms(&self, ctx: &MiddlewareContext) -> Option<f64> {
        let started: u64 = ctx.get_as(STARTED_KEY)?;
        let now = u64::try_from(self.epoch.elapsed().as_micros()).ok()?;
        Some(now.saturating_sub(started) as f64 / 1000.0)
    }
}

impl Default for TracingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for TracingMiddleware {
    fn name(&self) -> &str {
        "tracing"
    }

    fn before_request(&self, endpoint: &str, params: Params, ctx: &mut MiddlewareContext) -> Params {
        if let Ok(now) = u64::try_from(self.epoch.elapsed().as_micros()) {
            ctx.insert(STARTED_KEY, now);
        }
        let keys: Vec<&str> = params.keys().map(String::as_str).collect();
        debug!(endpoint, params = ?keys, "Dispatching call");
        params
    }

    fn after_response(&self, endpoint: &str, response: ApiResponse, ctx: &mut MiddlewareContext) -> ApiResponse {
        info!(
            endpoint,
            status = response.status_code(),
            success = response.success(),
            duration_ms = self.elapsed_ms(ctx).unwrap_or(response.duration_ms()),
            "Call completed"
        );
        response
    }

    fn on_error(&self, endpoint: &str, error: SocketAgentError, _ctx: &mut MiddlewareContext) -> ErrorOutcome {
        warn!(endpoint, error = %error, preflight = error.is_preflight(), "Call failed");
        ErrorOutcome::Propagate(error)
    }
}
