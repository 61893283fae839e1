//! Call history recording.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ErrorOutcome, Middleware, MiddlewareContext};
use crate::dispatch::Params;
use crate::error::SocketAgentError;
use crate::response::ApiResponse;

const RECORD_KEY: &str = "telemetry.record";

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallRecord {
    /// Identifier unique within this middleware, in call order.
    pub id: u64,
    /// Endpoint name, or `"<METHOD> <path>"` for raw calls.
    pub endpoint: String,
    /// Parameters as they left the `before` chain up to this middleware.
    pub params: Params,
    /// When the call started.
    pub timestamp: DateTime<Utc>,
    /// HTTP status, once a response arrived.
    pub status_code: Option<u16>,
    /// Whether the call succeeded. `false` until a successful response arrives.
    pub success: bool,
    /// Round trip time in milliseconds, once a response arrived.
    pub duration_ms: Option<f64>,
    /// Error message, for failed calls.
    pub error: Option<String>,
}

/// Records a history of calls while recording is enabled.
///
/// The request half of each record is written in `before_request`; the
/// per-call context carries the record's id so that `after_response` and
/// `on_error` complete the right one even when calls overlap or the history
/// is cleared mid-call.
///
/// ## Examples
///
/// ```rust
/// use std::sync::Arc;
/// use socket_agent::middleware::TelemetryMiddleware;
///
/// let telemetry = Arc::new(TelemetryMiddleware::recording());
/// // client.use_middleware(telemetry.clone());
/// assert!(telemetry.history().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct TelemetryMiddleware {
    recording: AtomicBool,
    next_id: AtomicU64,
    history: Mutex<Vec<CallRecord>>,
}

impl TelemetryMiddleware {
    /// Creates the middleware with recording off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the middleware with recording on.
    pub fn recording() -> Self {
        let telemetry = Self::new();
        telemetry.start_recording();
        telemetry
    }

    /// Turns recording on.
    pub fn start_recording(&self) {
        self.recording.store(true, Ordering::SeqCst);
    }

    /// Turns recording off. Already-started calls still complete their record.
    pub fn stop_recording(&self) {
        self.recording.store(false, Ordering::SeqCst);
    }

    /// Returns `true` while recording.
    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    /// Returns a copy of the recorded history, oldest first.
    pub fn history(&self) -> Vec<CallRecord> {
        self.lock().clone()
    }

    /// Drops all records. Calls still in flight are not re-added.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CallRecord>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, ctx: &MiddlewareContext, apply: impl FnOnce(&mut CallRecord)) {
        let Some(id) = ctx.get_as::<u64>(RECORD_KEY) else {
            return;
        };
        if let Some(record) = self.lock().iter_mut().rev().find(|record| record.id == id) {
            apply(record);
        }
    }
}

impl Middleware for TelemetryMiddleware {
    fn name(&self) -> &str {
        "telemetry"
    }

    fn before_request(&self, endpoint: &str, params: Params, ctx: &mut MiddlewareContext) -> Params {
        if !self.is_recording() {
            return params;
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        ctx.insert(RECORD_KEY, id);
        self.lock().push(CallRecord {
            id,
            endpoint: endpoint.to_string(),
            params: params.clone(),
            timestamp: Utc::now(),
            status_code: None,
            success: false,
            duration_ms: None,
            error: None,
        });
        params
    }

    fn after_response(&self, _endpoint: &str, response: ApiResponse, ctx: &mut MiddlewareContext) -> ApiResponse {
        self.update(ctx, |record| {
            record.status_code = Some(response.status_code());
            record.success = response.success();
            record.duration_ms = Some(response.duration_ms());
            record.error = response.error().map(str::to_string);
        });
        response
    }

    fn on_error(&self, _endpoint: &str, error: SocketAgentError, ctx: &mut MiddlewareContext) -> ErrorOutcome {
        self.update(ctx, |record| {
            record.success = false;
            record.error = Some(error.to_string());
        });
        ErrorOutcome::Propagate(error)
    }
}
