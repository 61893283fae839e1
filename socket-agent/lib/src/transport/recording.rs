//! In-memory transport that records requests and replays scripted outcomes.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde_json::Value;
use tokio::sync::{Mutex, Notify, Semaphore};

use super::{Transport, TransportRequest, TransportResponse};
use crate::error::TransportError;

#[derive(Debug, Clone)]
enum Outcome {
    Respond(TransportResponse),
    Timeout(u64),
    Refused(String),
}

#[derive(Debug, Default)]
struct State {
    requests: Vec<TransportRequest>,
    script: VecDeque<Outcome>,
}

/// Transport spy for tests and offline use.
///
/// Every request is recorded before anything else happens. Outcomes are
/// taken from a FIFO script; when the script is empty the transport answers
/// `200` with an empty JSON object. Clones share state, so a test can keep
/// one handle and give the other to a client.
///
/// ## Examples
///
/// ```rust
/// use serde_json::json;
/// use socket_agent::transport::{RecordingTransport, Transport, TransportRequest};
/// use socket_agent::RestMethod;
///
/// # tokio_test_block(async {
/// let transport = RecordingTransport::new();
/// transport.push_json(404, json!({ "error": "nope" })).await;
///
/// let url = "http://shop.test/products/1".parse().unwrap();
/// let response = transport.send(TransportRequest::new(RestMethod::Get, url)).await.unwrap();
/// assert_eq!(response.status, 404);
/// assert_eq!(transport.request_count().await, 1);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    state: Arc<Mutex<State>>,
    gate: Option<Arc<Semaphore>>,
    arrived: Arc<Notify>,
}

impl RecordingTransport {
    /// Creates a transport that answers immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport that holds every request until [`release`] is called.
    ///
    /// [`release`]: RecordingTransport::release
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::default()
        }
    }

    /// Lets `n` held requests proceed.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Waits until at least one request has been recorded since the last wait.
    pub async fn request_arrived(&self) {
        self.arrived.notified().await;
    }

    /// Queues a response with a JSON body.
    pub async fn push_json(&self, status: u16, body: Value) {
        let body = Bytes::from(body.to_string());
        self.push_response(TransportResponse {
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body,
            duration: Duration::from_millis(1),
        })
        .await;
    }

    /// Queues an arbitrary response.
    pub async fn push_response(&self, response: TransportResponse) {
        self.state
            .lock()
            .await
            .script
            .push_back(Outcome::Respond(response));
    }

    /// Queues a timeout failure.
    pub async fn push_timeout(&self, duration_ms: u64) {
        self.state
            .lock()
            .await
            .script
            .push_back(Outcome::Timeout(duration_ms));
    }

    /// Queues a connection failure.
    pub async fn push_connection_error(&self, message: impl Into<String>) {
        self.state
            .lock()
            .await
            .script
            .push_back(Outcome::Refused(message.into()));
    }

    /// Returns every request sent so far.
    pub async fn requests(&self) -> Vec<TransportRequest> {
        self.state.lock().await.requests.clone()
    }

    /// Returns the most recent request.
    pub async fn last_request(&self) -> Option<TransportRequest> {
        self.state.lock().await.requests.last().cloned()
    }

    /// Returns the number of requests sent so far.
    pub async fn request_count(&self) -> usize {
        self.state.lock().await.requests.len()
    }
}

impl Transport for RecordingTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let outcome = {
            let mut state = self.state.lock().await;
            state.requests.push(request);
            state.script.pop_front()
        };
        self.arrived.notify_one();

        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| TransportError::Connection(e.to_string()))?;
            permit.forget();
        }

        match outcome {
            Some(Outcome::Respond(response)) => Ok(response),
            Some(Outcome::Timeout(duration_ms)) => Err(TransportError::Timeout { duration_ms }),
            Some(Outcome::Refused(message)) => Err(TransportError::Connection(message)),
            None => Ok(TransportResponse {
                status: 200,
                headers: Vec::new(),
                body: Bytes::from_static(b"{}"),
                duration: Duration::ZERO,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::RestMethod;
    use serde_json::json;

    fn get(path: &str) -> TransportRequest {
        let url = format!("http://shop.test{path}").parse().unwrap();
        TransportRequest::new(RestMethod::Get, url)
    }

    #[tokio::test]
    async fn test_records_in_order() {
        let transport = RecordingTransport::new();
        transport.send(get("/a")).await.unwrap();
        transport.send(get("/b")).await.unwrap();

        let paths: Vec<String> = transport
            .requests()
            .await
            .iter()
            .map(|r| r.url.path().to_string())
            .collect();
        assert_eq!(paths, vec!["/a", "/b"]);
    }

    #[tokio::test]
    async fn test_script_is_fifo_then_default() {
        let transport = RecordingTransport::new();
        transport.push_json(201, json!({ "id": 1 })).await;
        transport.push_timeout(50).await;

        assert_eq!(transport.send(get("/")).await.unwrap().status, 201);
        assert!(matches!(
            transport.send(get("/")).await,
            Err(TransportError::Timeout { duration_ms: 50 })
        ));
        let fallback = transport.send(get("/")).await.unwrap();
        assert_eq!(fallback.status, 200);
        assert_eq!(&fallback.body[..], b"{}");
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let transport = RecordingTransport::new();
        let handle = transport.clone();
        transport.send(get("/x")).await.unwrap();
        assert_eq!(handle.request_count().await, 1);
        assert_eq!(handle.last_request().await.unwrap().url.path(), "/x");
    }

    #[tokio::test]
    async fn test_gate_holds_until_released() {
        let transport = RecordingTransport::gated();
        let sender = transport.clone();
        let task = tokio::spawn(async move { sender.send(get("/held")).await });

        transport.request_arrived().await;
        assert_eq!(transport.request_count().await, 1);
        assert!(!task.is_finished());

        transport.release(1);
        let response = task.await.unwrap().unwrap();
        assert_eq!(response.status, 200);
    }
}
