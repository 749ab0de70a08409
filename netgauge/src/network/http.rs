//! HTTP network backend built on `reqwest`.
//!
//! [`HttpNetwork`] runs each submitted transfer on an owned Tokio runtime
//! and tracks it in a slot table keyed by [`RequestId`]. The trait surface
//! it exposes stays strictly non-blocking: the polling side only ever locks
//! the slot table for a state lookup or a payload drain.
//!
//! Terminal slots (`Ready` after drain, or `Failed`) are kept for a
//! configurable retention period and then dropped, after which queries for
//! the id report [`RequestState::Invalidated`]. This mirrors a host network
//! API that garbage-collects finished requests on its own schedule.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::backend::NetworkBackend;
use super::types::{NetworkError, RequestId, RequestParam, RequestState};

/// Default per-request timeout (matches the client-side default used for
/// imagery providers).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default retention of terminal slots before invalidation.
pub const DEFAULT_RETENTION_SECS: u64 = 60;

/// Configuration for [`HttpNetwork`].
#[derive(Clone, Debug)]
pub struct HttpNetworkConfig {
    /// Per-request timeout.
    pub timeout: Duration,

    /// How long a terminal slot survives before the backend discards it and
    /// starts reporting `Invalidated`.
    pub retention: Duration,
}

impl Default for HttpNetworkConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retention: Duration::from_secs(DEFAULT_RETENTION_SECS),
        }
    }
}

/// Internal per-request slot state.
///
/// `Ready` holds the body until the one-time drain; after that the slot
/// still reports `Ready` (data gone) until retention expires.
enum SlotState {
    Pending,
    AwaitingData,
    Ready(Option<Bytes>),
    Failed,
}

struct Slot {
    state: SlotState,
    terminal_at: Option<Instant>,
}

impl Slot {
    fn new() -> Self {
        Self {
            state: SlotState::Pending,
            terminal_at: None,
        }
    }
}

type SlotTable = Arc<Mutex<HashMap<u64, Slot>>>;

/// Production network backend: `reqwest` client + owned Tokio runtime.
///
/// # Runtime Ownership
///
/// The runtime is owned by this struct and shut down on drop. Construct and
/// drop `HttpNetwork` from synchronous code (dropping a Tokio runtime from
/// within async context panics).
pub struct HttpNetwork {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    slots: SlotTable,
    next_id: AtomicU64,
    retention: Duration,
}

impl HttpNetwork {
    /// Creates a backend with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::ClientBuild`] if the HTTP client cannot be
    /// constructed, or [`NetworkError::Runtime`] if the runtime cannot.
    pub fn new(config: HttpNetworkConfig) -> Result<Self, NetworkError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NetworkError::ClientBuild(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("netgauge-http")
            .enable_all()
            .build()?;

        Ok(Self {
            client,
            runtime,
            slots: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
            retention: config.retention,
        })
    }

    /// Creates a backend with default configuration.
    ///
    /// # Errors
    ///
    /// Same as [`HttpNetwork::new`].
    pub fn with_defaults() -> Result<Self, NetworkError> {
        Self::new(HttpNetworkConfig::default())
    }

    /// Number of slots currently held, including terminal ones not yet
    /// discarded.
    pub fn slot_count(&self) -> usize {
        self.slots.lock().len()
    }

    fn allocate_id(&self) -> RequestId {
        // Ids start at 1; 0 is never issued.
        RequestId::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn insert_slot(&self, id: RequestId) {
        self.slots.lock().insert(id.value(), Slot::new());
    }

    fn spawn_transfer(&self, id: RequestId, request: reqwest::RequestBuilder) {
        let slots = Arc::clone(&self.slots);
        self.runtime.spawn(async move {
            mark_awaiting(&slots, id);

            let outcome = async {
                let response = request.send().await.map_err(|e| e.to_string())?;
                let status = response.status();
                if !status.is_success() {
                    return Err(format!("HTTP {}", status));
                }
                response.bytes().await.map_err(|e| e.to_string())
            }
            .await;

            match outcome {
                Ok(body) => {
                    debug!(%id, bytes = body.len(), "transfer complete");
                    finish(&slots, id, SlotState::Ready(Some(body)));
                }
                Err(reason) => {
                    debug!(%id, %reason, "transfer failed");
                    finish(&slots, id, SlotState::Failed);
                }
            }
        });
    }
}

/// Marks an in-flight slot as waiting for data, if it still exists.
fn mark_awaiting(slots: &SlotTable, id: RequestId) {
    if let Some(slot) = slots.lock().get_mut(&id.value()) {
        slot.state = SlotState::AwaitingData;
    }
}

/// Records a terminal transition, stamping the retention clock.
fn finish(slots: &SlotTable, id: RequestId, state: SlotState) {
    if let Some(slot) = slots.lock().get_mut(&id.value()) {
        slot.state = state;
        slot.terminal_at = Some(Instant::now());
    }
}

impl NetworkBackend for HttpNetwork {
    fn submit_get(&self, url: &str) -> Option<RequestId> {
        let parsed = match reqwest::Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(url, error = %e, "refusing GET submission");
                return None;
            }
        };

        let id = self.allocate_id();
        self.insert_slot(id);
        debug!(%id, url, "submitted GET");
        self.spawn_transfer(id, self.client.get(parsed));
        Some(id)
    }

    fn submit_put(&self, url: &str, param: &RequestParam) -> Option<RequestId> {
        let parsed = match reqwest::Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(url, error = %e, "refusing PUT submission");
                return None;
            }
        };

        let mut headers = reqwest::header::HeaderMap::new();
        for line in param.headers() {
            let Some((name, value)) = line.split_once(':') else {
                warn!(header = line.as_str(), "refusing PUT submission: malformed header");
                return None;
            };
            let name = match reqwest::header::HeaderName::from_bytes(name.trim().as_bytes()) {
                Ok(name) => name,
                Err(e) => {
                    warn!(header = line.as_str(), error = %e, "refusing PUT submission");
                    return None;
                }
            };
            let value = match reqwest::header::HeaderValue::from_str(value.trim()) {
                Ok(value) => value,
                Err(e) => {
                    warn!(header = line.as_str(), error = %e, "refusing PUT submission");
                    return None;
                }
            };
            headers.insert(name, value);
        }

        let mut request = self.client.put(parsed).headers(headers);
        if let Some(body) = param.body() {
            request = request.body(body.to_vec());
        }

        let id = self.allocate_id();
        self.insert_slot(id);
        debug!(%id, url, "submitted PUT");
        self.spawn_transfer(id, request);
        Some(id)
    }

    fn query_state(&self, id: RequestId) -> RequestState {
        let mut slots = self.slots.lock();
        let Some(slot) = slots.get(&id.value()) else {
            return RequestState::Invalidated;
        };

        // Discard terminal slots past retention; the id is then invalid.
        if let Some(terminal_at) = slot.terminal_at {
            if terminal_at.elapsed() >= self.retention {
                slots.remove(&id.value());
                debug!(%id, "slot discarded after retention");
                return RequestState::Invalidated;
            }
        }

        match slot.state {
            SlotState::Pending => RequestState::Pending,
            SlotState::AwaitingData => RequestState::AwaitingData,
            SlotState::Ready(_) => RequestState::Ready,
            SlotState::Failed => RequestState::Failed,
        }
    }

    fn fetch_payload(&self, id: RequestId) -> Option<Bytes> {
        let mut slots = self.slots.lock();
        match slots.get_mut(&id.value()) {
            Some(Slot {
                state: SlotState::Ready(body),
                ..
            }) => body.take(),
            _ => None,
        }
    }
}
