//! Network backend abstraction for dependency injection and testing.

use bytes::Bytes;

use super::types::{RequestId, RequestParam, RequestState};

/// Trait for the asynchronous network subsystem a gauge talks to.
///
/// All methods are non-blocking: `submit_*` returns immediately with a fresh
/// handle (or `None` on refusal), and `query_state` / `fetch_payload` only
/// inspect existing state. Implementations must be safe to share across the
/// gauge instances of one plugin (`Send + Sync`).
///
/// # Handle Ownership
///
/// The backend owns handle state; callers own only the id. After the backend
/// discards a handle, `query_state` reports [`RequestState::Invalidated`]
/// and the caller must stop using the id.
pub trait NetworkBackend: Send + Sync {
    /// Submits an HTTP GET for the given URL.
    ///
    /// # Returns
    ///
    /// A fresh handle, or `None` if the backend refuses the submission.
    fn submit_get(&self, url: &str) -> Option<RequestId>;

    /// Submits an HTTP PUT with the given headers and body.
    ///
    /// # Returns
    ///
    /// A fresh handle, or `None` if the backend refuses the submission.
    fn submit_put(&self, url: &str, param: &RequestParam) -> Option<RequestId>;

    /// Reports the current state of a handle.
    ///
    /// Unknown handles report [`RequestState::Invalidated`].
    fn query_state(&self, id: RequestId) -> RequestState;

    /// Retrieves the response payload of a [`RequestState::Ready`] handle.
    ///
    /// The payload is handed out exactly once; repeated calls, and calls in
    /// any other state, return `None`.
    fn fetch_payload(&self, id: RequestId) -> Option<Bytes>;
}
