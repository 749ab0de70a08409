//! Asynchronous network subsystem.
//!
//! This module defines the [`NetworkBackend`] trait through which gauges
//! submit HTTP operations and poll them to completion, plus [`HttpNetwork`],
//! the production implementation backed by `reqwest`.
//!
//! # Handle Lifecycle
//!
//! ```text
//! submit_get/submit_put ──► Pending ──► AwaitingData ──► Ready ──► (drained)
//!                                                   └──► Failed
//!                           any slot, after retention ──► Invalidated
//! ```
//!
//! Submission returns an opaque [`RequestId`] or `None` when the backend
//! refuses the operation (e.g. an unparseable URL). State queries never
//! block; a handle the backend no longer knows reports
//! [`RequestState::Invalidated`].
//!
//! # Example
//!
//! ```ignore
//! use netgauge::network::{HttpNetwork, HttpNetworkConfig, NetworkBackend, RequestState};
//!
//! let network = HttpNetwork::new(HttpNetworkConfig::default())?;
//! let id = network.submit_get("https://picsum.photos/500").expect("refused");
//!
//! // Later, on a polling tick:
//! if network.query_state(id) == RequestState::Ready {
//!     let payload = network.fetch_payload(id);
//! }
//! ```

mod backend;
mod http;
mod types;

pub use backend::NetworkBackend;
pub use http::{HttpNetwork, HttpNetworkConfig, DEFAULT_RETENTION_SECS, DEFAULT_TIMEOUT_SECS};
pub use types::{NetworkError, RequestId, RequestParam, RequestState};

#[cfg(test)]
pub use backend::tests::ScriptedNetwork;
