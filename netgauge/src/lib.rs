//! NetGauge - network-backed panel gauges for flight-simulator add-ons.
//!
//! This library implements the plugin side of a panel gauge that fetches
//! and uploads data over HTTP: operations are submitted to an asynchronous
//! network backend, their handles are tracked to completion across the
//! host's polling ticks, fetched payloads are persisted to a work
//! directory, and the gauge presents either the fetched result or a fixed
//! placeholder through a rendering seam.
//!
//! # Architecture
//!
//! ```text
//! host callbacks ──► gauge::Plugin ──► gauge::NetworkGauge (per context)
//!                                          │
//!                        ┌─────────────────┼──────────────────┐
//!                        ▼                 ▼                  ▼
//!                request::RequestTracker  store::PayloadStore  gauge::RenderSurface
//!                        │
//!                        ▼
//!                network::NetworkBackend (HttpNetwork / test doubles)
//! ```
//!
//! The tracker is single-threaded and host-driven; only the HTTP backend
//! uses async internally, and it exposes strictly non-blocking queries.

pub mod config;
pub mod gauge;
pub mod logging;
pub mod network;
pub mod request;
pub mod store;
pub mod telemetry;
