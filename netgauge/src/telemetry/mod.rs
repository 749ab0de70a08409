//! Request telemetry for observability and user feedback.
//!
//! [`RequestMetrics`] accumulates lock-free counters fed from submissions
//! and tracker poll outcomes; [`TelemetrySnapshot`] is the point-in-time
//! copy handed to views (CLI status line, shutdown summary).
//!
//! ```text
//! Gauge / Tracker ─────► RequestMetrics ─────► TelemetrySnapshot ─────► Views
//!                        (atomic counters)     (point-in-time copy)
//! ```

mod metrics;
mod snapshot;

pub use metrics::RequestMetrics;
pub use snapshot::TelemetrySnapshot;
