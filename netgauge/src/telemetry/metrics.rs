//! Atomic counters for request activity.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::request::PollOutcome;

use super::snapshot::TelemetrySnapshot;

/// Cumulative request counters.
///
/// All methods take `&self`; share the struct behind an `Arc` between the
/// plugin and any views. Counters are monotonically increasing; relative
/// ordering between counters read in one snapshot is not guaranteed, which
/// is acceptable for display purposes.
#[derive(Debug, Default)]
pub struct RequestMetrics {
    submitted: AtomicU64,
    refused: AtomicU64,
    consumed: AtomicU64,
    failed: AtomicU64,
    invalidated: AtomicU64,
    bytes_fetched: AtomicU64,
}

impl RequestMetrics {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an accepted submission.
    pub fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a refused submission.
    pub fn record_refused(&self) {
        self.refused.fetch_add(1, Ordering::Relaxed);
    }

    /// Folds one polling tick's outcome into the totals.
    pub fn record_poll(&self, outcome: &PollOutcome) {
        if outcome.consumed > 0 {
            self.consumed
                .fetch_add(outcome.consumed as u64, Ordering::Relaxed);
        }
        if outcome.failed > 0 {
            self.failed
                .fetch_add(outcome.failed as u64, Ordering::Relaxed);
        }
        if outcome.invalidated > 0 {
            self.invalidated
                .fetch_add(outcome.invalidated as u64, Ordering::Relaxed);
        }
        if outcome.bytes_fetched > 0 {
            self.bytes_fetched
                .fetch_add(outcome.bytes_fetched, Ordering::Relaxed);
        }
    }

    /// Takes a point-in-time copy of all counters.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            refused: self.refused.load(Ordering::Relaxed),
            consumed: self.consumed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            invalidated: self.invalidated.load(Ordering::Relaxed),
            bytes_fetched: self.bytes_fetched.load(Ordering::Relaxed),
        }
    }
}
