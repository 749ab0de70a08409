//! Point-in-time telemetry copies for display.

use serde::Serialize;

/// A consistent-enough copy of the request counters.
///
/// Serializable so views can emit it as JSON (the CLI does this in its
/// shutdown summary).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TelemetrySnapshot {
    /// Submissions the backend accepted.
    pub submitted: u64,
    /// Submissions the backend refused.
    pub refused: u64,
    /// Payloads delivered to consumers.
    pub consumed: u64,
    /// Failures observed (first observation per handle).
    pub failed: u64,
    /// Handles removed after backend invalidation.
    pub invalidated: u64,
    /// Total payload bytes delivered.
    pub bytes_fetched: u64,
}

impl TelemetrySnapshot {
    /// Submissions not yet resolved to a consumed/failed/invalidated end.
    ///
    /// Saturating: counters are read independently, so a racing update can
    /// momentarily make the terminal counts exceed `submitted`.
    pub fn outstanding(&self) -> u64 {
        self.submitted
            .saturating_sub(self.consumed + self.failed + self.invalidated)
    }
}

impl std::fmt::Display for TelemetrySnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} submitted ({} refused), {} consumed ({} bytes), {} failed, {} invalidated",
            self.submitted,
            self.refused,
            self.consumed,
            self.bytes_fetched,
            self.failed,
            self.invalidated
        )
    }
}
