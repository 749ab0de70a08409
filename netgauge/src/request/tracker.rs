//! The request tracker: a bounded set of outstanding operation handles.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::network::{NetworkBackend, RequestId, RequestParam, RequestState};

use super::policy::CompletionPolicy;

/// Per-handle bookkeeping.
///
/// `Consumed` and `FailedSeen` only occur under
/// [`CompletionPolicy::RetainUntilInvalidated`]; with the default policy a
/// handle leaves the set the moment it would enter either.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Disposition {
    /// Nothing terminal observed yet.
    Outstanding,
    /// Payload delivered to the consumer; never fetched again.
    Consumed,
    /// Failure observed and counted; not revisited.
    FailedSeen,
}

/// Summary of one polling tick.
///
/// Counts are per-tick, not cumulative; feed them into
/// [`crate::telemetry::RequestMetrics`] for totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollOutcome {
    /// Handles still waiting on the backend.
    pub in_flight: usize,
    /// Payloads delivered to the consumer this tick.
    pub consumed: usize,
    /// Failures observed this tick (first observation only).
    pub failed: usize,
    /// Handles removed because the backend invalidated them.
    pub invalidated: usize,
    /// Terminal handles retained under `RetainUntilInvalidated`.
    pub retained: usize,
    /// Total payload bytes delivered this tick.
    pub bytes_fetched: u64,
}

impl PollOutcome {
    /// True if anything other than waiting happened this tick.
    pub fn has_activity(&self) -> bool {
        self.consumed > 0 || self.failed > 0 || self.invalidated > 0
    }
}

impl std::fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "poll: {} in flight, {} consumed ({} bytes), {} failed, {} invalidated, {} retained",
            self.in_flight,
            self.consumed,
            self.bytes_fetched,
            self.failed,
            self.invalidated,
            self.retained
        )
    }
}

/// Tracks asynchronous network operations from submission to terminal state.
///
/// The tracker never blocks and never retries: a `Failed` handle stays
/// failed until the caller submits a new operation, and all failure is
/// communicated through per-handle state, not errors.
///
/// Iteration order of the tracked set is the id order of submission
/// (ids are monotonically increasing), which keeps polling deterministic.
pub struct RequestTracker {
    backend: Arc<dyn NetworkBackend>,
    policy: CompletionPolicy,
    tracked: BTreeMap<RequestId, Disposition>,
}

impl RequestTracker {
    /// Creates a tracker over the given backend.
    pub fn new(backend: Arc<dyn NetworkBackend>, policy: CompletionPolicy) -> Self {
        Self {
            backend,
            policy,
            tracked: BTreeMap::new(),
        }
    }

    /// Returns the configured completion policy.
    pub fn policy(&self) -> CompletionPolicy {
        self.policy
    }

    /// Number of tracked handles.
    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    /// True if no handles are tracked.
    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// True if the given handle is currently tracked.
    pub fn contains(&self, id: RequestId) -> bool {
        self.tracked.contains_key(&id)
    }

    /// Tracked handles in iteration order.
    pub fn tracked_ids(&self) -> Vec<RequestId> {
        self.tracked.keys().copied().collect()
    }

    /// Submits a GET operation and tracks the resulting handle.
    ///
    /// # Returns
    ///
    /// The new handle, or `None` if the backend refused the submission. A
    /// refusal leaves the tracked set untouched.
    pub fn submit_get(&mut self, url: &str) -> Option<RequestId> {
        match self.backend.submit_get(url) {
            Some(id) => {
                debug!(%id, url, "tracking GET");
                self.tracked.insert(id, Disposition::Outstanding);
                Some(id)
            }
            None => {
                warn!(url, "GET submission refused");
                None
            }
        }
    }

    /// Submits a PUT operation and tracks the resulting handle.
    ///
    /// # Returns
    ///
    /// The new handle, or `None` if the backend refused the submission.
    pub fn submit_put(&mut self, url: &str, param: &RequestParam) -> Option<RequestId> {
        match self.backend.submit_put(url, param) {
            Some(id) => {
                debug!(%id, url, "tracking PUT");
                self.tracked.insert(id, Disposition::Outstanding);
                Some(id)
            }
            None => {
                warn!(url, "PUT submission refused");
                None
            }
        }
    }

    /// Performs one polling tick over the tracked set.
    ///
    /// Each tracked handle is visited exactly once, against a snapshot of
    /// the set taken at entry, so removals during the pass can neither skip
    /// nor double-visit an entry.
    ///
    /// # Arguments
    ///
    /// * `consumer` - receives each newly `Ready` payload, exactly once per
    ///   handle
    pub fn poll_once<F>(&mut self, mut consumer: F) -> PollOutcome
    where
        F: FnMut(RequestId, Bytes),
    {
        let mut outcome = PollOutcome::default();

        let ids: Vec<RequestId> = self.tracked.keys().copied().collect();
        for id in ids {
            match self.backend.query_state(id) {
                RequestState::Pending | RequestState::AwaitingData => {
                    outcome.in_flight += 1;
                }
                RequestState::Ready => self.on_ready(id, &mut consumer, &mut outcome),
                RequestState::Failed => self.on_failed(id, &mut outcome),
                RequestState::Invalidated => {
                    // Deleted backend-side; drop it this tick and never
                    // query it again.
                    self.tracked.remove(&id);
                    outcome.invalidated += 1;
                    debug!(%id, "handle invalidated");
                }
            }
        }

        outcome
    }

    fn on_ready<F>(&mut self, id: RequestId, consumer: &mut F, outcome: &mut PollOutcome)
    where
        F: FnMut(RequestId, Bytes),
    {
        match self.tracked.get(&id) {
            Some(Disposition::Outstanding) => {}
            Some(_) => {
                // Already consumed or counted; retained awaiting
                // invalidation.
                outcome.retained += 1;
                return;
            }
            None => return,
        }

        match self.backend.fetch_payload(id) {
            Some(payload) => {
                outcome.consumed += 1;
                outcome.bytes_fetched += payload.len() as u64;
                debug!(%id, bytes = payload.len(), "payload consumed");
                consumer(id, payload);
                self.settle(id, Disposition::Consumed);
            }
            None => {
                // Ready without a payload: the backend drained or lost the
                // body; treat as a failure observation.
                warn!(%id, "ready handle yielded no payload");
                outcome.failed += 1;
                self.settle(id, Disposition::FailedSeen);
            }
        }
    }

    fn on_failed(&mut self, id: RequestId, outcome: &mut PollOutcome) {
        match self.tracked.get(&id) {
            Some(Disposition::Outstanding) => {
                outcome.failed += 1;
                debug!(%id, "request failed");
                self.settle(id, Disposition::FailedSeen);
            }
            Some(_) => {
                outcome.retained += 1;
            }
            None => {}
        }
    }

    /// Applies the completion policy to a handle that just went terminal.
    fn settle(&mut self, id: RequestId, disposition: Disposition) {
        match self.policy {
            CompletionPolicy::RemoveOnTerminal => {
                self.tracked.remove(&id);
            }
            CompletionPolicy::RetainUntilInvalidated => {
                self.tracked.insert(id, disposition);
            }
        }
    }
}

impl std::fmt::Debug for RequestTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestTracker")
            .field("policy", &self.policy)
            .field("tracked", &self.tracked.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{RequestState, ScriptedNetwork};

    fn tracker_with(policy: CompletionPolicy) -> (Arc<ScriptedNetwork>, RequestTracker) {
        let network = Arc::new(ScriptedNetwork::new());
        let tracker = RequestTracker::new(network.clone(), policy);
        (network, tracker)
    }

    fn drop_payloads(_id: RequestId, _payload: Bytes) {}

    #[test]
    fn test_refused_submission_adds_no_entry() {
        let (network, mut tracker) = tracker_with(CompletionPolicy::default());
        network.refuse_submissions(true);

        assert_eq!(tracker.submit_get("http://example.com"), None);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_submission_tracks_handle() {
        let (_network, mut tracker) = tracker_with(CompletionPolicy::default());

        let id = tracker.submit_get("http://example.com").unwrap();
        assert!(tracker.contains(id));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_in_flight_handles_stay_tracked() {
        let (network, mut tracker) = tracker_with(CompletionPolicy::default());

        let a = tracker.submit_get("http://example.com/a").unwrap();
        let b = tracker.submit_get("http://example.com/b").unwrap();
        let c = tracker.submit_get("http://example.com/c").unwrap();
        network.set_state(a, RequestState::AwaitingData);
        network.set_state(b, RequestState::AwaitingData);
        network.set_state(c, RequestState::AwaitingData);

        let outcome = tracker.poll_once(drop_payloads);
        assert_eq!(outcome.in_flight, 3);
        assert_eq!(tracker.len(), 3);
    }

    #[test]
    fn test_ready_payload_delivered_with_exact_length() {
        let (network, mut tracker) = tracker_with(CompletionPolicy::default());

        let id = tracker.submit_get("http://example.com").unwrap();
        network.complete(id, &b"exactly seventeen"[..]);

        let mut delivered = Vec::new();
        let outcome = tracker.poll_once(|id, payload| delivered.push((id, payload)));

        assert_eq!(outcome.consumed, 1);
        assert_eq!(outcome.bytes_fetched, 17);
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].0, id);
        assert_eq!(delivered[0].1.len(), 17);
    }

    #[test]
    fn test_invalidated_handle_removed_same_tick() {
        let (network, mut tracker) = tracker_with(CompletionPolicy::default());

        let id = tracker.submit_get("http://example.com").unwrap();
        network.set_state(id, RequestState::Invalidated);

        let outcome = tracker.poll_once(drop_payloads);
        assert_eq!(outcome.invalidated, 1);
        assert!(!tracker.contains(id));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_removal_mid_pass_skips_no_other_handle() {
        // Three handles; the invalidated one is first in iteration order,
        // so the pass must keep visiting the two behind it.
        let (network, mut tracker) = tracker_with(CompletionPolicy::default());

        let a = tracker.submit_get("http://example.com/a").unwrap();
        let b = tracker.submit_get("http://example.com/b").unwrap();
        let c = tracker.submit_get("http://example.com/c").unwrap();
        assert!(a < b && b < c);

        network.set_state(a, RequestState::Invalidated);
        network.complete(b, &b"bb"[..]);
        network.set_state(c, RequestState::AwaitingData);

        let mut delivered = Vec::new();
        let outcome = tracker.poll_once(|id, _| delivered.push(id));

        assert_eq!(outcome.invalidated, 1);
        assert_eq!(outcome.consumed, 1);
        assert_eq!(outcome.in_flight, 1);
        assert_eq!(delivered, vec![b]);
        assert!(!tracker.contains(a));
        assert!(tracker.contains(c));
    }

    #[test]
    fn test_failed_handle_removed_under_default_policy() {
        let (network, mut tracker) = tracker_with(CompletionPolicy::RemoveOnTerminal);

        let id = tracker.submit_get("http://example.com").unwrap();
        network.set_state(id, RequestState::Failed);

        let outcome = tracker.poll_once(drop_payloads);
        assert_eq!(outcome.failed, 1);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_failed_handle_retained_and_counted_once() {
        let (network, mut tracker) = tracker_with(CompletionPolicy::RetainUntilInvalidated);

        let id = tracker.submit_get("http://example.com").unwrap();
        network.set_state(id, RequestState::Failed);

        let first = tracker.poll_once(drop_payloads);
        assert_eq!(first.failed, 1);
        assert!(tracker.contains(id));

        // Still failed backend-side; counted as retained, not failed again.
        let second = tracker.poll_once(drop_payloads);
        assert_eq!(second.failed, 0);
        assert_eq!(second.retained, 1);
        assert!(tracker.contains(id));
    }

    #[test]
    fn test_consumed_handle_never_fetched_twice_when_retained() {
        let (network, mut tracker) = tracker_with(CompletionPolicy::RetainUntilInvalidated);

        let id = tracker.submit_get("http://example.com").unwrap();
        network.complete(id, &b"once"[..]);

        let mut deliveries = 0;
        let first = tracker.poll_once(|_, _| deliveries += 1);
        assert_eq!(first.consumed, 1);
        assert!(tracker.contains(id));

        // Backend still reports Ready (drained); no second delivery.
        let second = tracker.poll_once(|_, _| deliveries += 1);
        assert_eq!(second.consumed, 0);
        assert_eq!(second.retained, 1);
        assert_eq!(deliveries, 1);
    }

    #[test]
    fn test_spec_scenario_three_operations() {
        // Submit 3 → all awaiting → one Ready → one Invalidated, under the
        // source-compatible retention policy.
        let (network, mut tracker) = tracker_with(CompletionPolicy::RetainUntilInvalidated);

        let a = tracker.submit_get("http://example.com/a").unwrap();
        let b = tracker.submit_get("http://example.com/b").unwrap();
        let c = tracker.submit_get("http://example.com/c").unwrap();
        for id in [a, b, c] {
            network.set_state(id, RequestState::AwaitingData);
        }

        let outcome = tracker.poll_once(drop_payloads);
        assert_eq!(outcome.in_flight, 3);
        assert_eq!(tracker.len(), 3);

        network.complete(a, &b"payload-a"[..]);
        let mut delivered = Vec::new();
        let outcome = tracker.poll_once(|id, payload| delivered.push((id, payload.len())));
        assert_eq!(outcome.consumed, 1);
        assert_eq!(delivered, vec![(a, 9)]);
        assert_eq!(tracker.len(), 3);

        network.set_state(b, RequestState::Invalidated);
        let outcome = tracker.poll_once(drop_payloads);
        assert_eq!(outcome.invalidated, 1);
        assert_eq!(tracker.len(), 2);
        assert!(tracker.contains(a)); // consumed, retained per policy
        assert!(tracker.contains(c));
    }

    #[test]
    fn test_spec_scenario_under_default_policy() {
        // Same scenario with the recommended policy: the consumed handle
        // leaves immediately.
        let (network, mut tracker) = tracker_with(CompletionPolicy::RemoveOnTerminal);

        let a = tracker.submit_get("http://example.com/a").unwrap();
        let b = tracker.submit_get("http://example.com/b").unwrap();
        let c = tracker.submit_get("http://example.com/c").unwrap();

        network.complete(a, &b"payload-a"[..]);
        network.set_state(b, RequestState::Invalidated);
        network.set_state(c, RequestState::AwaitingData);

        let outcome = tracker.poll_once(drop_payloads);
        assert_eq!(outcome.consumed, 1);
        assert_eq!(outcome.invalidated, 1);
        assert_eq!(outcome.in_flight, 1);
        assert_eq!(tracker.tracked_ids(), vec![c]);
    }

    #[test]
    fn test_ready_without_payload_counts_as_failure() {
        let (network, mut tracker) = tracker_with(CompletionPolicy::RemoveOnTerminal);

        let id = tracker.submit_get("http://example.com").unwrap();
        network.set_state(id, RequestState::Ready); // no payload staged

        let outcome = tracker.poll_once(drop_payloads);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.consumed, 0);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_put_submission_tracked() {
        let (network, mut tracker) = tracker_with(CompletionPolicy::default());

        let param = RequestParam::new().with_header("accept: application/json");
        let id = tracker.submit_put("http://example.com/put", &param).unwrap();
        assert!(tracker.contains(id));
        assert_eq!(network.put_requests().len(), 1);
    }

    #[test]
    fn test_poll_outcome_display() {
        let outcome = PollOutcome {
            in_flight: 2,
            consumed: 1,
            failed: 0,
            invalidated: 1,
            retained: 0,
            bytes_fetched: 64,
        };
        let text = outcome.to_string();
        assert!(text.contains("2 in flight"));
        assert!(text.contains("1 consumed (64 bytes)"));
        assert!(outcome.has_activity());
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        fn arb_state() -> impl Strategy<Value = RequestState> {
            prop_oneof![
                Just(RequestState::Pending),
                Just(RequestState::AwaitingData),
                Just(RequestState::Ready),
                Just(RequestState::Failed),
                Just(RequestState::Invalidated),
            ]
        }

        proptest! {
            /// Whatever mix of states a pass observes, no handle is skipped:
            /// every Ready handle is delivered, every Invalidated handle is
            /// removed, and everything in flight survives.
            #[test]
            fn poll_visits_every_handle(states in proptest::collection::vec(arb_state(), 3..12)) {
                let (network, mut tracker) =
                    tracker_with(CompletionPolicy::RetainUntilInvalidated);

                let mut ids = Vec::new();
                for (i, state) in states.iter().enumerate() {
                    let id = tracker.submit_get(&format!("http://example.com/{}", i)).unwrap();
                    if *state == RequestState::Ready {
                        network.complete(id, vec![0u8; i + 1]);
                    } else {
                        network.set_state(id, *state);
                    }
                    ids.push(id);
                }

                let mut delivered = Vec::new();
                let outcome = tracker.poll_once(|id, _| delivered.push(id));

                let expect = |want: RequestState| {
                    states.iter().filter(|s| **s == want).count()
                };

                prop_assert_eq!(outcome.consumed, expect(RequestState::Ready));
                prop_assert_eq!(outcome.failed, expect(RequestState::Failed));
                prop_assert_eq!(outcome.invalidated, expect(RequestState::Invalidated));
                prop_assert_eq!(
                    outcome.in_flight,
                    expect(RequestState::Pending) + expect(RequestState::AwaitingData)
                );

                for (id, state) in ids.iter().zip(states.iter()) {
                    if *state == RequestState::Invalidated {
                        prop_assert!(!tracker.contains(*id));
                    } else {
                        prop_assert!(tracker.contains(*id));
                    }
                    if *state == RequestState::Ready {
                        prop_assert!(delivered.contains(id));
                    }
                }
            }

            /// Under the default policy the surviving set is exactly the
            /// in-flight handles.
            #[test]
            fn default_policy_keeps_only_in_flight(
                states in proptest::collection::vec(arb_state(), 3..12),
            ) {
                let (network, mut tracker) =
                    tracker_with(CompletionPolicy::RemoveOnTerminal);

                let mut ids = Vec::new();
                for (i, state) in states.iter().enumerate() {
                    let id = tracker.submit_get(&format!("http://example.com/{}", i)).unwrap();
                    if *state == RequestState::Ready {
                        network.complete(id, vec![0u8; 4]);
                    } else {
                        network.set_state(id, *state);
                    }
                    ids.push(id);
                }

                tracker.poll_once(|_, _| {});

                for (id, state) in ids.iter().zip(states.iter()) {
                    prop_assert_eq!(tracker.contains(*id), state.is_in_flight());
                }
            }
        }
    }
}
