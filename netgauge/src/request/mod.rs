//! Request tracking across polling ticks.
//!
//! A gauge submits operations through its [`RequestTracker`] and drives them
//! to completion from the host's per-frame update callback. The tracker owns
//! only the set of outstanding handles; the network backend remains the
//! source of truth for each handle's state.
//!
//! # Polling Model
//!
//! One call to [`RequestTracker::poll_once`] per tick visits every tracked
//! handle exactly once:
//!
//! - in-flight handles are left alone;
//! - a `Ready` handle yields its payload to the consumer, exactly once;
//! - a `Failed` handle is noted (there are no retries);
//! - an `Invalidated` handle is removed the same tick.
//!
//! What happens to consumed and failed handles afterwards is governed by
//! [`CompletionPolicy`].
//!
//! # Example
//!
//! ```ignore
//! use netgauge::request::{CompletionPolicy, RequestTracker};
//!
//! let mut tracker = RequestTracker::new(backend, CompletionPolicy::default());
//! tracker.submit_get("https://picsum.photos/500");
//!
//! // Each frame:
//! let outcome = tracker.poll_once(|id, payload| {
//!     println!("{} delivered {} bytes", id, payload.len());
//! });
//! ```

mod policy;
mod tracker;

pub use policy::CompletionPolicy;
pub use tracker::{PollOutcome, RequestTracker};
