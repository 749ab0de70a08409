//! Core network types: request identifiers, states, and parameters.

use thiserror::Error;

/// Opaque identifier for an in-flight network operation.
///
/// Issued by the backend on submission and unique per outstanding operation.
/// The value `0` is reserved: backends report a refused submission as `None`
/// from `submit_*`, never as a zero id.
///
/// # Example
///
/// ```
/// use netgauge::network::RequestId;
///
/// let id = RequestId::new(42);
/// assert_eq!(id.value(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// Creates a request id from its raw value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw id value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "req#{}", self.0)
    }
}

/// Externally-reported state of a submitted operation.
///
/// The backend is the source of truth; callers observe these states through
/// non-blocking queries on each polling tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestState {
    /// Just submitted, the transfer has not started.
    Pending,

    /// Accepted and in flight, no data available yet.
    AwaitingData,

    /// Response data is available for one-time retrieval.
    Ready,

    /// Terminal: the operation failed and will never produce data.
    Failed,

    /// The backend has discarded the handle; no further queries are
    /// meaningful.
    Invalidated,
}

impl RequestState {
    /// Returns true while the operation may still produce data.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Pending | Self::AwaitingData)
    }

    /// Returns true for states the operation cannot leave on its own
    /// (`Failed` or `Invalidated`).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed | Self::Invalidated)
    }
}

impl std::fmt::Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::AwaitingData => "awaiting-data",
            Self::Ready => "ready",
            Self::Failed => "failed",
            Self::Invalidated => "invalidated",
        };
        write!(f, "{}", name)
    }
}

/// Parameters for a PUT submission: header lines plus an optional body.
///
/// Headers are raw `name: value` lines, matching what the host network API
/// accepts verbatim.
///
/// # Example
///
/// ```
/// use netgauge::network::RequestParam;
///
/// let param = RequestParam::new()
///     .with_header("accept: application/json")
///     .with_body(br#"{"key1":"value1"}"#.to_vec());
/// assert_eq!(param.headers().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParam {
    headers: Vec<String>,
    body: Option<Vec<u8>>,
}

impl RequestParam {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a raw `name: value` header line.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.headers.push(header.into());
        self
    }

    /// Sets the request body.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets a JSON body, serializing the given value.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::BodyEncoding`] if serialization fails.
    pub fn with_json(mut self, value: &serde_json::Value) -> Result<Self, NetworkError> {
        let body = serde_json::to_vec(value).map_err(|e| NetworkError::BodyEncoding(e.to_string()))?;
        self.body = Some(body);
        Ok(self)
    }

    /// Returns the header lines.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Returns the body, if any.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

/// Errors raised while constructing or configuring a network backend.
///
/// Per-operation failures are never surfaced as errors: they are observed as
/// [`RequestState::Failed`] on the handle, or as a `None` submission result.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// The backend's runtime could not be created.
    #[error("Failed to create runtime: {0}")]
    Runtime(#[from] std::io::Error),

    /// A request body could not be encoded.
    #[error("Failed to encode request body: {0}")]
    BodyEncoding(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_value_roundtrip() {
        let id = RequestId::new(7);
        assert_eq!(id.value(), 7);
        assert_eq!(format!("{}", id), "req#7");
    }

    #[test]
    fn test_request_id_ordering_and_hash() {
        use std::collections::HashSet;

        assert!(RequestId::new(1) < RequestId::new(2));

        let mut set = HashSet::new();
        set.insert(RequestId::new(1));
        set.insert(RequestId::new(1));
        set.insert(RequestId::new(2));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_request_state_in_flight() {
        assert!(RequestState::Pending.is_in_flight());
        assert!(RequestState::AwaitingData.is_in_flight());
        assert!(!RequestState::Ready.is_in_flight());
        assert!(!RequestState::Failed.is_in_flight());
        assert!(!RequestState::Invalidated.is_in_flight());
    }

    #[test]
    fn test_request_state_terminal() {
        assert!(RequestState::Failed.is_terminal());
        assert!(RequestState::Invalidated.is_terminal());
        assert!(!RequestState::Ready.is_terminal());
        assert!(!RequestState::Pending.is_terminal());
    }

    #[test]
    fn test_request_state_display() {
        assert_eq!(format!("{}", RequestState::AwaitingData), "awaiting-data");
        assert_eq!(format!("{}", RequestState::Invalidated), "invalidated");
    }

    #[test]
    fn test_request_param_builders() {
        let param = RequestParam::new()
            .with_header("accept: application/json")
            .with_header("x-test: 1")
            .with_body(vec![1, 2, 3]);

        assert_eq!(param.headers().len(), 2);
        assert_eq!(param.body(), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn test_request_param_json_body() {
        let value = serde_json::json!({"key1": "value1", "key2": "value2"});
        let param = RequestParam::new().with_json(&value).unwrap();

        let body = param.body().unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(parsed["key1"], "value1");
    }

    #[test]
    fn test_request_param_default_is_empty() {
        let param = RequestParam::default();
        assert!(param.headers().is_empty());
        assert!(param.body().is_none());
    }
}
