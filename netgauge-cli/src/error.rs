//! CLI error type.

use std::fmt;

use netgauge::network::NetworkError;
use netgauge::store::StoreError;

/// Errors surfaced to the terminal with a non-zero exit code.
#[derive(Debug)]
pub enum CliError {
    /// Configuration problem (bad key, unparseable value, load failure).
    Config(String),

    /// The network backend could not be constructed.
    Network(NetworkError),

    /// Payload store failure.
    Store(StoreError),

    /// Signal-handler installation failed.
    Signal(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Network(e) => write!(f, "Network error: {}", e),
            CliError::Store(e) => write!(f, "Store error: {}", e),
            CliError::Signal(msg) => write!(f, "Failed to install Ctrl-C handler: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Network(e) => Some(e),
            CliError::Store(e) => Some(e),
            CliError::Config(_) | CliError::Signal(_) => None,
        }
    }
}

impl From<NetworkError> for CliError {
    fn from(e: NetworkError) -> Self {
        CliError::Network(e)
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}
