// Error taxonomy shared by every layer of the adapter.
//
// Not-found on plain lookups is never an error — those surface as
// `Ok(None)`. `NotFound` is reserved for operations whose contract
// requires the record to exist (e.g. patching by id).

use thiserror::Error;

/// Errors that can occur in the adapter or its backend client.
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    /// Network-level failure (DNS, connection refused, timeout, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-2xx status.
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The backend's response body could not be deserialized.
    #[error("failed to deserialize backend response: {0}")]
    Deserialization(String),

    /// A record returned by the backend does not fit the expected model
    /// shape (missing field, malformed timestamp).
    #[error("record mapping failed: {0}")]
    Mapping(String),

    /// The operation requires a record that does not exist.
    #[error("record not found")]
    NotFound,

    /// The adapter does not implement this optional operation.
    #[error("operation `{0}` is not implemented by this adapter")]
    Unimplemented(&'static str),
}

impl AdapterError {
    /// Wrap a reqwest error as a network failure.
    pub fn network(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }

    /// The HTTP status code, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this is the required-existence failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Returns `true` if this is a network-level error.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Unified result type for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;
