//! Error types for the catalog client.

use thiserror::Error;

/// Channel-level failures reported by the messaging transport.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// No response arrived within the request timeout.
    #[error("request timed out")]
    Timeout,

    /// The connection is closed or faulted.
    #[error("channel closed")]
    Closed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced to callers of the RPC operations.
///
/// None of these are retried at this layer; connection-level faults are
/// handled below it by the recovery worker and show up here only as
/// [`ClientError::Timeout`] or [`ClientError::BackendUnavailable`] during an
/// outage window.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A required request argument was missing or empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// No backend is configured to understand the requested message type, or
    /// it is offline.
    #[error("no backend available for the requested message type")]
    BackendUnavailable,

    /// Application-level failure reported by the backend, code and message
    /// preserved verbatim.
    #[error("backend error {code}: {message}")]
    Backend { code: u32, message: String },

    /// The response did not match any expected variant.
    #[error("protocol violation: unexpected response shape")]
    ProtocolViolation,

    /// No response within the configured duration.
    #[error("request timed out")]
    Timeout,

    /// Transport failure other than a timeout.
    #[error("channel error: {0}")]
    Channel(ChannelError),

    /// Payload could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),
}

impl From<ChannelError> for ClientError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::Timeout => ClientError::Timeout,
            other => ClientError::Channel(other),
        }
    }
}
