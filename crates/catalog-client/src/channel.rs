//! Messaging channel seam.

use async_trait::async_trait;

use crate::error::ChannelError;
use crate::protocol::{Request, Response};

/// The request/response messaging channel this client drives.
///
/// Implementations own the connection state (Open/Faulted); the client never
/// mutates connection internals. It only issues `open` calls through the
/// recovery worker and observes faults via the
/// [`FaultSignal`](crate::recovery::FaultSignal) handle it exposes, which the
/// channel glue raises from its fault callback.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Open (or reopen) the connection.
    async fn open(&self) -> Result<(), ChannelError>;

    /// Close the connection.
    async fn close(&self) -> Result<(), ChannelError>;

    /// Send a request and wait for its response, respecting `request.timeout`.
    ///
    /// A timed-out request fails with [`ChannelError::Timeout`]; cancelling
    /// in-flight work on the remote side is the channel's own responsibility.
    async fn send(&self, request: Request) -> Result<Response, ChannelError>;
}
