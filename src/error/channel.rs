//! Errors surfaced to callers of the channel's sender.

use thiserror::Error;

use super::category::ErrorCategory;

/// Outcome of a failed send through a [`Sender`](crate::websocket::Sender).
///
/// Sends never queue across a reconnect: while no socket is live they fail
/// immediately with [`ChannelError::NotConnected`]. A live socket buffers a
/// bounded number of frames; beyond that sends fail with
/// [`ChannelError::QueueFull`].
#[derive(Debug, Error)]
pub enum ChannelError {
    /// No live connection right now; the channel may reconnect later.
    #[error("Not connected to the packager")]
    NotConnected,

    /// The live socket is not draining its outbound queue fast enough.
    #[error("Outbound queue full")]
    QueueFull,

    /// The channel was closed and will not reconnect.
    #[error("Channel closed")]
    Closed,

    /// A reply payload could not be encoded as JSON.
    #[error("Failed to encode message: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ChannelError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ChannelError::NotConnected | ChannelError::QueueFull | ChannelError::Closed => {
                ErrorCategory::Lifecycle
            }
            ChannelError::Serialize(_) => ErrorCategory::Serialization,
        }
    }

    /// Returns true if the same send may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ChannelError::NotConnected | ChannelError::QueueFull)
    }
}
