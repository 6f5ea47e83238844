//! Transport-level error types.
//!
//! These are produced by [`Transport`](crate::traits::Transport)
//! implementations and absorbed by the reconnecting channel, which logs them
//! and schedules a reconnect.

use thiserror::Error;

use super::category::ErrorCategory;

/// Failures of the underlying socket.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Opening the connection failed.
    #[error("Connection to {url} failed: {message}")]
    ConnectFailed { url: String, message: String },

    /// Opening the connection took longer than the configured timeout.
    #[error("Connection attempt timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// Writing a frame failed.
    #[error("Send failed: {0}")]
    Send(String),

    /// Reading from the socket failed.
    #[error("Receive failed: {0}")]
    Receive(String),

    /// The peer closed the connection.
    #[error("Connection closed by peer{}", close_reason(.reason))]
    ClosedByPeer { reason: Option<String> },
}

fn close_reason(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(": {}", reason),
        None => String::new(),
    }
}

impl TransportError {
    /// All transport failures are transient from the channel's point of view.
    pub fn is_retryable(&self) -> bool {
        true
    }

    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Transport
    }

    /// Short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            TransportError::ConnectFailed { .. } => "E_WS_CONNECT",
            TransportError::Timeout { .. } => "E_WS_TIMEOUT",
            TransportError::Send(_) => "E_WS_SEND",
            TransportError::Receive(_) => "E_WS_RECV",
            TransportError::ClosedByPeer { .. } => "E_WS_CLOSED",
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;

        match err {
            WsError::ConnectionClosed | WsError::AlreadyClosed => {
                TransportError::ClosedByPeer { reason: None }
            }
            other => TransportError::Receive(other.to_string()),
        }
    }
}
