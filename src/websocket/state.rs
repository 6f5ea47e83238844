//! Connection state published by the reconnecting channel.

use std::fmt;

/// Lifecycle state of a [`ReconnectingChannel`](super::ReconnectingChannel).
///
/// ```text
/// Disconnected -> Connecting -> Connected -> Disconnected -> ...
///                     |                          ^
///                     +---------- failure -------+
/// any state -- close() --> Closed
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// No live socket. Initial state, and the state between attempts.
    Disconnected,
    /// A connect attempt is in progress. `attempt` counts consecutive
    /// attempts since the last successful connection, starting at 1.
    Connecting { attempt: u32 },
    /// Socket is live.
    Connected,
    /// Terminal; no further reconnects.
    Closed,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, ConnectionState::Closed)
    }

    /// The current attempt number, if connecting.
    pub fn attempt(&self) -> Option<u32> {
        match self {
            ConnectionState::Connecting { attempt } => Some(*attempt),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting { attempt } => write!(f, "connecting (attempt {})", attempt),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Closed => write!(f, "closed"),
        }
    }
}
