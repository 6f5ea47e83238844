//! Error category classification.

use std::fmt;

/// High-level categorization of connection errors.
///
/// Protocol violations are not errors in this crate (they are dropped as
/// [`Rejection`](crate::protocol::Rejection)s), so there is no protocol
/// category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Socket-level failures: connect, read, write, peer close.
    /// Transient; the channel reconnects on its own.
    Transport,

    /// The channel is not in a state that allows the operation
    /// (not connected yet, or closed).
    Lifecycle,

    /// A reply payload could not be encoded.
    Serialization,
}

impl ErrorCategory {
    /// Returns true if retrying the same operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Transport | ErrorCategory::Lifecycle)
    }

    /// Short label for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Transport => "transport",
            ErrorCategory::Lifecycle => "lifecycle",
            ErrorCategory::Serialization => "serialization",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
