//! Error types for the packager connection.
//!
//! - [`TransportError`]: socket failures, absorbed by the reconnecting channel
//! - [`ChannelError`]: send failures returned to handlers and responders
//! - [`ErrorCategory`]: coarse classification for retry decisions
//!
//! Malformed or unroutable inbound frames are not errors; they are dropped
//! and described by [`Rejection`](crate::protocol::Rejection).

mod category;
mod channel;
mod transport;

pub use category::ErrorCategory;
pub use channel::ChannelError;
pub use transport::TransportError;

/// Result of a channel send.
pub type ChannelResult<T> = Result<T, ChannelError>;

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_lifecycle_errors_share_category() {
        assert_eq!(ChannelError::NotConnected.category(), ErrorCategory::Lifecycle);
        assert_eq!(ChannelError::Closed.category(), ErrorCategory::Lifecycle);
    }

    #[test]
    fn test_channel_result_propagates_with_question_mark() {
        fn encode() -> ChannelResult<String> {
            let value: serde_json::Value = serde_json::from_str("{oops")?;
            Ok(value.to_string())
        }

        assert!(matches!(encode(), Err(ChannelError::Serialize(_))));
    }
}
