//! Reconnecting WebSocket channel.
//!
//! This module keeps a logical connection to the packager alive across
//! physical socket drops. It reconnects with bounded exponential backoff and
//! hands out a [`Sender`] that stays valid across reconnects.

pub mod backoff;
pub mod channel;
pub mod sender;
pub mod state;

pub use backoff::Backoff;
pub use channel::ReconnectingChannel;
pub use sender::Sender;
pub use state::ConnectionState;
