//! Trait abstractions at the crate's seams.
//!
//! - [`Transport`] - opens physical WebSocket connections
//! - [`MessageListener`] - receives inbound frames from the reconnecting channel

pub mod listener;
pub mod transport;

pub use listener::MessageListener;
pub use transport::{Connection, FrameSink, FrameStream, Transport};
