//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`TungsteniteTransport`] - WebSocket transport using tokio-tungstenite
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockTransport`] - scripted connections driven by the test
//! - [`mock::loopback_sender`] - connected sender recording outbound frames

pub mod mock;
pub mod tungstenite_ws;

pub use mock::{MockPeer, MockTransport};
pub use tungstenite_ws::TungsteniteTransport;
