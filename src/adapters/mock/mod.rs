//! Mock implementations for testing.
//!
//! Enables testing the channel and the dispatcher without network access.
//!
//! # Available Mocks
//!
//! - [`MockTransport`] - transport whose connections are driven by the test
//! - [`MockPeer`] - server side of one mock connection
//! - [`loopback_sender`] - connected sender that records outbound frames

pub mod transport;

pub use transport::{loopback_sender, MockPeer, MockTransport};
