//! Transport trait abstraction.
//!
//! The reconnecting channel never touches a socket directly. It asks a
//! [`Transport`] for a fresh [`Connection`] on every attempt, which enables
//! dependency injection and mocking in tests.

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{Sink, Stream};

use crate::error::TransportError;
use crate::protocol::Frame;

/// Outbound half of a connection.
pub type FrameSink = Pin<Box<dyn Sink<Frame, Error = TransportError> + Send>>;

/// Inbound half of a connection.
///
/// The stream ending, or yielding an error, means the connection is gone.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<Frame, TransportError>> + Send>>;

/// One live physical connection, split into its two halves.
pub struct Connection {
    pub sink: FrameSink,
    pub stream: FrameStream,
}

impl Connection {
    pub fn new(sink: FrameSink, stream: FrameStream) -> Self {
        Self { sink, stream }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

/// Opens WebSocket connections.
///
/// # Example
///
/// ```ignore
/// use packager_connection::traits::Transport;
///
/// async fn can_reach<T: Transport>(transport: &T) -> bool {
///     transport.connect("ws://localhost:8081/message").await.is_ok()
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a new connection to `url`.
    async fn connect(&self, url: &str) -> Result<Connection, TransportError>;
}
