//! Callbacks from the reconnecting channel.

use crate::protocol::Frame;
use crate::websocket::Sender;

/// Receives inbound frames and connection transitions.
///
/// All methods are called synchronously from the channel's driving task, in
/// the order the events happen. Implementations must not block; long work
/// should be handed off with `tokio::spawn`.
pub trait MessageListener: Send + Sync {
    /// An inbound frame arrived. `sender` is the channel's logical sender,
    /// not the physical socket.
    fn on_message(&self, sender: &Sender, frame: Frame);

    /// A connection was established.
    fn on_connected(&self) {}

    /// A live connection was lost or closed.
    fn on_disconnected(&self) {}
}
