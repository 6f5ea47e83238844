//! Logical sender handle.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::error::{ChannelError, ChannelResult};
use crate::protocol::Frame;

/// Where outbound frames currently go.
enum Link {
    Connected(mpsc::Sender<Frame>),
    Disconnected,
    Closed,
}

/// Cloneable handle for sending text frames through a reconnecting channel.
///
/// The handle refers to the channel, not to one physical socket: it stays
/// valid across reconnects. While no socket is live, [`send`](Sender::send)
/// fails immediately with [`ChannelError::NotConnected`]; nothing is queued
/// for a later connection. After the channel is closed it fails with
/// [`ChannelError::Closed`]. If the live socket has fallen behind by the
/// channel's outbound capacity, it fails with [`ChannelError::QueueFull`].
///
/// Sending never blocks and may be called from any thread, including from
/// inside a handler that is reacting to an inbound frame.
#[derive(Clone)]
pub struct Sender {
    link: Arc<Mutex<Link>>,
}

impl Sender {
    pub(crate) fn new() -> Self {
        Self {
            link: Arc::new(Mutex::new(Link::Disconnected)),
        }
    }

    fn link(&self) -> MutexGuard<'_, Link> {
        // The lock is never held across user code, so a poisoned lock still
        // holds a consistent value.
        self.link.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Route outbound frames to a freshly connected socket.
    pub(crate) fn attach(&self, outbound: mpsc::Sender<Frame>) {
        let mut link = self.link();
        if !matches!(*link, Link::Closed) {
            *link = Link::Connected(outbound);
        }
    }

    /// The socket is gone; fail sends until the next attach.
    pub(crate) fn detach(&self) {
        let mut link = self.link();
        if !matches!(*link, Link::Closed) {
            *link = Link::Disconnected;
        }
    }

    /// Fail all further sends with [`ChannelError::Closed`].
    pub(crate) fn close(&self) {
        *self.link() = Link::Closed;
    }

    /// Queue a text frame on the live connection.
    pub fn send(&self, text: impl Into<String>) -> ChannelResult<()> {
        match &*self.link() {
            Link::Connected(outbound) => match outbound.try_send(Frame::Text(text.into())) {
                Ok(()) => Ok(()),
                Err(TrySendError::Full(_)) => Err(ChannelError::QueueFull),
                Err(TrySendError::Closed(_)) => Err(ChannelError::NotConnected),
            },
            Link::Disconnected => Err(ChannelError::NotConnected),
            Link::Closed => Err(ChannelError::Closed),
        }
    }

    /// Serialize `value` as JSON and send it as a text frame.
    pub fn send_json<T: Serialize + ?Sized>(&self, value: &T) -> ChannelResult<()> {
        let text = serde_json::to_string(value)?;
        self.send(text)
    }

    /// Returns true if a socket is currently attached.
    pub fn is_connected(&self) -> bool {
        match &*self.link() {
            Link::Connected(outbound) => !outbound.is_closed(),
            _ => false,
        }
    }

    /// Returns true if both handles refer to the same channel.
    pub fn same_channel(&self, other: &Sender) -> bool {
        Arc::ptr_eq(&self.link, &other.link)
    }
}

impl fmt::Debug for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.link() {
            Link::Connected(_) => "connected",
            Link::Disconnected => "disconnected",
            Link::Closed => "closed",
        };
        f.debug_struct("Sender").field("link", &state).finish()
    }
}
