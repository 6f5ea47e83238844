//! Mock transport for testing.
//!
//! Every successful [`MockTransport::connect`] hands the test a [`MockPeer`]
//! playing the server side of that connection. Failures and hanging connect
//! attempts can be scripted ahead of time.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use futures_util::{sink, stream};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::config::DEFAULT_OUTBOUND_CAPACITY;
use crate::error::TransportError;
use crate::protocol::Frame;
use crate::traits::{Connection, Transport};
use crate::websocket::Sender;

/// Scripted outcome for an upcoming connect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Fail,
    Hang,
}

struct Inner {
    attempts: Mutex<Vec<Instant>>,
    script: Mutex<VecDeque<Script>>,
    peers_tx: mpsc::UnboundedSender<MockPeer>,
    peers_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<MockPeer>>,
}

/// In-memory [`Transport`] whose connections are driven by the test.
///
/// Clones share state, so a test keeps one clone and hands another to the
/// channel under test.
///
/// # Example
///
/// ```ignore
/// let transport = MockTransport::new();
/// transport.fail_next(2);
///
/// let channel = ReconnectingChannel::new(url, Arc::new(transport.clone()), listener);
/// channel.start()?;
///
/// let mut peer = transport.next_peer().await.unwrap();
/// assert_eq!(transport.connect_attempts(), 3);
/// peer.send_text(r#"{"version":1,"target":"bridge","action":"reload"}"#);
/// ```
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Inner>,
}

impl MockTransport {
    pub fn new() -> Self {
        let (peers_tx, peers_rx) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(Inner {
                attempts: Mutex::new(Vec::new()),
                script: Mutex::new(VecDeque::new()),
                peers_tx,
                peers_rx: tokio::sync::Mutex::new(peers_rx),
            }),
        }
    }

    /// Fail the next `count` connect attempts with
    /// [`TransportError::ConnectFailed`].
    pub fn fail_next(&self, count: usize) {
        self.push_script(Script::Fail, count);
    }

    /// Make the next `count` connect attempts never complete.
    pub fn hang_next(&self, count: usize) {
        self.push_script(Script::Hang, count);
    }

    /// Number of connect attempts so far, successful or not.
    pub fn connect_attempts(&self) -> usize {
        lock(&self.inner.attempts).len()
    }

    /// When each connect attempt started, on the tokio clock.
    pub fn attempt_times(&self) -> Vec<Instant> {
        lock(&self.inner.attempts).clone()
    }

    /// Wait for the next successful connection and take its server side.
    pub async fn next_peer(&self) -> Option<MockPeer> {
        self.inner.peers_rx.lock().await.recv().await
    }

    fn push_script(&self, script: Script, count: usize) {
        lock(&self.inner.script).extend(std::iter::repeat(script).take(count));
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("connect_attempts", &self.connect_attempts())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self, url: &str) -> Result<Connection, TransportError> {
        lock(&self.inner.attempts).push(Instant::now());
        let script = lock(&self.inner.script).pop_front();

        match script {
            Some(Script::Fail) => {
                return Err(TransportError::ConnectFailed {
                    url: url.to_string(),
                    message: "scripted failure".to_string(),
                })
            }
            Some(Script::Hang) => std::future::pending::<()>().await,
            None => {}
        }

        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        let stream = stream::unfold(inbound_rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        let sink = sink::unfold(outbound_tx, |tx, frame: Frame| async move {
            tx.send(frame)
                .map_err(|_| TransportError::Send("mock peer is gone".to_string()))?;
            Ok::<_, TransportError>(tx)
        });

        let peer = MockPeer {
            inbound: inbound_tx,
            outbound: outbound_rx,
        };
        if self.inner.peers_tx.send(peer).is_err() {
            return Err(TransportError::ConnectFailed {
                url: url.to_string(),
                message: "mock transport dropped".to_string(),
            });
        }

        Ok(Connection::new(Box::pin(sink), Box::pin(stream)))
    }
}

/// Server side of one mock connection.
///
/// Dropping the peer, or calling [`disconnect`](MockPeer::disconnect), ends
/// the client's inbound stream the way a closed socket would.
#[derive(Debug)]
pub struct MockPeer {
    inbound: mpsc::UnboundedSender<Result<Frame, TransportError>>,
    outbound: mpsc::UnboundedReceiver<Frame>,
}

impl MockPeer {
    /// Deliver a text frame to the client.
    pub fn send_text(&self, text: impl Into<String>) {
        let _ = self.inbound.send(Ok(Frame::Text(text.into())));
    }

    /// Deliver a binary frame to the client.
    pub fn send_binary(&self, data: impl Into<Vec<u8>>) {
        let _ = self.inbound.send(Ok(Frame::Binary(data.into())));
    }

    /// Next frame the client sent on this connection.
    ///
    /// Returns `None` once the client side is gone and every frame has been
    /// read.
    pub async fn recv_frame(&mut self) -> Option<Frame> {
        self.outbound.recv().await
    }

    /// Next frame the client sent, if one is already waiting.
    pub fn try_recv_frame(&mut self) -> Option<Frame> {
        self.outbound.try_recv().ok()
    }

    /// Next text frame the client sent, decoded as JSON.
    pub async fn recv_json(&mut self) -> Option<serde_json::Value> {
        match self.recv_frame().await? {
            Frame::Text(text) => serde_json::from_str(&text).ok(),
            Frame::Binary(_) => None,
        }
    }

    /// Returns true while the client still holds this connection.
    pub fn is_open(&self) -> bool {
        !self.inbound.is_closed()
    }

    /// Fail the connection with `error`.
    pub fn fail(self, error: TransportError) {
        let _ = self.inbound.send(Err(error));
    }

    /// Close the connection cleanly.
    pub fn disconnect(self) {}
}

/// A connected [`Sender`] whose frames land in the returned receiver, which
/// buffers up to [`DEFAULT_OUTBOUND_CAPACITY`] frames.
///
/// Dropping the receiver makes further sends fail with
/// [`ChannelError::NotConnected`](crate::error::ChannelError::NotConnected).
pub fn loopback_sender() -> (Sender, mpsc::Receiver<Frame>) {
    let (tx, rx) = mpsc::channel(DEFAULT_OUTBOUND_CAPACITY);
    let sender = Sender::new();
    sender.attach(tx);
    (sender, rx)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{SinkExt, StreamExt};

    #[tokio::test]
    async fn test_connect_hands_out_peer() {
        let transport = MockTransport::new();
        let Connection {
            mut sink,
            mut stream,
        } = transport.connect("ws://mock").await.unwrap();
        let mut peer = transport.next_peer().await.unwrap();

        peer.send_text("hello");
        assert_eq!(stream.next().await.unwrap().unwrap(), Frame::from("hello"));

        sink.send(Frame::from("reply")).await.unwrap();
        assert_eq!(peer.recv_frame().await, Some(Frame::from("reply")));
        assert_eq!(transport.connect_attempts(), 1);
    }

    #[tokio::test]
    async fn test_disconnect_ends_stream() {
        let transport = MockTransport::new();
        let mut connection = transport.connect("ws://mock").await.unwrap();
        transport.next_peer().await.unwrap().disconnect();

        assert!(connection.stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_fail_next_is_consumed_in_order() {
        let transport = MockTransport::new();
        transport.fail_next(1);

        let first = transport.connect("ws://mock").await;
        assert!(matches!(first, Err(TransportError::ConnectFailed { .. })));
        assert!(transport.connect("ws://mock").await.is_ok());
        assert_eq!(transport.connect_attempts(), 2);
    }

    #[tokio::test]
    async fn test_peer_fail_yields_error() {
        let transport = MockTransport::new();
        let mut connection = transport.connect("ws://mock").await.unwrap();
        transport
            .next_peer()
            .await
            .unwrap()
            .fail(TransportError::Receive("reset".to_string()));

        let item = connection.stream.next().await.unwrap();
        assert_eq!(item, Err(TransportError::Receive("reset".to_string())));
    }

    #[test]
    fn test_loopback_sender_is_connected() {
        let (sender, mut rx) = loopback_sender();
        assert!(sender.is_connected());
        sender.send("x").unwrap();
        assert_eq!(rx.try_recv().unwrap(), Frame::from("x"));
    }
}
