//! Reconnecting channel.
//!
//! Owns the transport lifecycle and keeps one logical connection alive
//! across physical socket drops. A single background task drives the state
//! machine; state transitions are the only place reconnect timers are armed.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::backoff::Backoff;
use super::sender::Sender;
use super::state::ConnectionState;
use crate::config::{ReconnectConfig, DEFAULT_OUTBOUND_CAPACITY};
use crate::error::{ChannelError, ChannelResult, TransportError};
use crate::protocol::Frame;
use crate::traits::{Connection, MessageListener, Transport};

/// Upper bound for the close handshake of a live socket during shutdown.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Lifecycle of the driving task.
enum Task {
    NotStarted,
    Running(JoinHandle<()>),
    /// A `close` call took the handle and is joining it.
    Stopping,
}

/// A logical connection that reconnects on failure until closed.
///
/// ```ignore
/// let channel = ReconnectingChannel::new(url, transport, listener)
///     .with_reconnect(ReconnectConfig::default());
/// channel.start()?;
///
/// let sender = channel.sender();
/// let mut state = channel.state();
/// state.wait_for(|s| s.is_connected()).await?;
/// sender.send(r#"{"version":1,"id":1,"result":null}"#)?;
///
/// channel.close().await;
/// ```
pub struct ReconnectingChannel {
    url: String,
    reconnect: ReconnectConfig,
    connect_timeout: Duration,
    transport: Arc<dyn Transport>,
    listener: Arc<dyn MessageListener>,
    sender: Sender,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    shutdown_tx: watch::Sender<bool>,
    task: Mutex<Task>,
    outbound_capacity: usize,
}

impl ReconnectingChannel {
    pub fn new(
        url: impl Into<String>,
        transport: Arc<dyn Transport>,
        listener: Arc<dyn MessageListener>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            url: url.into(),
            reconnect: ReconnectConfig::default(),
            connect_timeout: Duration::from_secs(10),
            transport,
            listener,
            sender: Sender::new(),
            state_tx: Arc::new(state_tx),
            shutdown_tx,
            task: Mutex::new(Task::NotStarted),
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
        }
    }

    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Number of outbound frames that may wait for a live socket before
    /// [`Sender::send`] fails with [`ChannelError::QueueFull`]. At least 1.
    pub fn with_outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = capacity.max(1);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Logical sender bound to this channel, valid across reconnects.
    pub fn sender(&self) -> Sender {
        self.sender.clone()
    }

    /// Subscribe to connection state changes.
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.state_tx.borrow().clone()
    }

    /// Spawn the driving task on the current tokio runtime.
    ///
    /// Calling `start` on a running channel does nothing, so there is never
    /// more than one connection per channel. Fails with
    /// [`ChannelError::Closed`] after [`close`](Self::close).
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start(&self) -> ChannelResult<()> {
        let mut task = self.task();
        if *self.shutdown_tx.borrow() {
            return Err(ChannelError::Closed);
        }
        if !matches!(*task, Task::NotStarted) {
            debug!(url = %self.url, "channel already started");
            return Ok(());
        }

        let driver = Driver {
            url: self.url.clone(),
            backoff: Backoff::new(self.reconnect.clone()),
            connect_timeout: self.connect_timeout,
            transport: self.transport.clone(),
            listener: self.listener.clone(),
            sender: self.sender.clone(),
            state_tx: self.state_tx.clone(),
            outbound_capacity: self.outbound_capacity,
        };
        let shutdown = self.shutdown_tx.subscribe();

        info!(url = %self.url, "starting packager channel");
        *task = Task::Running(tokio::spawn(driver.run(shutdown)));
        Ok(())
    }

    /// Close the channel for good.
    ///
    /// Cancels a pending reconnect delay or connect attempt, closes the live
    /// socket if any, and waits for the driving task to stop. No listener
    /// callback runs after this returns, for every concurrent caller.
    pub async fn close(&self) {
        let previous = {
            let mut task = self.task();
            self.shutdown_tx.send_replace(true);
            self.sender.close();
            match std::mem::replace(&mut *task, Task::Stopping) {
                Task::NotStarted => {
                    *task = Task::NotStarted;
                    Task::NotStarted
                }
                other => other,
            }
        };

        match previous {
            Task::Running(handle) => {
                if let Err(e) = handle.await {
                    warn!(url = %self.url, "channel task ended abnormally: {}", e);
                }
                self.state_tx.send_replace(ConnectionState::Closed);
            }
            Task::Stopping => {
                // The driver publishes Closed after its last listener callback.
                let mut state = self.state();
                let _ = state.wait_for(ConnectionState::is_closed).await;
            }
            Task::NotStarted => {
                self.state_tx.send_replace(ConnectionState::Closed);
            }
        }
    }

    fn task(&self) -> MutexGuard<'_, Task> {
        self.task.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for ReconnectingChannel {
    fn drop(&mut self) {
        self.shutdown_tx.send_replace(true);
        self.sender.close();
    }
}

/// How a connected session ended.
#[derive(Debug, PartialEq, Eq)]
enum Exit {
    Dropped,
    Shutdown,
}

/// State owned by the driving task.
struct Driver {
    url: String,
    backoff: Backoff,
    connect_timeout: Duration,
    transport: Arc<dyn Transport>,
    listener: Arc<dyn MessageListener>,
    sender: Sender,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    outbound_capacity: usize,
}

impl Driver {
    async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut attempt: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);
            self.set_state(ConnectionState::Connecting { attempt });

            let result = tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut shutdown) => break,
                result = self.connect() => result,
            };

            match result {
                Ok(connection) => {
                    info!(url = %self.url, attempt, "connected to packager");
                    attempt = 0;
                    self.backoff.reset();
                    if self.serve(connection, &mut shutdown).await == Exit::Shutdown {
                        break;
                    }
                }
                Err(e) => {
                    warn!(
                        url = %self.url,
                        attempt,
                        category = %e.category(),
                        code = e.error_code(),
                        "connect failed: {}",
                        e
                    );
                    self.set_state(ConnectionState::Disconnected);
                }
            }

            let delay = self.backoff.next_delay();
            info!(
                url = %self.url,
                delay_ms = delay.as_millis() as u64,
                "reconnecting after delay"
            );

            tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut shutdown) => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.sender.close();
        self.set_state(ConnectionState::Closed);
        debug!(url = %self.url, "channel task stopped");
    }

    async fn connect(&self) -> Result<Connection, TransportError> {
        match tokio::time::timeout(self.connect_timeout, self.transport.connect(&self.url)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                millis: self.connect_timeout.as_millis() as u64,
            }),
        }
    }

    /// Pump one live connection until it drops or shutdown is requested.
    async fn serve(&self, connection: Connection, shutdown: &mut watch::Receiver<bool>) -> Exit {
        let Connection {
            mut sink,
            mut stream,
        } = connection;
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<Frame>(self.outbound_capacity);

        self.sender.attach(outbound_tx);
        self.set_state(ConnectionState::Connected);
        self.listener.on_connected();

        let exit = loop {
            tokio::select! {
                biased;
                _ = wait_for_shutdown(shutdown) => {
                    debug!(url = %self.url, "closing live connection");
                    match tokio::time::timeout(CLOSE_TIMEOUT, sink.close()).await {
                        Ok(Err(e)) => debug!("close handshake failed: {}", e),
                        Err(_) => debug!("close handshake timed out"),
                        Ok(Ok(())) => {}
                    }
                    break Exit::Shutdown;
                }
                Some(frame) = outbound_rx.recv() => {
                    if let Err(e) = sink.send(frame).await {
                        warn!(url = %self.url, "send failed, dropping connection: {}", e);
                        break Exit::Dropped;
                    }
                }
                item = stream.next() => match item {
                    Some(Ok(frame)) => self.listener.on_message(&self.sender, frame),
                    Some(Err(e)) => {
                        warn!(url = %self.url, code = e.error_code(), "connection error: {}", e);
                        break Exit::Dropped;
                    }
                    None => {
                        info!(url = %self.url, "connection closed");
                        break Exit::Dropped;
                    }
                },
            }
        };

        self.sender.detach();
        self.listener.on_disconnected();
        if exit == Exit::Dropped {
            self.set_state(ConnectionState::Disconnected);
        }
        exit
    }

    fn set_state(&self, state: ConnectionState) {
        debug!(url = %self.url, %state, "channel state");
        self.state_tx.send_replace(state);
    }
}

/// Resolves once shutdown has been requested or the channel was dropped.
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
