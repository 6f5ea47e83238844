//! Packager client.
//!
//! Wires a [`ClientConfig`], a [`HandlerRegistry`] and a [`Transport`] into
//! one reconnecting connection whose inbound frames are dispatched to the
//! registered handlers.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::adapters::TungsteniteTransport;
use crate::config::ClientConfig;
use crate::dispatch::{Dispatcher, HandlerRegistry};
use crate::error::ChannelResult;
use crate::protocol::Frame;
use crate::traits::Transport;
use crate::websocket::{ConnectionState, ReconnectingChannel, Sender};

/// Client connection to the packager's message endpoint.
///
/// # Example
///
/// ```no_run
/// use packager_connection::config::ClientConfig;
/// use packager_connection::dispatch::{notification_handler, HandlerRegistry};
/// use packager_connection::PackagerClient;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = HandlerRegistry::new()
///     .register("reload", notification_handler(|_sender, _params| {
///         println!("reload");
///     }));
///
/// let client = PackagerClient::new(ClientConfig::default(), registry);
/// client.start()?;
/// // ...
/// client.close().await;
/// # Ok(())
/// # }
/// ```
pub struct PackagerClient {
    dispatcher: Arc<Dispatcher>,
    channel: ReconnectingChannel,
}

impl PackagerClient {
    /// Client that connects with tokio-tungstenite.
    pub fn new(config: ClientConfig, registry: HandlerRegistry) -> Self {
        Self::with_transport(config, registry, Arc::new(TungsteniteTransport::new()))
    }

    /// Client that opens connections through `transport`.
    pub fn with_transport(
        config: ClientConfig,
        registry: HandlerRegistry,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let dispatcher = Arc::new(
            Dispatcher::new(registry)
                .with_rules(config.envelope_rules())
                .with_reply_format(config.reply.clone()),
        );
        let channel = ReconnectingChannel::new(config.url, transport, dispatcher.clone())
            .with_reconnect(config.reconnect)
            .with_connect_timeout(config.connect_timeout)
            .with_outbound_capacity(config.outbound_capacity);

        Self {
            dispatcher,
            channel,
        }
    }

    /// Start connecting in the background.
    ///
    /// See [`ReconnectingChannel::start`].
    pub fn start(&self) -> ChannelResult<()> {
        self.channel.start()
    }

    /// Close the connection and stop reconnecting.
    pub async fn close(&self) {
        info!(url = %self.channel.url(), "closing packager client");
        self.channel.close().await;
    }

    /// Dispatch one frame as if it had arrived on the connection.
    pub fn on_message(&self, frame: Frame) {
        self.dispatcher.on_message(&self.channel.sender(), frame);
    }

    pub fn sender(&self) -> Sender {
        self.channel.sender()
    }

    /// Subscribe to connection state changes.
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.channel.state()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.channel.connection_state()
    }

    pub fn url(&self) -> &str {
        self.channel.url()
    }
}

impl std::fmt::Debug for PackagerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackagerClient")
            .field("url", &self.channel.url())
            .field("state", &self.connection_state())
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockTransport;
    use crate::dispatch::request_handler;
    use crate::error::ChannelError;
    use serde_json::json;
    use std::sync::Mutex;

    fn client(transport: &MockTransport) -> PackagerClient {
        let registry = HandlerRegistry::new().register(
            "ping",
            request_handler(|params, responder| {
                let _ = responder.respond(params);
            }),
        );
        PackagerClient::with_transport(
            ClientConfig::new("ws://mock/message"),
            registry,
            Arc::new(transport.clone()),
        )
    }

    #[tokio::test]
    async fn test_request_round_trip_over_mock() {
        let transport = MockTransport::new();
        let client = client(&transport);
        client.start().unwrap();

        let mut peer = transport.next_peer().await.unwrap();
        peer.send_text(r#"{"version":1,"target":"bridge","action":"ping","id":5,"params":"x"}"#);

        let reply = peer.recv_json().await.unwrap();
        assert_eq!(reply, json!({"version": 1, "id": 5, "result": "x"}));

        client.close().await;
        assert_eq!(client.connection_state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_on_message_before_connect_cannot_reply() {
        let transport = MockTransport::new();
        let replies: Arc<Mutex<Vec<ChannelResult<()>>>> = Arc::default();
        let recorded = replies.clone();
        let registry = HandlerRegistry::new().register(
            "ping",
            request_handler(move |_, responder| {
                recorded.lock().unwrap().push(responder.respond("pong"));
            }),
        );
        let client = PackagerClient::with_transport(
            ClientConfig::new("ws://mock/message"),
            registry,
            Arc::new(transport.clone()),
        );

        client.on_message(Frame::from(
            r#"{"version":1,"target":"bridge","action":"ping","id":1}"#,
        ));

        let replies = replies.lock().unwrap();
        assert_eq!(replies.len(), 1);
        assert!(matches!(replies[0], Err(ChannelError::NotConnected)));
        assert_eq!(transport.connect_attempts(), 0);
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_config_target_applies_to_dispatch() {
        let transport = MockTransport::new();
        let registry = HandlerRegistry::new().register(
            "ping",
            request_handler(|_, responder| {
                let _ = responder.respond("pong");
            }),
        );
        let client = PackagerClient::with_transport(
            ClientConfig::new("ws://mock/message").with_target("inspector"),
            registry,
            Arc::new(transport.clone()),
        );
        client.start().unwrap();

        let mut peer = transport.next_peer().await.unwrap();
        peer.send_text(r#"{"version":1,"target":"bridge","action":"ping","id":1}"#);
        peer.send_text(r#"{"version":1,"target":"inspector","action":"ping","id":2}"#);

        let reply = peer.recv_json().await.unwrap();
        assert_eq!(reply["id"], 2);

        client.close().await;
    }
}
