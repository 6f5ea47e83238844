//! Tungstenite-based WebSocket transport.
//!
//! Opens real WebSocket connections with tokio-tungstenite and adapts the
//! socket to the [`Frame`]-level [`Connection`] the channel consumes.

use async_trait::async_trait;
use futures_util::{future, SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use crate::error::TransportError;
use crate::protocol::Frame;
use crate::traits::{Connection, Transport};

/// [`Transport`] backed by tokio-tungstenite.
///
/// Ping and pong frames are answered by tungstenite and never surface as
/// [`Frame`]s. A close frame from the peer ends the connection with
/// [`TransportError::ClosedByPeer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteTransport;

impl TungsteniteTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for TungsteniteTransport {
    async fn connect(&self, url: &str) -> Result<Connection, TransportError> {
        let (socket, response) =
            connect_async(url)
                .await
                .map_err(|e| TransportError::ConnectFailed {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
        debug!(url, status = %response.status(), "websocket handshake complete");

        let (sink, stream) = socket.split();

        let sink = sink
            .sink_map_err(|e| TransportError::Send(e.to_string()))
            .with(|frame: Frame| future::ready(Ok::<_, TransportError>(Message::from(frame))));

        let stream = stream.filter_map(|item| future::ready(inbound_frame(item)));

        Ok(Connection::new(Box::pin(sink), Box::pin(stream)))
    }
}

/// Map one tungstenite read to a channel item. Control frames yield `None`.
fn inbound_frame(
    item: Result<Message, tokio_tungstenite::tungstenite::Error>,
) -> Option<Result<Frame, TransportError>> {
    match item {
        Ok(Message::Text(text)) => Some(Ok(Frame::Text(text))),
        Ok(Message::Binary(data)) => Some(Ok(Frame::Binary(data))),
        Ok(Message::Close(close)) => {
            let reason = close
                .map(|frame| frame.reason.into_owned())
                .filter(|reason| !reason.is_empty());
            Some(Err(TransportError::ClosedByPeer { reason }))
        }
        Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => None,
        Err(e) => Some(Err(TransportError::from(e))),
    }
}
