//! Packager connection - a reconnecting WebSocket client for the packager's
//! message endpoint.
//!
//! Inbound frames are JSON envelopes carrying a protocol version, a routing
//! target, an action name, an optional request id and opaque params. Valid
//! envelopes are routed to the [`dispatch::RequestHandler`] registered for
//! their action; requests get a [`dispatch::Responder`] for their single
//! reply. The underlying socket is reopened with bounded backoff whenever it
//! drops, behind a [`websocket::Sender`] handle that stays valid throughout.

pub mod adapters;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod traits;
pub mod websocket;

pub use client::PackagerClient;
pub use config::{ClientConfig, PackagerUrl, ReconnectConfig};
pub use dispatch::{Dispatcher, HandlerRegistry, RequestHandler, Responder};
pub use error::{ChannelError, ChannelResult, TransportError};
pub use protocol::{Envelope, Frame, Rejection};
pub use websocket::{ConnectionState, ReconnectingChannel, Sender};
