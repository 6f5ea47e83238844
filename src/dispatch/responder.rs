//! Request responder.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::ChannelResult;
use crate::protocol::{ReplyFormat, ReplyOutcome};
use crate::websocket::Sender;

/// Sends the single reply to one request.
///
/// Bound to the request's `id` and to the channel's logical [`Sender`]. Both
/// terminal operations consume the responder, so at most one reply can be
/// sent through it. Dropping it without replying leaves the request
/// unanswered.
///
/// A responder may be moved to another task and used later; the reply goes
/// out on whatever socket the channel has at that moment, or fails with
/// [`ChannelError::NotConnected`](crate::error::ChannelError::NotConnected).
#[derive(Debug)]
pub struct Responder {
    id: Value,
    sender: Sender,
    format: Arc<ReplyFormat>,
}

impl Responder {
    pub fn new(id: Value, sender: Sender, format: Arc<ReplyFormat>) -> Self {
        Self { id, sender, format }
    }

    /// The request id this responder answers.
    pub fn id(&self) -> &Value {
        &self.id
    }

    /// Reply with a success payload.
    pub fn respond<T: Serialize>(self, result: T) -> ChannelResult<()> {
        self.reply(ReplyOutcome::Success, &result)
    }

    /// Reply with an error payload.
    pub fn error<T: Serialize>(self, error: T) -> ChannelResult<()> {
        self.reply(ReplyOutcome::Error, &error)
    }

    fn reply<T: Serialize>(self, outcome: ReplyOutcome, payload: &T) -> ChannelResult<()> {
        let text = self.format.encode(&self.id, outcome, payload)?;
        self.sender.send(text)
    }
}
