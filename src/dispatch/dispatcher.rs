//! Envelope dispatcher.
//!
//! Validates each inbound frame and routes it to the handler registered for
//! its action. Every check runs before any handler is touched; a frame that
//! fails one is dropped and logged at debug level, never reported back to the
//! transport.

use std::sync::Arc;

use tracing::{debug, trace};

use super::handler::RequestHandler;
use super::registry::HandlerRegistry;
use super::responder::Responder;
use crate::protocol::{Envelope, EnvelopeRules, Frame, Rejection, ReplyFormat};
use crate::traits::MessageListener;
use crate::websocket::Sender;

/// Routes validated envelopes to registered handlers.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: HandlerRegistry,
    rules: EnvelopeRules,
    reply: Arc<ReplyFormat>,
}

impl Dispatcher {
    /// Dispatcher with the default protocol version, target and reply format.
    pub fn new(registry: HandlerRegistry) -> Self {
        Self {
            registry,
            rules: EnvelopeRules::default(),
            reply: Arc::new(ReplyFormat::default()),
        }
    }

    pub fn with_rules(mut self, rules: EnvelopeRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_reply_format(mut self, reply: ReplyFormat) -> Self {
        self.reply = Arc::new(reply);
        self
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn rules(&self) -> &EnvelopeRules {
        &self.rules
    }

    /// Validate and dispatch one inbound frame.
    ///
    /// Invokes exactly one handler operation for a valid envelope and none
    /// otherwise. Handler panics are not caught.
    pub fn on_message(&self, sender: &Sender, frame: Frame) {
        let (envelope, handler) = match self.route(&frame) {
            Ok(routed) => routed,
            Err(rejection) => {
                debug!(%rejection, "dropping inbound frame");
                return;
            }
        };

        trace!(action = %envelope.action, kind = envelope.kind().as_str(), "dispatching");
        let Envelope { id, params, .. } = envelope;
        match id {
            Some(id) => {
                let responder = Responder::new(id, sender.clone(), self.reply.clone());
                handler.on_request(params, responder);
            }
            None => handler.on_notification(sender, params),
        }
    }

    /// Validate a frame and find its handler without invoking it.
    pub fn route(&self, frame: &Frame) -> Result<(Envelope, Arc<dyn RequestHandler>), Rejection> {
        let envelope = Envelope::from_frame(frame, &self.rules)?;
        match self.registry.get(&envelope.action) {
            Some(handler) => Ok((envelope, handler.clone())),
            None => Err(Rejection::UnknownAction(envelope.action)),
        }
    }
}

impl MessageListener for Dispatcher {
    fn on_message(&self, sender: &Sender, frame: Frame) {
        Dispatcher::on_message(self, sender, frame)
    }

    fn on_connected(&self) {
        debug!(actions = self.registry.len(), "dispatcher attached to live connection");
    }
}
