//! Handler abstraction.

use serde_json::Value;
use tracing::debug;

use super::responder::Responder;
use crate::websocket::Sender;

/// Error payload sent when a request reaches a handler that only serves
/// notifications.
pub const REQUEST_NOT_SUPPORTED: &str = "Request is not supported";

/// Handles envelopes for one action.
///
/// The dispatcher calls [`on_notification`](RequestHandler::on_notification)
/// for envelopes without an `id` and [`on_request`](RequestHandler::on_request)
/// for envelopes with one. Implement only the operation your action uses:
///
/// - a notification sent to a request-only handler is ignored;
/// - a request sent to a notification-only handler is answered with the
///   error payload [`REQUEST_NOT_SUPPORTED`].
///
/// Both operations run on the channel's driving task and must not block.
///
/// # Example
///
/// ```
/// use packager_connection::dispatch::{RequestHandler, Responder};
/// use serde_json::{json, Value};
///
/// struct Ping;
///
/// impl RequestHandler for Ping {
///     fn on_request(&self, _params: Option<Value>, responder: Responder) {
///         let _ = responder.respond(json!("pong"));
///     }
/// }
/// ```
pub trait RequestHandler: Send + Sync {
    /// Handle a fire-and-forget envelope.
    fn on_notification(&self, sender: &Sender, params: Option<Value>) {
        let _ = (sender, params);
        debug!("notification ignored by request-only handler");
    }

    /// Handle a request. The handler owns the obligation to reply through
    /// `responder` exactly once, now or later.
    fn on_request(&self, params: Option<Value>, responder: Responder) {
        let _ = params;
        debug!(id = %responder.id(), "request sent to notification-only handler");
        if let Err(e) = responder.error(REQUEST_NOT_SUPPORTED) {
            debug!("could not reject unsupported request: {}", e);
        }
    }
}

/// Notification-only handler built from a closure.
pub struct NotificationFn<F> {
    callback: F,
}

impl<F> RequestHandler for NotificationFn<F>
where
    F: Fn(&Sender, Option<Value>) + Send + Sync,
{
    fn on_notification(&self, sender: &Sender, params: Option<Value>) {
        (self.callback)(sender, params)
    }
}

/// Request-only handler built from a closure.
pub struct RequestFn<F> {
    callback: F,
}

impl<F> RequestHandler for RequestFn<F>
where
    F: Fn(Option<Value>, Responder) + Send + Sync,
{
    fn on_request(&self, params: Option<Value>, responder: Responder) {
        (self.callback)(params, responder)
    }
}

/// Wrap a closure as a notification-only handler.
///
/// ```
/// use packager_connection::dispatch::{notification_handler, HandlerRegistry};
///
/// let registry = HandlerRegistry::new()
///     .register("reload", notification_handler(|_sender, _params| {
///         println!("reload requested");
///     }));
/// assert!(registry.contains("reload"));
/// ```
pub fn notification_handler<F>(callback: F) -> NotificationFn<F>
where
    F: Fn(&Sender, Option<Value>) + Send + Sync,
{
    NotificationFn { callback }
}

/// Wrap a closure as a request-only handler.
pub fn request_handler<F>(callback: F) -> RequestFn<F>
where
    F: Fn(Option<Value>, Responder) + Send + Sync,
{
    RequestFn { callback }
}
