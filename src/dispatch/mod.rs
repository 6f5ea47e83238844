//! Envelope dispatch.
//!
//! - [`Dispatcher`] - validates inbound frames and routes them by action
//! - [`HandlerRegistry`] - action name to handler mapping
//! - [`RequestHandler`] - notification and request operations for one action
//! - [`Responder`] - sends the single reply to a request

pub mod dispatcher;
pub mod handler;
pub mod registry;
pub mod responder;

pub use dispatcher::Dispatcher;
pub use handler::{
    notification_handler, request_handler, NotificationFn, RequestFn, RequestHandler,
    REQUEST_NOT_SUPPORTED,
};
pub use registry::HandlerRegistry;
pub use responder::Responder;
