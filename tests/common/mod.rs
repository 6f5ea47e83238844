//! Common test utilities for integration tests.
//!
//! # Example
//!
//! ```ignore
//! use common::{init_tracing, RecordingHandler};
//!
//! init_tracing();
//! let handler = RecordingHandler::new();
//! let registry = HandlerRegistry::new().register_shared("reload", handler.clone());
//! ```

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use packager_connection::dispatch::{RequestHandler, Responder};
use packager_connection::websocket::Sender;
use serde_json::Value;

/// Install a `tracing` subscriber honoring `RUST_LOG`, once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Upper bound for awaiting anything in a test that talks to a real socket.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A notification the handler received.
#[derive(Debug, Clone)]
pub struct NotificationCall {
    pub sender: Sender,
    pub params: Option<Value>,
}

/// Handler that records every call and optionally answers requests.
#[derive(Default)]
pub struct RecordingHandler {
    notifications: Mutex<Vec<NotificationCall>>,
    requests: Mutex<Vec<(Option<Value>, Value)>>,
    reply: Option<Value>,
}

impl RecordingHandler {
    /// Handler that records requests without answering them.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Handler that answers every request with `result`.
    pub fn replying(result: Value) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(result),
            ..Self::default()
        })
    }

    pub fn notifications(&self) -> Vec<NotificationCall> {
        self.notifications.lock().unwrap().clone()
    }

    /// Params and id of each request received.
    pub fn requests(&self) -> Vec<(Option<Value>, Value)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.notifications.lock().unwrap().len() + self.requests.lock().unwrap().len()
    }
}

impl RequestHandler for RecordingHandler {
    fn on_notification(&self, sender: &Sender, params: Option<Value>) {
        self.notifications.lock().unwrap().push(NotificationCall {
            sender: sender.clone(),
            params,
        });
    }

    fn on_request(&self, params: Option<Value>, responder: Responder) {
        self.requests
            .lock()
            .unwrap()
            .push((params, responder.id().clone()));
        if let Some(result) = &self.reply {
            responder.respond(result).unwrap();
        }
    }
}
