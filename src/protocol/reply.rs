//! Outbound reply frames.

use serde::Serialize;
use serde_json::{Map, Value};

use super::PROTOCOL_VERSION;

/// Shape of the reply frames a [`Responder`](crate::dispatch::Responder) sends.
///
/// The default produces
/// `{"version":1,"id":<id>,"result":<payload>}` and
/// `{"version":1,"id":<id>,"error":<payload>}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyFormat {
    pub version: u64,
    pub id_field: String,
    pub result_field: String,
    pub error_field: String,
}

impl Default for ReplyFormat {
    fn default() -> Self {
        Self {
            version: PROTOCOL_VERSION,
            id_field: "id".to_string(),
            result_field: "result".to_string(),
            error_field: "error".to_string(),
        }
    }
}

impl ReplyFormat {
    /// Set the protocol version written into replies.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Encode a reply for request `id`.
    pub fn encode<T: Serialize + ?Sized>(
        &self,
        id: &Value,
        outcome: ReplyOutcome,
        payload: &T,
    ) -> Result<String, serde_json::Error> {
        let payload = serde_json::to_value(payload)?;
        let field = match outcome {
            ReplyOutcome::Success => &self.result_field,
            ReplyOutcome::Error => &self.error_field,
        };

        let mut reply = Map::new();
        reply.insert("version".to_string(), Value::from(self.version));
        reply.insert(self.id_field.clone(), id.clone());
        reply.insert(field.clone(), payload);
        serde_json::to_string(&Value::Object(reply))
    }
}

/// Which terminal reply is being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    Success,
    Error,
}
