//! Inbound envelope validation.
//!
//! An inbound text frame is classified as exactly one of: a valid
//! notification, a valid request, or a [`Rejection`]. Checks run in a fixed
//! order and stop at the first failure, so later fields are never inspected
//! once an earlier required field is wrong.

use std::fmt;

use serde_json::{Map, Value};

use super::{Frame, DEFAULT_TARGET, PROTOCOL_VERSION};

/// Fields every inbound envelope must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeRules {
    /// Protocol version the envelope must carry.
    pub version: u64,
    /// Routing target the envelope must be addressed to.
    pub target: String,
}

impl Default for EnvelopeRules {
    fn default() -> Self {
        Self {
            version: PROTOCOL_VERSION,
            target: DEFAULT_TARGET.to_string(),
        }
    }
}

/// A validated inbound envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Handler key.
    pub action: String,
    /// Correlation id, present only on requests.
    pub id: Option<Value>,
    /// Opaque payload for the handler.
    pub params: Option<Value>,
}

impl Envelope {
    /// Validate a raw frame against `rules`.
    pub fn from_frame(frame: &Frame, rules: &EnvelopeRules) -> Result<Self, Rejection> {
        match frame {
            Frame::Text(text) => Self::parse(text, rules),
            Frame::Binary(_) => Err(Rejection::BinaryFrame),
        }
    }

    /// Parse and validate a text frame body.
    pub fn parse(text: &str, rules: &EnvelopeRules) -> Result<Self, Rejection> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| Rejection::Malformed(e.to_string()))?;
        match value {
            Value::Object(fields) => Self::from_fields(fields, rules),
            _ => Err(Rejection::NotAnObject),
        }
    }

    fn from_fields(mut fields: Map<String, Value>, rules: &EnvelopeRules) -> Result<Self, Rejection> {
        match fields.get("version").and_then(Value::as_u64) {
            Some(version) if version == rules.version => {}
            _ => {
                return Err(Rejection::UnsupportedVersion(
                    fields.get("version").cloned().unwrap_or(Value::Null),
                ))
            }
        }

        match fields.get("target").and_then(Value::as_str) {
            Some(target) if target == rules.target => {}
            other => return Err(Rejection::WrongTarget(other.map(str::to_string))),
        }

        let action = match fields.remove("action") {
            Some(Value::String(action)) => action,
            _ => return Err(Rejection::MissingAction),
        };

        let id = fields.remove("id").filter(|id| !id.is_null());
        let params = fields.remove("params");

        Ok(Self { action, id, params })
    }

    /// Returns true if the envelope expects a reply.
    pub fn is_request(&self) -> bool {
        self.id.is_some()
    }

    pub fn kind(&self) -> EnvelopeKind {
        if self.is_request() {
            EnvelopeKind::Request
        } else {
            EnvelopeKind::Notification
        }
    }
}

/// Classification of a valid envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKind {
    Notification,
    Request,
}

impl EnvelopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvelopeKind::Notification => "notification",
            EnvelopeKind::Request => "request",
        }
    }
}

/// Why an inbound frame was dropped.
///
/// Rejections are diagnostics only. They are never returned to the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// Frame was not a text frame.
    BinaryFrame,
    /// Body was not valid JSON.
    Malformed(String),
    /// Body was valid JSON but not an object.
    NotAnObject,
    /// `version` missing or not the supported value.
    UnsupportedVersion(Value),
    /// `target` missing, null, or not the expected string.
    WrongTarget(Option<String>),
    /// `action` missing, null, or not a string.
    MissingAction,
    /// No handler registered for the action.
    UnknownAction(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::BinaryFrame => write!(f, "binary frame"),
            Rejection::Malformed(msg) => write!(f, "malformed JSON: {}", msg),
            Rejection::NotAnObject => write!(f, "envelope is not a JSON object"),
            Rejection::UnsupportedVersion(version) => {
                write!(f, "unsupported protocol version: {}", version)
            }
            Rejection::WrongTarget(Some(target)) => write!(f, "unexpected target: {}", target),
            Rejection::WrongTarget(None) => write!(f, "missing target"),
            Rejection::MissingAction => write!(f, "missing action"),
            Rejection::UnknownAction(action) => write!(f, "no handler for action: {}", action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(text: &str) -> Result<Envelope, Rejection> {
        Envelope::parse(text, &EnvelopeRules::default())
    }

    #[test]
    fn test_valid_notification() {
        let envelope = parse(r#"{"version":1,"target":"bridge","action":"reload"}"#).unwrap();
        assert_eq!(envelope.action, "reload");
        assert_eq!(envelope.id, None);
        assert_eq!(envelope.params, None);
        assert_eq!(envelope.kind(), EnvelopeKind::Notification);
    }

    #[test]
    fn test_valid_request_with_params() {
        let envelope = parse(
            r#"{"version":1,"target":"bridge","action":"heap","id":"abc","params":{"path":"/tmp"}}"#,
        )
        .unwrap();
        assert!(envelope.is_request());
        assert_eq!(envelope.id, Some(json!("abc")));
        assert_eq!(envelope.params, Some(json!({"path": "/tmp"})));
    }

    #[test]
    fn test_numeric_id_is_request() {
        let envelope = parse(r#"{"version":1,"target":"bridge","action":"a","id":7}"#).unwrap();
        assert_eq!(envelope.id, Some(json!(7)));
        assert_eq!(envelope.kind().as_str(), "request");
    }

    #[test]
    fn test_null_id_is_notification() {
        let envelope = parse(r#"{"version":1,"target":"bridge","action":"a","id":null}"#).unwrap();
        assert!(!envelope.is_request());
    }

    #[test]
    fn test_binary_frame_rejected_before_parsing() {
        let frame = Frame::Binary(br#"{"version":1,"target":"bridge","action":"a"}"#.to_vec());
        assert_eq!(
            Envelope::from_frame(&frame, &EnvelopeRules::default()),
            Err(Rejection::BinaryFrame)
        );
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(parse("{not json"), Err(Rejection::Malformed(_))));
        assert_eq!(parse("[1,2,3]"), Err(Rejection::NotAnObject));
    }

    #[test]
    fn test_version_checks() {
        assert_eq!(
            parse(r#"{"version":2,"target":"bridge","action":"a"}"#),
            Err(Rejection::UnsupportedVersion(json!(2)))
        );
        assert_eq!(
            parse(r#"{"target":"bridge","action":"a"}"#),
            Err(Rejection::UnsupportedVersion(Value::Null))
        );
        assert!(parse(r#"{"version":"1","target":"bridge","action":"a"}"#).is_err());
        assert!(parse(r#"{"version":1.5,"target":"bridge","action":"a"}"#).is_err());
    }

    #[test]
    fn test_target_checks() {
        assert_eq!(
            parse(r#"{"version":1,"action":"a"}"#),
            Err(Rejection::WrongTarget(None))
        );
        assert_eq!(
            parse(r#"{"version":1,"target":null,"action":"a"}"#),
            Err(Rejection::WrongTarget(None))
        );
        assert_eq!(
            parse(r#"{"version":1,"target":"inspector","action":"a"}"#),
            Err(Rejection::WrongTarget(Some("inspector".to_string())))
        );
    }

    #[test]
    fn test_action_checks() {
        assert_eq!(
            parse(r#"{"version":1,"target":"bridge"}"#),
            Err(Rejection::MissingAction)
        );
        assert_eq!(
            parse(r#"{"version":1,"target":"bridge","action":null}"#),
            Err(Rejection::MissingAction)
        );
        assert_eq!(
            parse(r#"{"version":1,"target":"bridge","action":42}"#),
            Err(Rejection::MissingAction)
        );
    }

    #[test]
    fn test_version_checked_before_target() {
        // Both fields are wrong; the first check wins.
        assert!(matches!(
            parse(r#"{"version":3,"target":null}"#),
            Err(Rejection::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_custom_rules() {
        let rules = EnvelopeRules {
            version: 2,
            target: "profiler".to_string(),
        };
        let envelope =
            Envelope::parse(r#"{"version":2,"target":"profiler","action":"poke"}"#, &rules).unwrap();
        assert_eq!(envelope.action, "poke");
    }

    #[test]
    fn test_rejection_display() {
        assert_eq!(Rejection::BinaryFrame.to_string(), "binary frame");
        assert_eq!(Rejection::WrongTarget(None).to_string(), "missing target");
        assert_eq!(
            Rejection::UnknownAction("reload".to_string()).to_string(),
            "no handler for action: reload"
        );
    }
}
