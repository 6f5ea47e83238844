//! Packager message protocol.
//!
//! Inbound envelopes (notifications and requests) and outbound reply frames.
//!
//! ```text
//! { "version": 1, "target": "bridge", "action": "reload" }                 notification
//! { "version": 1, "target": "bridge", "action": "heap", "id": 3, ... }     request
//! { "version": 1, "id": 3, "result": ... }                                 reply
//! ```

pub mod envelope;
pub mod frame;
pub mod reply;

pub use envelope::{Envelope, EnvelopeKind, EnvelopeRules, Rejection};
pub use frame::Frame;
pub use reply::{ReplyFormat, ReplyOutcome};

/// The only protocol version this client speaks.
pub const PROTOCOL_VERSION: u64 = 1;

/// Routing target for envelopes addressed to this client.
pub const DEFAULT_TARGET: &str = "bridge";
