//! Client configuration.
//!
//! Use the builder methods to customize the defaults.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use packager_connection::config::{ClientConfig, PackagerUrl, ReconnectConfig};
//!
//! let url = PackagerUrl::new("localhost:8081")
//!     .with_device("Pixel 7")
//!     .with_app("com.example.app")
//!     .build();
//!
//! let config = ClientConfig::new(url)
//!     .with_connect_timeout(Duration::from_secs(5))
//!     .with_reconnect(ReconnectConfig::default().with_max_delay(Duration::from_secs(10)));
//! assert_eq!(config.target, "bridge");
//! ```

use std::time::Duration;

use crate::protocol::{EnvelopeRules, ReplyFormat, DEFAULT_TARGET, PROTOCOL_VERSION};

/// Default packager host.
pub const DEFAULT_PACKAGER_HOST: &str = "localhost:8081";

/// Outbound frames that may wait for the live socket.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 100;

/// Reconnect backoff parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectConfig {
    /// Delay before the first reconnect attempt, and after any successful connect.
    pub initial_delay: Duration,
    /// Upper bound for the delay between attempts.
    pub max_delay: Duration,
    /// Growth factor applied after each failed attempt.
    pub multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl ReconnectConfig {
    /// Constant delay, no growth.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            max_delay: delay,
            multiplier: 1.0,
        }
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the growth factor. Values below 1.0 are treated as 1.0.
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }
}

/// Configuration for a [`PackagerClient`](crate::client::PackagerClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket URL of the packager message endpoint.
    pub url: String,
    /// Routing target inbound envelopes must carry.
    pub target: String,
    /// Protocol version inbound envelopes must carry.
    pub protocol_version: u64,
    /// Upper bound for a single connect attempt.
    pub connect_timeout: Duration,
    pub reconnect: ReconnectConfig,
    /// Shape of reply frames sent by responders.
    pub reply: ReplyFormat,
    /// Bound of the per-connection outbound queue.
    pub outbound_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(PackagerUrl::new(DEFAULT_PACKAGER_HOST).build())
    }
}

impl ClientConfig {
    /// Create a configuration for `url` with default protocol settings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            target: DEFAULT_TARGET.to_string(),
            protocol_version: PROTOCOL_VERSION,
            connect_timeout: Duration::from_secs(10),
            reconnect: ReconnectConfig::default(),
            reply: ReplyFormat::default(),
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn with_protocol_version(mut self, version: u64) -> Self {
        self.protocol_version = version;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    pub fn with_reply_format(mut self, reply: ReplyFormat) -> Self {
        self.reply = reply;
        self
    }

    pub fn with_outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = capacity;
        self
    }

    /// Validation rules derived from this configuration.
    pub fn envelope_rules(&self) -> EnvelopeRules {
        EnvelopeRules {
            version: self.protocol_version,
            target: self.target.clone(),
        }
    }
}

/// Builder for the packager's `/message` endpoint URL.
///
/// Produces `ws://<host>/message?device=<device>&app=<app>&clientid=<id>`,
/// omitting query parameters that were not set except `clientid`, which
/// defaults to a random UUID.
#[derive(Debug, Clone)]
pub struct PackagerUrl {
    host: String,
    secure: bool,
    device: Option<String>,
    app: Option<String>,
    client_id: String,
}

impl PackagerUrl {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            secure: false,
            device: None,
            app: None,
            client_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Use `wss://` instead of `ws://`.
    pub fn with_tls(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn with_app(mut self, app: impl Into<String>) -> Self {
        self.app = Some(app.into());
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn build(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        let mut query = Vec::with_capacity(3);
        if let Some(device) = &self.device {
            query.push(format!("device={}", urlencoding::encode(device)));
        }
        if let Some(app) = &self.app {
            query.push(format!("app={}", urlencoding::encode(app)));
        }
        query.push(format!("clientid={}", urlencoding::encode(&self.client_id)));

        format!("{}://{}/message?{}", scheme, self.host, query.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconnect_config_default() {
        let config = ReconnectConfig::default();
        assert_eq!(config.initial_delay, Duration::from_secs(2));
        assert_eq!(config.max_delay, Duration::from_secs(30));
        assert_eq!(config.multiplier, 2.0);
    }

    #[test]
    fn test_reconnect_config_fixed() {
        let config = ReconnectConfig::fixed(Duration::from_millis(500));
        assert_eq!(config.initial_delay, config.max_delay);
        assert_eq!(config.multiplier, 1.0);
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert!(config.url.starts_with("ws://localhost:8081/message?clientid="));
        assert_eq!(config.target, "bridge");
        assert_eq!(config.protocol_version, 1);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.reply, ReplyFormat::default());
        assert_eq!(config.outbound_capacity, DEFAULT_OUTBOUND_CAPACITY);
    }

    #[test]
    fn test_client_config_builders() {
        let config = ClientConfig::new("ws://10.0.2.2:8081/message")
            .with_target("profiler")
            .with_protocol_version(2)
            .with_connect_timeout(Duration::from_millis(100));

        let rules = config.envelope_rules();
        assert_eq!(rules.target, "profiler");
        assert_eq!(rules.version, 2);
        assert_eq!(config.connect_timeout, Duration::from_millis(100));
    }

    #[test]
    fn test_packager_url_encodes_query_values() {
        let url = PackagerUrl::new("10.0.2.2:8081")
            .with_device("Pixel 7 (emulator)")
            .with_app("com.example.app")
            .with_client_id("abc-123")
            .build();

        assert_eq!(
            url,
            "ws://10.0.2.2:8081/message?device=Pixel%207%20%28emulator%29&app=com.example.app&clientid=abc-123"
        );
    }

    #[test]
    fn test_packager_url_tls_and_generated_client_id() {
        let builder = PackagerUrl::new("packager.local").with_tls(true);
        let url = builder.build();

        assert!(url.starts_with("wss://packager.local/message?clientid="));
        assert_eq!(builder.client_id().len(), 36);
        assert_ne!(
            PackagerUrl::new("a").client_id(),
            PackagerUrl::new("a").client_id()
        );
    }
}
