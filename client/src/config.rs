//! Client configuration and construction options.

use std::sync::Arc;
use std::time::Duration;

use push_register::{Credentials, Endpoints};

use crate::backoff::Backoff;
use crate::heartbeat::HeartbeatConfig;

/// MCS server address (TLS, binary framing).
pub const MTALK_SERVER: &str = "mtalk.google.com:5228";

pub(crate) const DEFAULT_EVENT_CAPACITY: usize = 50;
pub(crate) const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(30);
pub(crate) const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(60);
pub(crate) const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Firebase project coordinates for the receiving app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Web API key (sent as `x-goog-api-key`)
    pub api_key: String,
    /// Firebase project id
    pub project_id: String,
    /// Firebase app id
    pub app_id: String,
    /// Application VAPID key; the shared FCM server key is used when unset
    pub vapid_key: Option<String>,
}

/// Construction-time options; `Default` gives production behavior.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Previously persisted credentials; `None` forces a fresh registration
    pub credentials: Option<Credentials>,
    /// Persistent ids already received, replayed to the server at login
    pub received_persistent_ids: Vec<String>,
    /// HTTP client used for the registration endpoints; `None` builds one
    /// with a 30 s request timeout
    pub http: Option<reqwest::Client>,
    /// TLS configuration for the MCS connection; defaults to web PKI roots
    /// with TLS 1.3 as the floor
    pub tls: Option<Arc<rustls::ClientConfig>>,
    /// Reconnect backoff timer
    pub backoff: Backoff,
    /// Heartbeat configuration
    pub heartbeat: HeartbeatConfig,
    /// Whether failures are retried; when false the client exits on the
    /// first error instead
    pub retry: bool,
    /// Event bus capacity; producers block while the bus is full
    pub event_capacity: usize,
    /// Combined TCP connect + TLS handshake timeout
    pub dial_timeout: Duration,
    /// TCP keep-alive interval on the MCS connection; zero disables it
    pub keep_alive: Duration,
    /// Registration endpoint set
    pub endpoints: Endpoints,
    /// MCS server address
    pub mcs_server: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            credentials: None,
            received_persistent_ids: Vec::new(),
            http: None,
            tls: None,
            backoff: Backoff::default(),
            heartbeat: HeartbeatConfig::default(),
            retry: true,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            dial_timeout: DEFAULT_DIAL_TIMEOUT,
            keep_alive: DEFAULT_KEEP_ALIVE,
            endpoints: Endpoints::default(),
            mcs_server: MTALK_SERVER.to_string(),
        }
    }
}
