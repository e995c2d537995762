// ── Runtime catalog configuration ──
//
// Describes where the catalog lives and how the store should behave.
// Built by the CLI from a config profile; core never reads config files.

use std::time::Duration;

use secrecy::SecretString;
use victus_api::{ReconnectConfig, TransportConfig};

/// Default REST base URL of the catalog backend.
pub const DEFAULT_API_URL: &str = "http://localhost:8081/uco-challenge/api/v1";

/// Configuration for one catalog store instance.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// REST base URL (e.g. `https://gateway.example.com/uco-challenge/api/v1`).
    pub api_url: String,
    /// Event-stream base URL. Falls back to `api_url` when unset.
    pub stream_url: Option<String>,
    /// API gateway subscription key.
    pub subscription_key: Option<SecretString>,
    /// Per-request timeout for REST calls.
    pub timeout: Duration,
    /// Backoff policy for event-stream reconnects.
    pub reconnect: ReconnectConfig,
    /// Delay before retrying a failed hydration while degraded.
    pub retry_interval: Duration,
    /// Merge mutation results into the cache before the server event arrives.
    pub optimistic_updates: bool,
    /// Page size requested when listing residential complexes. `None`
    /// lets the server pick.
    pub page_size: Option<u32>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            stream_url: None,
            subscription_key: None,
            timeout: Duration::from_secs(30),
            reconnect: ReconnectConfig::default(),
            retry_interval: Duration::from_secs(5),
            optimistic_updates: true,
            page_size: None,
        }
    }
}

impl CatalogConfig {
    pub fn stream_base(&self) -> &str {
        self.stream_url.as_deref().unwrap_or(&self.api_url)
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: self.timeout,
            subscription_key: self.subscription_key.clone(),
            ..TransportConfig::default()
        }
    }
}
