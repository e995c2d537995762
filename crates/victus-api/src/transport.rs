// Shared transport configuration for building reqwest::Client instances.
//
// The REST catalog client and the SSE subscriptions share one client so
// timeouts and the gateway subscription key are applied uniformly.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::Error;

/// Header the API gateway reads the subscription key from.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Query parameter carrying the subscription key on event-stream URLs.
pub const SUBSCRIPTION_KEY_PARAM: &str = "subscription-key";

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout for REST calls. Event streams are long-lived and
    /// only bounded by the connect timeout.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub subscription_key: Option<SecretString>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            subscription_key: None,
        }
    }
}

impl TransportConfig {
    /// Build the `reqwest::Client` used for REST requests.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        self.builder()?
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))
    }

    /// Build a client without a total request timeout, for event streams.
    pub fn build_stream_client(&self) -> Result<reqwest::Client, Error> {
        self.builder()?
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))
    }

    /// Append the subscription key to an event-stream URL, if configured.
    pub fn stream_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        if let Some(ref key) = self.subscription_key {
            url.query_pairs_mut()
                .append_pair(SUBSCRIPTION_KEY_PARAM, key.expose_secret());
        }
        url
    }

    fn builder(&self) -> Result<reqwest::ClientBuilder, Error> {
        let mut headers = HeaderMap::new();
        if let Some(ref key) = self.subscription_key {
            let mut value = HeaderValue::from_str(key.expose_secret())
                .map_err(|e| Error::ClientBuild(format!("invalid subscription key: {e}")))?;
            value.set_sensitive(true);
            headers.insert(SUBSCRIPTION_KEY_HEADER, value);
        }

        Ok(reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .user_agent(concat!("victus/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers))
    }
}
