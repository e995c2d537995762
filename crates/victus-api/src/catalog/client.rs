// Async HTTP client for the catalog REST API.
//
// Collection endpoints: GET/POST {base}/{resource}
// Item endpoints:       PUT/DELETE {base}/{resource}/{id}
// Event streams:        GET {stream_base}/{resource}/stream

use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::types::{ListFilter, Page, Resource, unwrap_entity};
use crate::Error;
use crate::sse::{ReconnectConfig, SseSubscription};
use crate::transport::TransportConfig;

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the catalog API.
///
/// Cheap to clone: `reqwest::Client` is internally reference-counted.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    stream_http: reqwest::Client,
    transport: TransportConfig,
    base_url: Url,
    stream_base_url: Url,
}

impl CatalogClient {
    /// Build a client for the given REST and stream base URLs.
    pub fn new(base_url: &str, stream_base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            stream_http: transport.build_stream_client()?,
            transport: transport.clone(),
            base_url: Self::normalize_base_url(base_url)?,
            stream_base_url: Self::normalize_base_url(stream_base_url)?,
        })
    }

    /// Wrap an existing `reqwest::Client` (tests, custom middleware).
    pub fn with_client(http: reqwest::Client, base_url: &str, stream_base_url: &str) -> Result<Self, Error> {
        Ok(Self {
            stream_http: http.clone(),
            http,
            transport: TransportConfig::default(),
            base_url: Self::normalize_base_url(base_url)?,
            stream_base_url: Self::normalize_base_url(stream_base_url)?,
        })
    }

    /// Ensure the base URL can carry path segments and ends with `/`.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::ClientBuild(format!("base URL cannot carry a path: {raw}")));
        }
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Per-resource client handle.
    pub fn resource(&self, resource: Resource) -> ResourceClient<'_> {
        ResourceClient {
            client: self,
            resource,
        }
    }

    pub fn departments(&self) -> ResourceClient<'_> {
        self.resource(Resource::Departments)
    }

    pub fn cities(&self) -> ResourceClient<'_> {
        self.resource(Resource::Cities)
    }

    pub fn complexes(&self) -> ResourceClient<'_> {
        self.resource(Resource::Complexes)
    }

    pub fn administrators(&self) -> ResourceClient<'_> {
        self.resource(Resource::Administrators)
    }

    /// Open an event-stream subscription for a resource.
    pub fn subscribe(&self, resource: &Resource, reconnect: ReconnectConfig) -> SseSubscription {
        let url = self.transport.stream_url(&self.stream_url(resource));
        SseSubscription::subscribe(self.stream_http.clone(), url, reconnect)
    }

    /// Event-stream URL for a resource (without the subscription key).
    pub fn stream_url(&self, resource: &Resource) -> Url {
        let mut segments = resource.segments();
        segments.push("stream");
        join_segments(&self.stream_base_url, &segments)
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, segments: &[&str]) -> Url {
        join_segments(&self.base_url, segments)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get(&self, url: Url, params: &[(&str, String)]) -> Result<Value, Error> {
        debug!("GET {url} params={params:?}");
        let resp = self.http.get(url).query(params).send().await?;
        handle_response(resp).await
    }

    async fn send_json<B: Serialize + Sync>(
        &self,
        method: reqwest::Method,
        url: Url,
        body: &B,
    ) -> Result<Value, Error> {
        debug!("{method} {url}");
        let resp = self.http.request(method, url).json(body).send().await?;
        handle_response(resp).await
    }

    async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {url}");
        let resp = self.http.delete(url).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(parse_error(status, resp).await)
        }
    }
}

fn join_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    // Base URLs are validated in the constructor, so this cannot fail.
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

// ── Response handling ────────────────────────────────────────────────

async fn handle_response(resp: reqwest::Response) -> Result<Value, Error> {
    let status = resp.status();
    if !status.is_success() {
        return Err(parse_error(status, resp).await);
    }

    let body = resp.text().await?;
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
    let raw = resp.text().await.unwrap_or_default();
    let fallback = || {
        status
            .canonical_reason()
            .map_or_else(|| status.to_string(), str::to_owned)
    };

    if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
        let code = err.code.and_then(|c| match c {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        Error::Remote {
            status: status.as_u16(),
            code,
            message: err.message.or(err.error).unwrap_or_else(fallback),
        }
    } else {
        Error::Remote {
            status: status.as_u16(),
            code: None,
            message: if raw.trim().is_empty() { fallback() } else { raw },
        }
    }
}

// ── Per-resource handle ──────────────────────────────────────────────

/// CRUD operations against one catalog resource.
pub struct ResourceClient<'a> {
    client: &'a CatalogClient,
    resource: Resource,
}

impl ResourceClient<'_> {
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// List all records matching the filter (the items of the first page
    /// the server returns).
    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<Value>, Error> {
        Ok(self.list_page(filter).await?.items)
    }

    /// List with pagination metadata.
    pub async fn list_page(&self, filter: &ListFilter) -> Result<Page, Error> {
        let url = self.client.url(&self.resource.segments());
        let body = self.client.get(url, &filter.to_query()).await?;
        Ok(Page::from_body(body))
    }

    pub async fn create<B: Serialize + Sync>(&self, payload: &B) -> Result<Value, Error> {
        let url = self.client.url(&self.resource.segments());
        let body = self
            .client
            .send_json(reqwest::Method::POST, url, payload)
            .await?;
        Ok(unwrap_entity(body))
    }

    pub async fn update<B: Serialize + Sync>(&self, id: &str, payload: &B) -> Result<Value, Error> {
        let url = self.item_url(id);
        let body = self
            .client
            .send_json(reqwest::Method::PUT, url, payload)
            .await?;
        Ok(unwrap_entity(body))
    }

    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        self.client.delete(self.item_url(id)).await
    }

    fn item_url(&self, id: &str) -> Url {
        let mut segments = self.resource.segments();
        segments.push(id);
        self.client.url(&segments)
    }
}
