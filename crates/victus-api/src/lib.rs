// victus-api: Async REST + SSE clients for the Victus Viviendas catalog backend

pub mod catalog;
pub mod error;
pub mod sse;
pub mod transport;

pub use catalog::{CatalogClient, ListFilter, Page, Resource, ResourceClient};
pub use error::Error;
pub use sse::{ChangeKind, ReconnectConfig, SseSubscription, StreamEvent};
pub use transport::TransportConfig;
