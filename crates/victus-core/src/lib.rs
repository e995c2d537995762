//! Catalog synchronization layer between `victus-api` and its consumers.
//!
//! This crate owns the domain model and the reactive cache of the Victus
//! Viviendas reference catalogs (departments, cities, residential
//! complexes, administrators):
//!
//! - **[`CatalogStore`]**: Central facade managing the full lifecycle:
//!   [`start()`](CatalogStore::start) opens one event stream per catalog
//!   and hydrates the cache, events are merged while `Live`, a lost stream
//!   degrades the store (cache discarded) until a reconnect or the retry
//!   timer recovers it. [`refresh()`](CatalogStore::refresh) alone gives a
//!   one-shot load for single CLI invocations.
//!
//! - **[`CatalogSnapshot`]**: Immutable value handed to readers, with the
//!   [`SyncState`] it was taken in. Collections are `Arc`-shared.
//!
//! - **[`SnapshotStream<T>`]**: Subscription handle exposing
//!   `current()` / `latest()` / `changed()` and a `Stream` adapter.
//!
//! - **[`DwellingFeed`]**: The dwellings of one complex, followed on demand.
//!
//! - **Normalization** ([`normalize`]): maps every backend record shape
//!   onto the canonical [`model`] types.

pub mod config;
pub mod error;
pub mod messages;
pub mod model;
pub mod normalize;
pub mod query;
pub mod requests;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::CatalogConfig;
pub use error::CoreError;
pub use messages::user_message;
pub use query::{CityFilter, ComplexFilter, ComplexRow, sorted_by_name};
pub use requests::{CityRequest, ComplexRequest, DepartmentRequest, DwellingRequest};
pub use store::{CatalogSnapshot, CatalogStore, DwellingFeed, DwellingSnapshot, SyncState};
pub use stream::{SnapshotStream, SnapshotWatchStream};

pub use model::{
    Administrator, CatalogEntity, CatalogKind, City, Department, Dwelling, DwellingStatus,
    DwellingType, Identified, ResidentialComplex,
};
