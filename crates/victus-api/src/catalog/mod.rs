//! REST client for the catalog endpoints (departments, cities, residential
//! complexes, administrators, dwellings).

mod client;
mod types;

pub use client::{CatalogClient, ResourceClient};
pub use types::{ListFilter, Page, Resource};
