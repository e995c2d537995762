// ── Catalog store ──
//
// Cached catalogs, their state machine, and the per-complex dwelling feed.

mod catalog;
mod collection;
mod dwellings;
mod snapshot;

pub use catalog::CatalogStore;
pub use collection::{from_records, remove_by_id, remove_where, upsert};
pub use dwellings::{DwellingFeed, DwellingSnapshot};
pub use snapshot::{CatalogSnapshot, SyncState};
