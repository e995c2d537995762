// ── Catalog domain model ──
//
// Canonical shapes every backend revision is normalized into. Entities are
// immutable snapshots: an update replaces the whole value.

pub mod complex;
pub mod dwelling;
pub mod kind;
pub mod location;

// ── Re-exports ──────────────────────────────────────────────────────

pub use complex::{Administrator, ResidentialComplex};
pub use dwelling::{Dwelling, DwellingStatus, DwellingType};
pub use kind::{CatalogEntity, CatalogKind, Identified};
pub use location::{City, Department};
