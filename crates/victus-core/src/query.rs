// ── View-boundary queries ──
//
// Filters and joins views apply to a snapshot. Pure functions over the
// cached collections; nothing here touches the network.

use serde::Serialize;

use crate::model::{City, ResidentialComplex};
use crate::store::CatalogSnapshot;

/// Which cities a view shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CityFilter {
    #[default]
    All,
    ByDepartment(String),
    NameContains(String),
}

impl CityFilter {
    pub fn matches(&self, city: &City) -> bool {
        match self {
            Self::All => true,
            Self::ByDepartment(id) => city.department_id == *id,
            Self::NameContains(needle) => contains_ci(&city.name, needle),
        }
    }

    pub fn apply(&self, snapshot: &CatalogSnapshot) -> Vec<City> {
        snapshot
            .cities
            .iter()
            .filter(|c| self.matches(c))
            .cloned()
            .collect()
    }
}

/// Which residential complexes a view shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ComplexFilter {
    #[default]
    All,
    ByDepartment(String),
    ByCity(String),
    ByAdministrator(String),
    NameContains(String),
}

impl ComplexFilter {
    pub fn matches(&self, complex: &ResidentialComplex) -> bool {
        match self {
            Self::All => true,
            Self::ByDepartment(id) => complex.department_id == *id,
            Self::ByCity(id) => complex.city_id == *id,
            Self::ByAdministrator(id) => complex.administrator_id == *id,
            Self::NameContains(needle) => contains_ci(&complex.name, needle),
        }
    }

    pub fn apply(&self, snapshot: &CatalogSnapshot) -> Vec<ResidentialComplex> {
        snapshot
            .complexes
            .iter()
            .filter(|c| self.matches(c))
            .cloned()
            .collect()
    }
}

/// Sort by a display name, case-insensitively. Stable for equal names.
pub fn sorted_by_name<T>(mut items: Vec<T>, name: impl Fn(&T) -> &str) -> Vec<T> {
    items.sort_by_cached_key(|item| name(item).to_lowercase());
    items
}

/// A complex joined with the names of what it references. A reference
/// that resolves nowhere shows as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexRow {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub department: String,
    pub city: String,
    pub administrator: String,
}

impl ComplexRow {
    pub fn join(complex: &ResidentialComplex, snapshot: &CatalogSnapshot) -> Self {
        let department = snapshot
            .department(&complex.department_id)
            .map(|d| d.name.clone())
            .or_else(|| complex.resolved_department_name.clone());
        let city = snapshot
            .city(&complex.city_id)
            .map(|c| c.name.clone())
            .or_else(|| complex.resolved_city_name.clone());
        let administrator = snapshot
            .administrator(&complex.administrator_id)
            .map(|a| a.name.clone())
            .or_else(|| complex.resolved_administrator_name.clone());
        Self {
            id: complex.id.clone(),
            name: complex.name.clone(),
            address: complex.address.clone(),
            phone: complex.phone.clone(),
            department: department.unwrap_or_default(),
            city: city.unwrap_or_default(),
            administrator: administrator.unwrap_or_default(),
        }
    }

    /// Join every complex the filter admits, sorted by name.
    pub fn collect(snapshot: &CatalogSnapshot, filter: &ComplexFilter) -> Vec<Self> {
        let rows = filter
            .apply(snapshot)
            .iter()
            .map(|c| Self::join(c, snapshot))
            .collect();
        sorted_by_name(rows, |r: &Self| &r.name)
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    needle.is_empty() || haystack.to_lowercase().contains(&needle)
}
