// ── Catalog snapshot ──
//
// The immutable value views read. Every change produces a new snapshot;
// collections are `Arc`-shared so unchanged ones cost nothing to carry.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use strum::{Display, IntoStaticStr};

use super::collection::{from_records, remove_by_id, remove_where, upsert};
use crate::model::{
    Administrator, CatalogEntity, CatalogKind, City, Department, Identified, ResidentialComplex,
};

/// Synchronization state of the catalog store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// Not started.
    #[default]
    Idle,
    /// Initial bulk load in progress.
    Hydrating,
    /// Cache trusted, event streams applied.
    Live,
    /// Cache discarded after a failure; a retry is pending.
    Degraded,
    /// Rehydrating while still nominally degraded.
    Recovering,
}

/// Point-in-time view of every cached catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogSnapshot {
    pub departments: Arc<Vec<Department>>,
    pub cities: Arc<Vec<City>>,
    pub complexes: Arc<Vec<ResidentialComplex>>,
    pub administrators: Arc<Vec<Administrator>>,
    pub state: SyncState,
}

/// Freshly listed collections from one hydration pass.
#[derive(Debug, Default)]
pub(crate) struct Hydrated {
    pub departments: Vec<Department>,
    pub cities: Vec<City>,
    pub complexes: Vec<ResidentialComplex>,
    pub administrators: Vec<Administrator>,
}

impl CatalogSnapshot {
    /// `true` while a hydration is running.
    pub fn loading(&self) -> bool {
        matches!(self.state, SyncState::Hydrating | SyncState::Recovering)
    }

    /// `true` while the cache is not trusted.
    pub fn error(&self) -> bool {
        matches!(self.state, SyncState::Degraded | SyncState::Recovering)
    }

    pub fn len(&self, kind: CatalogKind) -> usize {
        match kind {
            CatalogKind::Department => self.departments.len(),
            CatalogKind::City => self.cities.len(),
            CatalogKind::Complex => self.complexes.len(),
            CatalogKind::Administrator => self.administrators.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.departments.is_empty()
            && self.cities.is_empty()
            && self.complexes.is_empty()
            && self.administrators.is_empty()
    }

    /// Every cached entity of one kind, in cache order.
    pub fn entities(&self, kind: CatalogKind) -> Vec<CatalogEntity> {
        match kind {
            CatalogKind::Department => self
                .departments
                .iter()
                .cloned()
                .map(CatalogEntity::Department)
                .collect(),
            CatalogKind::City => self.cities.iter().cloned().map(CatalogEntity::City).collect(),
            CatalogKind::Complex => self
                .complexes
                .iter()
                .cloned()
                .map(CatalogEntity::Complex)
                .collect(),
            CatalogKind::Administrator => self
                .administrators
                .iter()
                .cloned()
                .map(CatalogEntity::Administrator)
                .collect(),
        }
    }

    pub fn department(&self, id: &str) -> Option<&Department> {
        find(&self.departments, id)
    }

    pub fn city(&self, id: &str) -> Option<&City> {
        find(&self.cities, id)
    }

    pub fn complex(&self, id: &str) -> Option<&ResidentialComplex> {
        find(&self.complexes, id)
    }

    pub fn administrator(&self, id: &str) -> Option<&Administrator> {
        find(&self.administrators, id)
    }

    // ── Mutation (store-internal) ────────────────────────────────────

    pub(crate) fn replace_all(&mut self, hydrated: Hydrated) {
        self.departments = from_records(hydrated.departments);
        self.cities = from_records(hydrated.cities);
        self.complexes = from_records(hydrated.complexes);
        self.administrators = from_records(hydrated.administrators);
        self.resolve_names();
    }

    pub(crate) fn clear(&mut self) {
        self.departments = Arc::default();
        self.cities = Arc::default();
        self.complexes = Arc::default();
        self.administrators = Arc::default();
    }

    /// Insert or replace one entity, then refresh complex display names.
    pub(crate) fn upsert(&mut self, entity: CatalogEntity) {
        match entity {
            CatalogEntity::Department(d) => self.departments = upsert(&self.departments, d),
            CatalogEntity::City(c) => self.cities = upsert(&self.cities, c),
            CatalogEntity::Complex(c) => self.complexes = upsert(&self.complexes, c),
            CatalogEntity::Administrator(a) => {
                self.administrators = upsert(&self.administrators, a);
            }
        }
        self.resolve_names();
    }

    /// Remove one entity and everything that depends on it.
    ///
    /// A department takes its cities with it, and every complex pointing
    /// at the department or at one of those cities. A city takes its
    /// complexes. Administrators do not cascade.
    pub(crate) fn remove(&mut self, kind: CatalogKind, id: &str) {
        match kind {
            CatalogKind::Department => {
                self.departments = remove_by_id(&self.departments, Some(id));
                let orphaned: HashSet<String> = self
                    .cities
                    .iter()
                    .filter(|c| c.department_id == id)
                    .map(|c| c.id.clone())
                    .collect();
                self.cities = remove_where(&self.cities, |c| c.department_id == id);
                self.complexes = remove_where(&self.complexes, |x| {
                    x.department_id == id || orphaned.contains(&x.city_id)
                });
            }
            CatalogKind::City => {
                self.cities = remove_by_id(&self.cities, Some(id));
                self.complexes = remove_where(&self.complexes, |x| x.city_id == id);
            }
            CatalogKind::Complex => {
                self.complexes = remove_by_id(&self.complexes, Some(id));
            }
            CatalogKind::Administrator => {
                self.administrators = remove_by_id(&self.administrators, Some(id));
            }
        }
        self.resolve_names();
    }

    /// Join complex references against the cached collections. A reference
    /// the cache cannot resolve falls back to the name embedded in the
    /// backend record, or to none.
    pub(crate) fn resolve_names(&mut self) {
        if self.complexes.is_empty() {
            return;
        }
        let resolved: Vec<ResidentialComplex> = self
            .complexes
            .iter()
            .map(|complex| ResidentialComplex {
                resolved_department_name: self
                    .department(&complex.department_id)
                    .map(|d| d.name.clone())
                    .or_else(|| complex.embedded_department_name.clone()),
                resolved_city_name: self
                    .city(&complex.city_id)
                    .map(|c| c.name.clone())
                    .or_else(|| complex.embedded_city_name.clone()),
                resolved_administrator_name: self
                    .administrator(&complex.administrator_id)
                    .map(|a| a.name.clone())
                    .or_else(|| complex.embedded_administrator_name.clone()),
                ..complex.clone()
            })
            .collect();
        if resolved != *self.complexes {
            self.complexes = Arc::new(resolved);
        }
    }
}

fn find<'a, T: Identified>(list: &'a [T], id: &str) -> Option<&'a T> {
    if id.is_empty() {
        return None;
    }
    list.iter().find(|e| e.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> CatalogSnapshot {
        let mut snap = CatalogSnapshot::default();
        snap.replace_all(Hydrated {
            departments: vec![
                Department {
                    id: "D1".into(),
                    name: "Antioquia".into(),
                },
                Department {
                    id: "D2".into(),
                    name: "Caldas".into(),
                },
            ],
            cities: vec![
                City {
                    id: "C1".into(),
                    name: "Medellín".into(),
                    department_id: "D1".into(),
                },
                City {
                    id: "C2".into(),
                    name: "Manizales".into(),
                    department_id: "D2".into(),
                },
            ],
            complexes: vec![
                ResidentialComplex {
                    id: "X1".into(),
                    name: "Torres".into(),
                    department_id: "D1".into(),
                    city_id: "C1".into(),
                    administrator_id: "A1".into(),
                    ..ResidentialComplex::default()
                },
                ResidentialComplex {
                    id: "X2".into(),
                    name: "Altos".into(),
                    department_id: "D2".into(),
                    city_id: "C2".into(),
                    embedded_administrator_name: Some("Backend Name".into()),
                    administrator_id: "A9".into(),
                    ..ResidentialComplex::default()
                },
            ],
            administrators: vec![Administrator {
                id: "A1".into(),
                name: "Ana Ruiz".into(),
                email: "ana@victus.co".into(),
            }],
        });
        snap.state = SyncState::Live;
        snap
    }

    #[test]
    fn names_resolved_on_hydration() {
        let snap = sample();
        let x1 = snap.complex("X1").cloned().unwrap_or_default();
        assert_eq!(x1.resolved_department_name.as_deref(), Some("Antioquia"));
        assert_eq!(x1.resolved_city_name.as_deref(), Some("Medellín"));
        assert_eq!(x1.resolved_administrator_name.as_deref(), Some("Ana Ruiz"));

        // Unknown administrator keeps the backend-provided name.
        let x2 = snap.complex("X2").cloned().unwrap_or_default();
        assert_eq!(x2.resolved_administrator_name.as_deref(), Some("Backend Name"));
    }

    #[test]
    fn renaming_department_re_resolves_complexes() {
        let mut snap = sample();
        snap.upsert(CatalogEntity::Department(Department {
            id: "D1".into(),
            name: "Antioquia (renombrado)".into(),
        }));
        assert_eq!(
            snap.complex("X1").and_then(|x| x.resolved_department_name.as_deref()),
            Some("Antioquia (renombrado)")
        );
    }

    #[test]
    fn deleting_department_cascades_to_cities_and_complexes() {
        let mut snap = sample();
        snap.remove(CatalogKind::Department, "D1");
        assert!(snap.department("D1").is_none());
        assert!(snap.city("C1").is_none());
        assert!(snap.complex("X1").is_none());
        // Unrelated entries survive.
        assert!(snap.city("C2").is_some());
        assert!(snap.complex("X2").is_some());
    }

    #[test]
    fn deleting_department_removes_complexes_of_its_cities() {
        let mut snap = sample();
        // A complex whose own department id is stale but whose city belongs to D1.
        snap.upsert(CatalogEntity::Complex(ResidentialComplex {
            id: "X3".into(),
            department_id: "D-old".into(),
            city_id: "C1".into(),
            ..ResidentialComplex::default()
        }));
        snap.remove(CatalogKind::Department, "D1");
        assert!(snap.complex("X3").is_none());
    }

    #[test]
    fn deleting_city_cascades_to_complexes() {
        let mut snap = sample();
        snap.remove(CatalogKind::City, "C2");
        assert!(snap.complex("X2").is_none());
        assert_eq!(snap.len(CatalogKind::Complex), 1);
        assert_eq!(snap.len(CatalogKind::Department), 2);
    }

    #[test]
    fn deleting_administrator_does_not_cascade() {
        let mut snap = sample();
        snap.remove(CatalogKind::Administrator, "A1");
        assert!(snap.complex("X1").is_some());
    }

    #[test]
    fn deleting_administrator_drops_its_resolved_name() {
        let mut snap = sample();
        snap.remove(CatalogKind::Administrator, "A1");
        let x1 = snap.complex("X1").cloned().unwrap_or_default();
        assert_eq!(x1.resolved_administrator_name, None);
        assert_eq!(x1.resolved_department_name.as_deref(), Some("Antioquia"));
    }

    #[test]
    fn unresolvable_reference_falls_back_to_embedded_name() {
        let mut snap = sample();
        snap.upsert(CatalogEntity::Administrator(Administrator {
            id: "A9".into(),
            name: "Luis Mora".into(),
            email: "luis@victus.co".into(),
        }));
        assert_eq!(
            snap.complex("X2").and_then(|x| x.resolved_administrator_name.as_deref()),
            Some("Luis Mora")
        );

        snap.remove(CatalogKind::Administrator, "A9");
        assert_eq!(
            snap.complex("X2").and_then(|x| x.resolved_administrator_name.as_deref()),
            Some("Backend Name")
        );
    }

    #[test]
    fn clear_empties_everything() {
        let mut snap = sample();
        snap.clear();
        assert!(snap.is_empty());
    }

    #[test]
    fn loading_and_error_flags() {
        let mut snap = CatalogSnapshot::default();
        for (state, loading, error) in [
            (SyncState::Idle, false, false),
            (SyncState::Hydrating, true, false),
            (SyncState::Live, false, false),
            (SyncState::Degraded, false, true),
            (SyncState::Recovering, true, true),
        ] {
            snap.state = state;
            assert_eq!((snap.loading(), snap.error()), (loading, error), "{state}");
        }
    }
}
