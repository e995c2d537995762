// ── Catalog kinds and the entity sum type ──

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use victus_api::Resource;

use super::{Administrator, City, Department, ResidentialComplex};

/// Anything cached by id.
pub trait Identified {
    fn id(&self) -> &str;
}

/// The four reference catalogs the store keeps synchronized.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Department,
    City,
    Complex,
    Administrator,
}

impl CatalogKind {
    /// REST/SSE resource backing this catalog.
    pub fn resource(self) -> Resource {
        match self {
            Self::Department => Resource::Departments,
            Self::City => Resource::Cities,
            Self::Complex => Resource::Complexes,
            Self::Administrator => Resource::Administrators,
        }
    }

    /// Plural label used in logs and table headers.
    pub fn plural(self) -> &'static str {
        match self {
            Self::Department => "departments",
            Self::City => "cities",
            Self::Complex => "complexes",
            Self::Administrator => "administrators",
        }
    }
}

/// A normalized entity of any catalog kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CatalogEntity {
    Department(Department),
    City(City),
    Complex(ResidentialComplex),
    Administrator(Administrator),
}

impl CatalogEntity {
    pub fn kind(&self) -> CatalogKind {
        match self {
            Self::Department(_) => CatalogKind::Department,
            Self::City(_) => CatalogKind::City,
            Self::Complex(_) => CatalogKind::Complex,
            Self::Administrator(_) => CatalogKind::Administrator,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Department(d) => &d.name,
            Self::City(c) => &c.name,
            Self::Complex(c) => &c.name,
            Self::Administrator(a) => &a.name,
        }
    }
}

impl Identified for CatalogEntity {
    fn id(&self) -> &str {
        match self {
            Self::Department(d) => &d.id,
            Self::City(c) => &c.id,
            Self::Complex(c) => &c.id,
            Self::Administrator(a) => &a.id,
        }
    }
}
