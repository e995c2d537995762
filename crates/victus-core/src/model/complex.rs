// ── Residential complexes and their administrators ──

use serde::{Deserialize, Serialize};

use super::Identified;

/// A residential complex ("conjunto").
///
/// References a department, city and administrator by id. The
/// `resolved_*` names are display joins computed from the cached
/// collections; they are never sent back to the server. The `embedded_*`
/// names are what the backend record itself carried, used when the cache
/// cannot resolve a reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidentialComplex {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub department_id: String,
    pub city_id: String,
    pub administrator_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_department_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_city_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_administrator_name: Option<String>,
    #[serde(skip)]
    pub embedded_department_name: Option<String>,
    #[serde(skip)]
    pub embedded_city_name: Option<String>,
    #[serde(skip)]
    pub embedded_administrator_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Administrator {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl Identified for ResidentialComplex {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Administrator {
    fn id(&self) -> &str {
        &self.id
    }
}
