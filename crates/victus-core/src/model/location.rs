// ── Location hierarchy: Department → City ──

use serde::{Deserialize, Serialize};

use super::Identified;

/// Root of the location hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: String,
    pub name: String,
    pub department_id: String,
}

impl Identified for Department {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for City {
    fn id(&self) -> &str {
        &self.id
    }
}
