// Wire-level shapes for the catalog REST API.
//
// The backend has shipped several revisions: listings come back as a
// bare array or wrapped in `data` / `content` / `items`, and mutations
// may wrap the entity in `data`. Records stay as raw JSON here.

use serde_json::Value;

/// A catalog endpoint family, relative to the API base URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    Departments,
    Cities,
    Complexes,
    Administrators,
    /// Flat dwelling endpoints, used for update/delete by id.
    Dwellings,
    /// Dwellings nested under a residential complex, used for listing,
    /// creation and the per-complex event stream.
    DwellingsOf(String),
}

impl Resource {
    /// Path segments of the collection endpoint.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Self::Departments => vec!["departamentos"],
            Self::Cities => vec!["ciudades"],
            Self::Complexes => vec!["conjuntos"],
            Self::Administrators => vec!["administradores"],
            Self::Dwellings => vec!["viviendas"],
            Self::DwellingsOf(complex_id) => vec!["conjuntos", complex_id.as_str(), "viviendas"],
        }
    }

    /// Human-readable label for logs.
    pub fn label(&self) -> String {
        self.segments().join("/")
    }
}

/// Optional query filters for a listing call. Empty fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub name: Option<String>,
    pub department_id: Option<String>,
    pub city_id: Option<String>,
    pub query: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl ListFilter {
    pub fn by_department(department_id: impl Into<String>) -> Self {
        Self {
            department_id: Some(department_id.into()),
            ..Self::default()
        }
    }

    pub fn paged(page: u32, size: u32) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
            ..Self::default()
        }
    }

    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        let text = [
            ("nombre", &self.name),
            ("departamentoId", &self.department_id),
            ("ciudadId", &self.city_id),
            ("q", &self.query),
        ];
        for (key, value) in text {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                params.push((key, v.to_owned()));
            }
        }
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(size) = self.size {
            params.push(("size", size.to_string()));
        }
        params
    }
}

/// One page of a listing, with whatever pagination metadata the server sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Value>,
    pub total_elements: Option<u64>,
    pub number: Option<u64>,
    pub size: Option<u64>,
}

const LIST_ENVELOPE_KEYS: &[&str] = &["data", "content", "items"];

impl Page {
    /// Interpret a listing body. Anything that is neither an array nor an
    /// envelope around one yields an empty page.
    pub(crate) fn from_body(body: Value) -> Self {
        match body {
            Value::Array(items) => Self {
                total_elements: Some(items.len() as u64),
                items,
                number: None,
                size: None,
            },
            Value::Object(mut map) => {
                let items = LIST_ENVELOPE_KEYS
                    .iter()
                    .find_map(|key| match map.remove(*key) {
                        Some(Value::Array(items)) => Some(items),
                        _ => None,
                    })
                    .unwrap_or_default();
                Self {
                    total_elements: map.get("totalElements").and_then(Value::as_u64),
                    number: map.get("number").and_then(Value::as_u64),
                    size: map.get("size").and_then(Value::as_u64),
                    items,
                }
            }
            _ => Self::default(),
        }
    }
}

/// Strip an optional `{ "data": ... }` wrapper from a mutation response.
pub(crate) fn unwrap_entity(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.get("data").is_some_and(|d| !d.is_null()) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}
