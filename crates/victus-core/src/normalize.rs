// ── Entity normalizer ──
//
// Backend revisions disagree on field names (`nombre` / `name` /
// `descripcion`, `departamentoId` / `departamento.id`, ...). Every logical
// attribute has an ordered candidate list; the first candidate holding a
// string or number wins. Dotted candidates reach into embedded objects.
//
// Every candidate list also contains the key the normalized entity
// serializes under, so normalizing a normalized record is a no-op.

use serde_json::Value;

use crate::model::{
    Administrator, CatalogEntity, CatalogKind, City, Department, Dwelling, DwellingStatus,
    DwellingType, ResidentialComplex,
};

// ── Candidate lists ──────────────────────────────────────────────────

pub const DEPARTMENT_ID: &[&str] = &["id", "departamentoId", "uuid", "codigo"];
pub const CITY_ID: &[&str] = &["id", "ciudadId", "uuid", "codigo"];
pub const COMPLEX_ID: &[&str] = &["id", "conjuntoId", "uuid", "codigo"];
pub const ADMINISTRATOR_ID: &[&str] = &["id", "adminId", "administradorId", "uuid", "codigo"];
pub const DWELLING_ID: &[&str] = &["id", "viviendaId", "uuid"];

pub const NAME: &[&str] = &["nombre", "name", "descripcion"];
pub const ADDRESS: &[&str] = &["direccion", "address"];
pub const PHONE: &[&str] = &["telefono", "phone"];
pub const EMAIL: &[&str] = &["email", "correo"];

pub const DEPARTMENT_REF: &[&str] = &[
    "departamentoId",
    "departamento_id",
    "departamento.id",
    "deptoId",
    "departmentId",
];
pub const CITY_REF: &[&str] = &["ciudadId", "ciudad_id", "ciudad.id", "cityId"];
pub const ADMINISTRATOR_REF: &[&str] = &[
    "administradorId",
    "adminId",
    "administrador.id",
    "usuarioAdministradorId",
    "administratorId",
];
pub const COMPLEX_REF: &[&str] = &["conjuntoId", "conjunto_id", "conjunto.id", "complexId"];

/// Display names some backends embed in complex records.
pub const EMBEDDED_DEPARTMENT_NAME: &[&str] = &[
    "nombreDepartamento",
    "departamentoNombre",
    "departamento.nombre",
    "resolvedDepartmentName",
];
pub const EMBEDDED_CITY_NAME: &[&str] =
    &["nombreCiudad", "ciudadNombre", "ciudad.nombre", "resolvedCityName"];
pub const EMBEDDED_ADMINISTRATOR_NAME: &[&str] = &[
    "administradorNombre",
    "adminNombre",
    "administrador.nombre",
    "administrador.name",
    "resolvedAdministratorName",
];

/// Explicit administrator name fields, tried before the composites.
pub const ADMINISTRATOR_FULL_NAME: &[&str] = &["nombre", "fullName"];

/// Groups of name parts, joined with spaces. The first group with any
/// non-empty part wins.
pub const ADMINISTRATOR_NAME_PARTS: &[&[&str]] = &[
    &["name", "lastName"],
    &["primerNombre", "segundoNombre", "primerApellido", "segundoApellido"],
    &["primer_nombre", "segundo_nombre", "primer_apellido", "segundo_apellido"],
    &["firstName", "middleName", "lastName", "secondLastName"],
];

pub const DWELLING_NUMBER: &[&str] = &["numero", "propertyNumber", "number"];
pub const DWELLING_TYPE: &[&str] = &["tipo", "propertyType", "type"];
pub const DWELLING_STATUS: &[&str] = &["estado", "status"];

/// Shown when an administrator record carries no usable name at all.
pub const UNNAMED: &str = "(Sin nombre)";

// ── Public entry points ──────────────────────────────────────────────

/// Normalize a raw record of the given kind. Never fails: missing fields
/// become empty strings.
pub fn normalize(kind: CatalogKind, raw: &Value) -> CatalogEntity {
    match kind {
        CatalogKind::Department => CatalogEntity::Department(normalize_department(raw)),
        CatalogKind::City => CatalogEntity::City(normalize_city(raw)),
        CatalogKind::Complex => CatalogEntity::Complex(normalize_complex(raw)),
        CatalogKind::Administrator => CatalogEntity::Administrator(normalize_administrator(raw)),
    }
}

pub fn normalize_department(raw: &Value) -> Department {
    Department {
        id: text(raw, DEPARTMENT_ID),
        name: text(raw, NAME),
    }
}

pub fn normalize_city(raw: &Value) -> City {
    City {
        id: text(raw, CITY_ID),
        name: text(raw, NAME),
        department_id: text(raw, DEPARTMENT_REF),
    }
}

pub fn normalize_complex(raw: &Value) -> ResidentialComplex {
    let department_name = non_empty(raw, EMBEDDED_DEPARTMENT_NAME);
    let city_name = non_empty(raw, EMBEDDED_CITY_NAME);
    let administrator_name = non_empty(raw, EMBEDDED_ADMINISTRATOR_NAME);
    ResidentialComplex {
        id: text(raw, COMPLEX_ID),
        name: text(raw, NAME),
        address: text(raw, ADDRESS),
        phone: text(raw, PHONE),
        department_id: text(raw, DEPARTMENT_REF),
        city_id: text(raw, CITY_REF),
        administrator_id: text(raw, ADMINISTRATOR_REF),
        resolved_department_name: department_name.clone(),
        resolved_city_name: city_name.clone(),
        resolved_administrator_name: administrator_name.clone(),
        embedded_department_name: department_name,
        embedded_city_name: city_name,
        embedded_administrator_name: administrator_name,
    }
}

pub fn normalize_administrator(raw: &Value) -> Administrator {
    let email = text(raw, EMAIL);
    Administrator {
        id: text(raw, ADMINISTRATOR_ID),
        name: administrator_name(raw, &email),
        email,
    }
}

pub fn normalize_dwelling(raw: &Value) -> Dwelling {
    Dwelling {
        id: text(raw, DWELLING_ID),
        number: text(raw, DWELLING_NUMBER),
        dwelling_type: first(raw, DWELLING_TYPE)
            .and_then(|t| DwellingType::parse(&t))
            .unwrap_or_default(),
        status: first(raw, DWELLING_STATUS)
            .and_then(|s| DwellingStatus::parse(&s))
            .unwrap_or_default(),
        complex_id: text(raw, COMPLEX_REF),
    }
}

/// Id carried by an event payload: either an entity object or a bare
/// id. `None` when no id can be found.
pub fn extract_id(kind: CatalogKind, raw: &Value) -> Option<String> {
    let candidates = match kind {
        CatalogKind::Department => DEPARTMENT_ID,
        CatalogKind::City => CITY_ID,
        CatalogKind::Complex => COMPLEX_ID,
        CatalogKind::Administrator => ADMINISTRATOR_ID,
    };
    id_of(raw, candidates)
}

pub fn extract_dwelling_id(raw: &Value) -> Option<String> {
    id_of(raw, DWELLING_ID)
}

// ── Field lookup ─────────────────────────────────────────────────────

fn id_of(raw: &Value, candidates: &[&str]) -> Option<String> {
    let id = match raw {
        Value::Object(_) => first(raw, candidates),
        other => scalar(other),
    };
    id.filter(|id| !id.is_empty())
}

fn lookup<'a>(raw: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(raw, |node, key| node.get(key))
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First candidate holding a string or number.
fn first(raw: &Value, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .find_map(|path| lookup(raw, path).and_then(scalar))
}

fn text(raw: &Value, candidates: &[&str]) -> String {
    first(raw, candidates).unwrap_or_default()
}

/// First candidate holding a non-blank value.
fn non_empty(raw: &Value, candidates: &[&str]) -> Option<String> {
    candidates.iter().find_map(|path| {
        lookup(raw, path)
            .and_then(scalar)
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
    })
}

// ── Administrator names ──────────────────────────────────────────────

fn administrator_name(raw: &Value, email: &str) -> String {
    if let Some(name) = non_empty(raw, ADMINISTRATOR_FULL_NAME) {
        return name;
    }
    for group in ADMINISTRATOR_NAME_PARTS {
        let parts: Vec<String> = group.iter().filter_map(|key| non_empty(raw, &[*key])).collect();
        if !parts.is_empty() {
            return parts.join(" ");
        }
    }
    name_from_email(email).unwrap_or_else(|| UNNAMED.to_owned())
}

/// `maria_jose.gomez-ruiz@x.co` → `Maria Jose Gomez Ruiz`
fn name_from_email(email: &str) -> Option<String> {
    let local = email.split('@').next()?.trim();
    let words: Vec<String> = local
        .split(['.', '_', '-'])
        .filter(|w| !w.is_empty())
        .map(title_case)
        .collect();
    (!words.is_empty()).then(|| words.join(" "))
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |head| {
        head.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}
