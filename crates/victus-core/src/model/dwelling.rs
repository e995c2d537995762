// ── Dwellings ("viviendas") ──
//
// Type and status travel as Spanish labels. Parsing is lenient: English
// spellings are accepted and anything unrecognized falls back to the
// form defaults (Apartamento / Disponible).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Identified;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dwelling {
    pub id: String,
    pub number: String,
    #[serde(rename = "type")]
    pub dwelling_type: DwellingType,
    pub status: DwellingStatus,
    pub complex_id: String,
}

impl Identified for Dwelling {
    fn id(&self) -> &str {
        &self.id
    }
}

// ── DwellingType ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DwellingType {
    #[default]
    Apartment,
    House,
    Duplex,
}

impl DwellingType {
    pub const ALL: [Self; 3] = [Self::Apartment, Self::House, Self::Duplex];

    pub fn label(self) -> &'static str {
        match self {
            Self::Apartment => "Apartamento",
            Self::House => "Casa",
            Self::Duplex => "Dúplex",
        }
    }

    /// Recognize a Spanish or English spelling.
    pub fn parse(raw: &str) -> Option<Self> {
        match fold(raw).as_str() {
            "apartamento" | "apartment" | "apto" => Some(Self::Apartment),
            "casa" | "house" => Some(Self::House),
            "duplex" => Some(Self::Duplex),
            _ => None,
        }
    }
}

impl fmt::Display for DwellingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for DwellingType {
    fn from(raw: String) -> Self {
        Self::parse(&raw).unwrap_or_default()
    }
}

impl From<DwellingType> for String {
    fn from(value: DwellingType) -> Self {
        value.label().to_owned()
    }
}

// ── DwellingStatus ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DwellingStatus {
    #[default]
    Available,
    Occupied,
    Maintenance,
}

impl DwellingStatus {
    pub const ALL: [Self; 3] = [Self::Available, Self::Occupied, Self::Maintenance];

    pub fn label(self) -> &'static str {
        match self {
            Self::Available => "Disponible",
            Self::Occupied => "Ocupada",
            Self::Maintenance => "Mantenimiento",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match fold(raw).as_str() {
            "disponible" | "available" => Some(Self::Available),
            "ocupada" | "ocupado" | "occupied" => Some(Self::Occupied),
            "mantenimiento" | "maintenance" | "en mantenimiento" => Some(Self::Maintenance),
            _ => None,
        }
    }
}

impl fmt::Display for DwellingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for DwellingStatus {
    fn from(raw: String) -> Self {
        Self::parse(&raw).unwrap_or_default()
    }
}

impl From<DwellingStatus> for String {
    fn from(value: DwellingStatus) -> Self {
        value.label().to_owned()
    }
}

/// Lowercase and strip the accents that appear in the labels.
fn fold(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            'á' | 'Á' => 'a',
            'é' | 'É' => 'e',
            'í' | 'Í' => 'i',
            'ó' | 'Ó' => 'o',
            'ú' | 'Ú' => 'u',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}
