use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::GridError;

/// Canonical names of every tenant, in export order
pub const REGISTRY: [&str; 8] = [
    "BARRINHA",
    "DUMONT",
    "JARDINÓPOLIS",
    "PITANGUEIRAS",
    "PONTAL",
    "SERTÃOZINHO",
    "TERRA ROXA",
    "VIRADOURO",
];

/// Spellings that older datasets used for a registered tenant
const ALIASES: [(&str, &str); 1] = [("DUMOMT", "DUMONT")];

/// Prefix carried by sheet titles in the municipal school workbooks
const SHEET_TITLE_PREFIX: &str = "ESCOLAS MUNICIPAIS DE ";

/// One municipality from the closed registry.
///
/// A `Tenant` can only be obtained through [`Tenant::parse`] (or the other
/// resolvers), so holding one proves the name is registered and canonical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tenant(&'static str);

impl Tenant {
    /// Normalize `name` (trim + uppercase) and look it up in the registry
    pub fn parse(name: &str) -> Result<Self, GridError> {
        let normalized = name.trim().to_uppercase();
        Self::lookup(&normalized).ok_or_else(|| GridError::UnknownTenant(name.trim().to_string()))
    }

    /// Resolve a workbook sheet title such as `ESCOLAS MUNICIPAIS DE SERTÃOZIN`.
    ///
    /// Sheet titles are capped at 31 characters, so a truncated remainder
    /// resolves when it is a prefix of exactly one registered name.
    pub fn from_sheet_name(title: &str) -> Option<Self> {
        let normalized = title.trim().to_uppercase();
        let stem = normalized
            .strip_prefix(SHEET_TITLE_PREFIX)
            .unwrap_or(&normalized)
            .trim();
        if stem.is_empty() {
            return None;
        }
        if let Some(tenant) = Self::lookup(stem) {
            return Some(tenant);
        }

        let mut candidates = REGISTRY.iter().filter(|name| name.starts_with(stem));
        match (candidates.next(), candidates.next()) {
            (Some(name), None) => Some(Tenant(name)),
            _ => None,
        }
    }

    /// All registered tenants in registry order
    pub fn all() -> impl Iterator<Item = Tenant> {
        REGISTRY.into_iter().map(Tenant)
    }

    /// Canonical uppercase name
    pub fn name(&self) -> &'static str {
        self.0
    }

    fn lookup(normalized: &str) -> Option<Self> {
        let canonical = ALIASES
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|(_, target)| *target)
            .unwrap_or(normalized);
        REGISTRY
            .iter()
            .find(|name| **name == canonical)
            .map(|name| Tenant(name))
    }
}

impl fmt::Display for Tenant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl FromStr for Tenant {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tenant::parse(s)
    }
}

impl AsRef<str> for Tenant {
    fn as_ref(&self) -> &str {
        self.0
    }
}

impl Serialize for Tenant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

impl<'de> Deserialize<'de> for Tenant {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Tenant::parse(&name).map_err(serde::de::Error::custom)
    }
}
