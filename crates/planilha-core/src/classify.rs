//! Content-based type classification.
//!
//! Every rule lives in [`RULES`] and is tried in order; the first predicate
//! that accepts the trimmed value decides the tag. Order matters: eleven bare
//! digits satisfy both the `cpf` and the `number` rule, and `cpf` must win.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Semantic type derived from a cell's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    #[default]
    Text,
    Number,
    Date,
    Phone,
    Cpf,
    Boolean,
}

impl TypeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Text => "text",
            TypeTag::Number => "number",
            TypeTag::Date => "date",
            TypeTag::Phone => "phone",
            TypeTag::Cpf => "cpf",
            TypeTag::Boolean => "boolean",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(TypeTag::Text),
            "number" => Ok(TypeTag::Number),
            "date" => Ok(TypeTag::Date),
            "phone" => Ok(TypeTag::Phone),
            "cpf" => Ok(TypeTag::Cpf),
            "boolean" => Ok(TypeTag::Boolean),
            other => Err(format!("unknown type tag: {other}")),
        }
    }
}

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\(\d{2}\)\s?\d{4,5}-?\d{4}|\d{2}-\d{4,5}-\d{4})$").expect("phone pattern")
});
static CPF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d{3}\.\d{3}\.\d{3}-\d{2}|\d{11})$").expect("cpf pattern"));
static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("date pattern"));

type Predicate = fn(&str) -> bool;

/// Ordered rule table, first match wins
pub const RULES: [(Predicate, TypeTag); 6] = [
    (is_blank, TypeTag::Text),
    (is_phone, TypeTag::Phone),
    (is_cpf, TypeTag::Cpf),
    (is_date, TypeTag::Date),
    (is_yes_no, TypeTag::Boolean),
    (is_digits, TypeTag::Number),
];

/// Classify a raw cell value. Total: anything no rule accepts is `text`.
pub fn classify(value: &str) -> TypeTag {
    let value = value.trim();
    RULES
        .iter()
        .find(|(accepts, _)| accepts(value))
        .map(|(_, tag)| *tag)
        .unwrap_or(TypeTag::Text)
}

fn is_blank(value: &str) -> bool {
    value.is_empty()
}

fn is_phone(value: &str) -> bool {
    PHONE.is_match(value)
}

fn is_cpf(value: &str) -> bool {
    CPF.is_match(value)
}

fn is_date(value: &str) -> bool {
    DATE.is_match(value)
}

fn is_yes_no(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "sim" | "não" | "nao")
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}
