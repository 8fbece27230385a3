//! Bibliography entry types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of a bibliography record, taken from `@<type>{...}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Article,
    Book,
    InProceedings,
    InCollection,
    /// Any other record type, lowercased (e.g., "misc", "phdthesis")
    Other(String),
}

impl EntryType {
    /// Map a record type name to an entry type (case-insensitive).
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "article" => EntryType::Article,
            "book" => EntryType::Book,
            "inproceedings" => EntryType::InProceedings,
            "incollection" => EntryType::InCollection,
            other => EntryType::Other(other.to_string()),
        }
    }

    /// Lowercase record type name.
    pub fn name(&self) -> &str {
        match self {
            EntryType::Article => "article",
            EntryType::Book => "book",
            EntryType::InProceedings => "inproceedings",
            EntryType::InCollection => "incollection",
            EntryType::Other(name) => name,
        }
    }
}

impl Default for EntryType {
    fn default() -> Self {
        EntryType::Other("misc".to_string())
    }
}

/// One bibliography record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibEntry {
    /// Citation key
    pub key: String,

    /// Record type
    pub entry_type: EntryType,

    /// Field values keyed by lowercase field name; absent fields are omitted
    pub fields: BTreeMap<String, String>,
}

impl BibEntry {
    /// Create an entry without fields.
    pub fn new(key: impl Into<String>, entry_type: EntryType) -> Self {
        Self {
            key: key.into(),
            entry_type,
            fields: BTreeMap::new(),
        }
    }

    /// Set a field and return self.
    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Get a field value by name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Get the first present field among `names`.
    pub fn first_field(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| self.field(name))
    }
}
