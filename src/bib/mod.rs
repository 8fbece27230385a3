//! Bibliography store.
//!
//! Parses BibTeX/BibLaTeX source into an in-memory map from citation key to
//! entry. The store is built once per run and read-only afterwards.

mod entry;
mod format;
mod parser;

pub use entry::{BibEntry, EntryType};
pub use format::format_reference;
pub use parser::FIELDS;

pub(crate) use parser::matching_brace;

use crate::detect::read_source;
use crate::error::{Error, Result};
use crate::parser::{ErrorMode, ParseOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default maximum number of entries read from one source.
pub const DEFAULT_MAX_ENTRIES: usize = 500;

/// A formatted reference for a citation key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedReference {
    /// Citation key
    pub key: String,
    /// Plain-text formatted reference
    pub display_text: String,
}

/// Map from citation key to bibliography entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bibliography {
    entries: BTreeMap<String, BibEntry>,
    truncated: bool,
}

impl Bibliography {
    /// Create an empty bibliography.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse bibliography source with the default entry limit.
    ///
    /// # Example
    /// ```
    /// use untex::Bibliography;
    ///
    /// let bib = Bibliography::parse("@book{doe2001, author = {Doe, Jane}, title = {Big Book}, year = {2001}}");
    /// assert_eq!(bib.len(), 1);
    /// assert!(bib.contains("doe2001"));
    /// ```
    pub fn parse(source: &str) -> Self {
        Self::parse_with_limit(source, DEFAULT_MAX_ENTRIES)
    }

    /// Parse bibliography source, reading at most `limit` entries.
    ///
    /// Later entries with the same key replace earlier ones.
    pub fn parse_with_limit(source: &str, limit: usize) -> Self {
        let parsed = parser::parse_entries(source, limit);
        let mut bib = Self {
            entries: BTreeMap::new(),
            truncated: parsed.truncated,
        };
        for entry in parsed.entries {
            bib.insert(entry);
        }
        log::debug!("Loaded {} bibliography entries", bib.len());
        bib
    }

    /// Load a bibliography file with encoding fallback.
    ///
    /// A missing or undecodable file yields an empty bibliography in
    /// lenient mode and an error in strict mode.
    pub fn load<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        if options.error_mode == ErrorMode::Strict && !path.exists() {
            return Err(Error::Bibliography(format!(
                "{} not found",
                path.display()
            )));
        }
        let source = read_source(path, options)?;
        Ok(Self::parse_with_limit(&source, options.max_bib_entries))
    }

    /// Insert an entry, replacing any entry with the same key.
    pub fn insert(&mut self, entry: BibEntry) {
        if self.entries.contains_key(&entry.key) {
            log::debug!("Duplicate bibliography key: {}", entry.key);
        }
        self.entries.insert(entry.key.clone(), entry);
    }

    /// Get an entry by key.
    pub fn get(&self, key: &str) -> Option<&BibEntry> {
        self.entries.get(key)
    }

    /// Check whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Format the entry for `key`.
    pub fn resolve(&self, key: &str) -> Option<ResolvedReference> {
        self.get(key).map(|entry| ResolvedReference {
            key: key.to_string(),
            display_text: format_reference(entry),
        })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the bibliography has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the source had more records than the entry limit.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Iterate over keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate over entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = &BibEntry> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SMITH: &str = "@article{smith2020, author={Smith, John}, title={A Study}, journal={J. Tests}, year={2020}}";

    #[test]
    fn test_parse_and_resolve() {
        let bib = Bibliography::parse(SMITH);
        let reference = bib.resolve("smith2020").unwrap();
        assert_eq!(reference.key, "smith2020");
        assert_eq!(
            reference.display_text,
            "Smith, John (2020). A Study. *J. Tests*."
        );
        assert!(bib.resolve("nobody").is_none());
    }

    #[test]
    fn test_duplicate_key_overwrites() {
        let source = "@misc{k, title={First}}\n@misc{k, title={Second}}";
        let bib = Bibliography::parse(source);
        assert_eq!(bib.len(), 1);
        assert_eq!(bib.get("k").unwrap().field("title"), Some("Second"));
    }

    #[test]
    fn test_default_limit() {
        let source: String = (0..501)
            .map(|i| format!("@misc{{key{i}, title={{T}}}}\n"))
            .collect();
        let bib = Bibliography::parse(&source);
        assert_eq!(bib.len(), 500);
        assert!(bib.is_truncated());
    }

    #[test]
    fn test_load_missing_file_lenient() {
        let bib = Bibliography::load("/nonexistent/refs.bib", &ParseOptions::default()).unwrap();
        assert!(bib.is_empty());
    }

    #[test]
    fn test_load_missing_file_strict() {
        let options = ParseOptions::new().strict();
        let err = Bibliography::load("/nonexistent/refs.bib", &options).unwrap_err();
        assert!(matches!(err, Error::Bibliography(_)));
    }

    #[test]
    fn test_load_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SMITH.as_bytes()).unwrap();
        let bib = Bibliography::load(file.path(), &ParseOptions::default()).unwrap();
        assert!(bib.contains("smith2020"));
        assert_eq!(bib.keys().collect::<Vec<_>>(), vec!["smith2020"]);
    }
}
