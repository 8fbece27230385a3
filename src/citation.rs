//! Citation resolution.
//!
//! Rewrites LaTeX citation commands into parenthesized author-year labels
//! and records every cited key. Keys missing from the bibliography are
//! wrapped in a sentinel that the inline tokenizer turns into a
//! [`RunStyle::MissingRef`](crate::model::RunStyle::MissingRef) run.

use crate::bib::Bibliography;
use crate::model::CitationState;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Opening delimiter of a missing-reference sentinel.
pub const MISSING_OPEN: &str = "\u{0000}MISSING_REF:";

/// Closing delimiter of a missing-reference sentinel.
pub const MISSING_CLOSE: char = '\u{0001}';

static CITE_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\\(?:autocite|cite|textcite|parencite|citep|citet)\*?(?:\[[^\]]*\]){0,2}\{([^}]+)\}",
    )
    .expect("valid citation regex")
});

static AUTHOR_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^(]+)\s*\((\d{4})\)").expect("valid author-year regex"));

/// Matches a complete missing-reference sentinel, capturing the key.
pub(crate) static MISSING_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x00MISSING_REF:([^\x00\x01]*)\x01").expect("valid sentinel regex")
});

/// Wrap a citation key in the missing-reference sentinel.
pub fn wrap_missing(key: &str) -> String {
    format!("{MISSING_OPEN}{key}{MISSING_CLOSE}")
}

/// Replace every sentinel in `text` with its bare key.
pub fn strip_sentinels(text: &str) -> String {
    MISSING_REF.replace_all(text, "$1").into_owned()
}

/// Resolves citation commands against a bibliography.
#[derive(Debug, Clone, Copy)]
pub struct CitationResolver<'a> {
    bibliography: &'a Bibliography,
}

impl<'a> CitationResolver<'a> {
    /// Create a resolver over a read-only bibliography.
    pub fn new(bibliography: &'a Bibliography) -> Self {
        Self { bibliography }
    }

    /// Replace every citation command in `text`.
    ///
    /// A single key becomes `(label)`, several become `(l1; l2; ...)` in
    /// the order written. Every key is recorded in `state`.
    ///
    /// # Example
    /// ```
    /// use untex::{Bibliography, CitationResolver, CitationState};
    ///
    /// let bib = Bibliography::parse("@article{smith2020, author={Smith, John}, title={A Study}, journal={J. Tests}, year={2020}}");
    /// let mut state = CitationState::new();
    /// let text = CitationResolver::new(&bib).resolve("See \\cite{smith2020}.", &mut state);
    /// assert_eq!(text, "See (Smith, 2020).");
    /// ```
    pub fn resolve(&self, text: &str, state: &mut CitationState) -> String {
        CITE_COMMAND
            .replace_all(text, |caps: &Captures| {
                let labels: Vec<String> = caps[1]
                    .split(',')
                    .map(str::trim)
                    .filter(|key| !key.is_empty())
                    .map(|key| self.label_for(key, state))
                    .collect();

                if labels.is_empty() {
                    caps[0].to_string()
                } else {
                    format!("({})", labels.join("; "))
                }
            })
            .into_owned()
    }

    /// Label for one key, recording it in `state`.
    fn label_for(&self, key: &str, state: &mut CitationState) -> String {
        match self.short_label(key) {
            Some(label) => {
                state.record_resolved(key);
                label
            }
            None => {
                log::debug!("Missing citation key: {}", key);
                state.record_missing(key);
                wrap_missing(key)
            }
        }
    }

    /// `Surname, YYYY` for a known key, or the key itself if its formatted
    /// reference has no four-digit year. `None` if the key is unknown.
    pub fn short_label(&self, key: &str) -> Option<String> {
        let reference = self.bibliography.resolve(key)?;
        let Some(caps) = AUTHOR_YEAR.captures(&reference.display_text) else {
            return Some(key.to_string());
        };
        let name = caps[1].trim();
        let surname = match name.split_once(',') {
            Some((surname, _)) => surname.trim(),
            None => name.split_whitespace().last().unwrap_or(name),
        };
        Some(format!("{}, {}", surname, &caps[2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bibliography() -> Bibliography {
        Bibliography::parse(
            "@article{smith2020, author={Smith, John}, title={A Study}, journal={J. Tests}, year={2020}}\n\
             @book{doe2001, author={Jane Doe and Rui Lima}, title={Big Book}, year={2001}}\n\
             @misc{web, title={Some Page}}",
        )
    }

    #[test]
    fn test_single_known_key() {
        let bib = bibliography();
        let mut state = CitationState::new();
        let out = CitationResolver::new(&bib).resolve("As shown \\autocite{smith2020}.", &mut state);
        assert_eq!(out, "As shown (Smith, 2020).");
        assert!(state.cited.contains("smith2020"));
        assert!(state.missing.is_empty());
    }

    #[test]
    fn test_surname_from_last_token() {
        let bib = bibliography();
        let resolver = CitationResolver::new(&bib);
        assert_eq!(resolver.short_label("doe2001").as_deref(), Some("Doe, 2001"));
    }

    #[test]
    fn test_no_year_uses_key() {
        let bib = bibliography();
        let resolver = CitationResolver::new(&bib);
        assert_eq!(resolver.short_label("web").as_deref(), Some("web"));
        assert_eq!(resolver.short_label("nope"), None);
    }

    #[test]
    fn test_multiple_keys_and_missing() {
        let bib = bibliography();
        let mut state = CitationState::new();
        let out = CitationResolver::new(&bib).resolve("\\parencite{smith2020, unknown2099}", &mut state);
        assert_eq!(out, format!("(Smith, 2020; {})", wrap_missing("unknown2099")));
        assert_eq!(state.cited.len(), 2);
        assert!(state.is_missing("unknown2099"));
        assert_eq!(state.resolved().collect::<Vec<_>>(), vec!["smith2020"]);
    }

    #[test]
    fn test_all_command_variants() {
        let bib = bibliography();
        let mut state = CitationState::new();
        let resolver = CitationResolver::new(&bib);
        for cmd in ["autocite", "cite", "textcite", "parencite", "citep", "citet"] {
            let out = resolver.resolve(&format!("\\{cmd}{{smith2020}}"), &mut state);
            assert_eq!(out, "(Smith, 2020)", "command {cmd}");
        }
    }

    #[test]
    fn test_star_and_optional_arguments() {
        let bib = bibliography();
        let mut state = CitationState::new();
        let out = CitationResolver::new(&bib)
            .resolve("\\cite*[see][p. 4]{smith2020} and \\citep[ch. 2]{doe2001}", &mut state);
        assert_eq!(out, "(Smith, 2020) and (Doe, 2001)");
    }

    #[test]
    fn test_unrelated_commands_untouched() {
        let bib = bibliography();
        let mut state = CitationState::new();
        let out = CitationResolver::new(&bib).resolve("\\citeauthor{smith2020} \\cite{ }", &mut state);
        assert_eq!(out, "\\citeauthor{smith2020} \\cite{ }");
        assert!(state.cited.is_empty());
    }

    #[test]
    fn test_strip_sentinels() {
        let text = format!("see ({})", wrap_missing("k*1"));
        assert_eq!(strip_sentinels(&text), "see (k*1)");
    }
}
