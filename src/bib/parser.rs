//! BibTeX/BibLaTeX record scanner.
//!
//! A record starts at `@<type>{<key>,` and runs to the next record start or
//! end of input. Only the fields the reference formatter uses are extracted.

use super::entry::{BibEntry, EntryType};
use regex::Regex;
use std::sync::LazyLock;

/// Fields kept from each record.
pub const FIELDS: [&str; 13] = [
    "author",
    "title",
    "year",
    "date",
    "journal",
    "journaltitle",
    "publisher",
    "booktitle",
    "volume",
    "pages",
    "editor",
    "location",
    "address",
];

/// Record types that never describe a citable work.
const IGNORED_TYPES: [&str; 3] = ["comment", "string", "preamble"];

static RECORD_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)\s*\{").expect("valid record regex"));

static RECORD_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([^,\s{}]+)\s*,").expect("valid key regex"));

static FIELD_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Za-z]+)\s*=\s*").expect("valid field regex"));

static BARE_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^,}\s]+").expect("valid bare value regex"));

/// Result of scanning a bibliography source.
#[derive(Debug, Default)]
pub struct ParsedEntries {
    /// Entries in source order
    pub entries: Vec<BibEntry>,
    /// Whether records were left unread because of the entry limit
    pub truncated: bool,
}

/// Scan `source` for records, keeping at most `limit` of them.
pub fn parse_entries(source: &str, limit: usize) -> ParsedEntries {
    let starts: Vec<_> = RECORD_START.captures_iter(source).collect();
    let mut parsed = ParsedEntries::default();

    for (i, caps) in starts.iter().enumerate() {
        let (Some(whole), Some(kind)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let kind = kind.as_str().to_ascii_lowercase();
        if IGNORED_TYPES.contains(&kind.as_str()) {
            continue;
        }

        let end = starts
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(source.len());
        let record = &source[whole.end()..end];

        let Some(key_caps) = RECORD_KEY.captures(record) else {
            log::debug!("Skipping @{} record without a key", kind);
            continue;
        };

        if parsed.entries.len() >= limit {
            log::warn!(
                "Bibliography truncated: keeping the first {} entries",
                limit
            );
            parsed.truncated = true;
            break;
        }

        let key = key_caps[1].to_string();
        let body = &record[key_caps[0].len()..];
        let mut entry = BibEntry::new(key, EntryType::from_name(&kind));
        extract_fields(body, &mut entry);
        parsed.entries.push(entry);
    }

    parsed
}

/// Extract known fields from a record body.
///
/// The first occurrence of a field wins. Scanning resumes after each value so
/// `name = ` text inside a value is never taken for a field.
fn extract_fields(body: &str, entry: &mut BibEntry) {
    let mut pos = 0;
    while let Some(caps) = FIELD_NAME.captures_at(body, pos) {
        let Some(whole) = caps.get(0) else { break };
        let name = caps[1].to_ascii_lowercase();
        let value_start = whole.end();

        let Some((value, consumed)) = read_value(&body[value_start..]) else {
            pos = value_start;
            continue;
        };
        pos = value_start + consumed;

        if FIELDS.contains(&name.as_str()) && !entry.fields.contains_key(&name) {
            entry.fields.insert(name, collapse_whitespace(value));
        }
    }
}

/// Read one field value: `{balanced}`, `"quoted"` or bare.
///
/// Returns the inner value and the number of bytes consumed.
fn read_value(input: &str) -> Option<(&str, usize)> {
    match input.chars().next()? {
        '{' => {
            let close = matching_brace(input)?;
            Some((&input[1..close], close + 1))
        }
        '"' => {
            let mut depth = 0usize;
            for (i, c) in input.char_indices().skip(1) {
                match c {
                    '{' => depth += 1,
                    '}' => depth = depth.saturating_sub(1),
                    '"' if depth == 0 => return Some((&input[1..i], i + 1)),
                    _ => {}
                }
            }
            None
        }
        _ => BARE_VALUE.find(input).map(|m| (m.as_str(), m.end())),
    }
}

/// Byte index of the brace closing the one at the start of `input`.
pub(crate) fn matching_brace(input: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_article() {
        let source = "@article{smith2020,\n  author = {Smith, John},\n  title = {A Study},\n  journal = {J. Tests},\n  year = {2020}\n}";
        let parsed = parse_entries(source, 500);
        assert_eq!(parsed.entries.len(), 1);
        assert!(!parsed.truncated);

        let entry = &parsed.entries[0];
        assert_eq!(entry.key, "smith2020");
        assert_eq!(entry.entry_type, EntryType::Article);
        assert_eq!(entry.field("author"), Some("Smith, John"));
        assert_eq!(entry.field("journal"), Some("J. Tests"));
        assert_eq!(entry.field("year"), Some("2020"));
        assert_eq!(entry.field("pages"), None);
    }

    #[test]
    fn test_nested_braces_and_quoted_values() {
        let source = r#"@book{k1, title = {The {LaTeX} Companion}, publisher = "Addison {W}esley", year = 1994}"#;
        let parsed = parse_entries(source, 500);
        let entry = &parsed.entries[0];
        assert_eq!(entry.field("title"), Some("The {LaTeX} Companion"));
        assert_eq!(entry.field("publisher"), Some("Addison {W}esley"));
        assert_eq!(entry.field("year"), Some("1994"));
    }

    #[test]
    fn test_title_does_not_match_booktitle() {
        let source = "@inproceedings{k, booktitle = {Proceedings}, title = {Paper}}";
        let entry = &parse_entries(source, 500).entries[0];
        assert_eq!(entry.field("title"), Some("Paper"));
        assert_eq!(entry.field("booktitle"), Some("Proceedings"));
    }

    #[test]
    fn test_field_names_are_case_insensitive() {
        let source = "@ARTICLE{k, AUTHOR = {Doe, J.}, Title = {T}}";
        let entry = &parse_entries(source, 500).entries[0];
        assert_eq!(entry.entry_type, EntryType::Article);
        assert_eq!(entry.field("author"), Some("Doe, J."));
        assert_eq!(entry.field("title"), Some("T"));
    }

    #[test]
    fn test_ignored_record_types() {
        let source = "@comment{old stuff}\n@string{jt = \"Journal\"}\n@misc{web, title = {Site}}";
        let parsed = parse_entries(source, 500);
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].key, "web");
    }

    #[test]
    fn test_multiline_values_are_collapsed() {
        let source = "@misc{k,\n title = {A very\n     long title}\n}";
        let entry = &parse_entries(source, 500).entries[0];
        assert_eq!(entry.field("title"), Some("A very long title"));
    }

    #[test]
    fn test_limit_truncates() {
        let source: String = (0..5)
            .map(|i| format!("@misc{{k{i}, title = {{T{i}}}}}\n"))
            .collect();
        let parsed = parse_entries(&source, 3);
        assert_eq!(parsed.entries.len(), 3);
        assert!(parsed.truncated);

        let parsed = parse_entries(&source, 5);
        assert_eq!(parsed.entries.len(), 5);
        assert!(!parsed.truncated);
    }

    #[test]
    fn test_matching_brace() {
        assert_eq!(matching_brace("{a{b}c}d"), Some(6));
        assert_eq!(matching_brace("{a\\}b}"), Some(5));
        assert_eq!(matching_brace("{open"), None);
    }
}
