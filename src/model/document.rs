//! Document-level types.

use super::{Block, HeadingLevel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A converted manuscript.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata (title, author, date)
    pub metadata: Metadata,

    /// Content blocks in source order
    pub blocks: Vec<Block>,

    /// Citation bookkeeping for the whole conversion
    pub citations: CitationState,

    /// Final values of the section counters
    pub counters: SectionCounters,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a block to the document.
    pub fn add_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Get the number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the document has any blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate over the headings of the document.
    pub fn headings(&self) -> impl Iterator<Item = &super::Heading> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Heading(h) => Some(h),
            _ => None,
        })
    }

    /// Iterate over the tables of the document.
    pub fn tables(&self) -> impl Iterator<Item = &super::Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::plain_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Document metadata taken from `\title`, `\author` and `\date`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Date as written in the source
    pub date: Option<String>,
}

impl Metadata {
    /// Check if no metadata was found.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.date.is_none()
    }

    /// Convert metadata to YAML frontmatter format.
    pub fn to_yaml_frontmatter(&self) -> String {
        let mut lines = vec!["---".to_string()];

        if let Some(ref title) = self.title {
            lines.push(format!("title: \"{}\"", escape_yaml(title)));
        }
        if let Some(ref author) = self.author {
            lines.push(format!("author: \"{}\"", escape_yaml(author)));
        }
        if let Some(ref date) = self.date {
            lines.push(format!("date: \"{}\"", escape_yaml(date)));
        }

        lines.push("---".to_string());
        lines.push(String::new());

        lines.join("\n")
    }
}

/// Escape special characters for YAML strings.
fn escape_yaml(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Which citation keys were referenced, and which of them could not be
/// resolved.
///
/// Every cited key is either resolved or missing, never both: the
/// bibliography is read-only for the whole conversion, so a key's status
/// cannot change once recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationState {
    /// Every key referenced by a citation command
    pub cited: BTreeSet<String>,

    /// Keys not present in the bibliography
    pub missing: BTreeSet<String>,
}

impl CitationState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key that resolved against the bibliography.
    pub fn record_resolved(&mut self, key: &str) {
        self.cited.insert(key.to_string());
    }

    /// Record a key that is not in the bibliography.
    pub fn record_missing(&mut self, key: &str) {
        self.cited.insert(key.to_string());
        self.missing.insert(key.to_string());
    }

    /// Keys that were cited and resolved, in sorted order.
    pub fn resolved(&self) -> impl Iterator<Item = &str> {
        self.cited
            .iter()
            .filter(|k| !self.missing.contains(*k))
            .map(String::as_str)
    }

    /// Check whether a key is missing.
    pub fn is_missing(&self, key: &str) -> bool {
        self.missing.contains(key)
    }

    /// Check if any citation could not be resolved.
    pub fn has_missing(&self) -> bool {
        !self.missing.is_empty()
    }
}

/// Hierarchical section counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionCounters {
    pub chapter: u32,
    pub section: u32,
    pub subsection: u32,
    pub subsubsection: u32,
}

impl SectionCounters {
    /// Create counters starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the counter for `level`, reset every deeper counter and return
    /// the heading's number path.
    ///
    /// Subsubsections are counted but get an empty path unless
    /// `number_subsubsections` is set. Paragraph headings leave the counters
    /// untouched and are never numbered.
    pub fn advance(&mut self, level: HeadingLevel, number_subsubsections: bool) -> Vec<u32> {
        match level {
            HeadingLevel::Chapter => {
                self.chapter += 1;
                self.section = 0;
                self.subsection = 0;
                self.subsubsection = 0;
                vec![self.chapter]
            }
            HeadingLevel::Section => {
                self.section += 1;
                self.subsection = 0;
                self.subsubsection = 0;
                vec![self.chapter, self.section]
            }
            HeadingLevel::Subsection => {
                self.subsection += 1;
                self.subsubsection = 0;
                vec![self.chapter, self.section, self.subsection]
            }
            HeadingLevel::Subsubsection => {
                self.subsubsection += 1;
                if number_subsubsections {
                    vec![
                        self.chapter,
                        self.section,
                        self.subsection,
                        self.subsubsection,
                    ]
                } else {
                    Vec::new()
                }
            }
            HeadingLevel::Paragraph => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Heading, Paragraph};

    #[test]
    fn test_document_new() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.block_count(), 0);
        assert!(doc.metadata.is_empty());
    }

    #[test]
    fn test_document_plain_text_skips_page_breaks() {
        let mut doc = Document::new();
        doc.add_block(Block::Heading(Heading::new(HeadingLevel::Chapter, vec![1], "Intro")));
        doc.add_block(Block::PageBreak);
        doc.add_block(Block::Paragraph(Paragraph::with_text("Body.")));
        assert_eq!(doc.plain_text(), "Intro\n\nBody.");
        assert_eq!(doc.headings().count(), 1);
    }

    #[test]
    fn test_metadata_frontmatter() {
        let metadata = Metadata {
            title: Some("A \"quoted\" thesis".to_string()),
            author: Some("Maria Silva".to_string()),
            date: None,
        };

        let yaml = metadata.to_yaml_frontmatter();
        assert!(yaml.starts_with("---\n"));
        assert!(yaml.contains("title: \"A \\\"quoted\\\" thesis\""));
        assert!(yaml.contains("author: \"Maria Silva\""));
        assert!(!yaml.contains("date:"));
    }

    #[test]
    fn test_citation_state_partition() {
        let mut state = CitationState::new();
        state.record_resolved("smith2020");
        state.record_missing("unknown2099");
        state.record_resolved("smith2020");

        assert_eq!(state.cited.len(), 2);
        assert_eq!(state.resolved().collect::<Vec<_>>(), vec!["smith2020"]);
        assert!(state.is_missing("unknown2099"));
        assert!(state.has_missing());
    }

    #[test]
    fn test_counters_numbering() {
        let mut counters = SectionCounters::new();
        assert_eq!(counters.advance(HeadingLevel::Chapter, false), vec![1]);
        assert_eq!(counters.advance(HeadingLevel::Section, false), vec![1, 1]);
        assert_eq!(counters.advance(HeadingLevel::Subsection, false), vec![1, 1, 1]);
        assert_eq!(counters.advance(HeadingLevel::Subsection, false), vec![1, 1, 2]);
        assert_eq!(counters.advance(HeadingLevel::Section, false), vec![1, 2]);
        assert_eq!(counters.subsection, 0);

        assert_eq!(counters.advance(HeadingLevel::Chapter, false), vec![2]);
        assert_eq!(counters.section, 0);
        assert_eq!(counters.subsection, 0);
        assert_eq!(counters.subsubsection, 0);
    }

    #[test]
    fn test_subsubsection_numbering_is_opt_in() {
        let mut counters = SectionCounters::new();
        counters.advance(HeadingLevel::Chapter, false);
        counters.advance(HeadingLevel::Section, false);
        counters.advance(HeadingLevel::Subsection, false);

        assert!(counters.advance(HeadingLevel::Subsubsection, false).is_empty());
        assert_eq!(counters.subsubsection, 1);
        assert_eq!(
            counters.advance(HeadingLevel::Subsubsection, true),
            vec![1, 1, 1, 2]
        );
    }

    #[test]
    fn test_paragraph_heading_leaves_counters() {
        let mut counters = SectionCounters::new();
        counters.advance(HeadingLevel::Chapter, false);
        let before = counters;
        assert!(counters.advance(HeadingLevel::Paragraph, false).is_empty());
        assert_eq!(counters, before);
    }
}
