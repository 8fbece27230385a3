//! Rendered output paired with document statistics.

use crate::model::{Block, Document, HeadingLevel, Metadata, ParagraphStyle};
use serde::{Deserialize, Serialize};

/// Rendered manuscript with its metadata and counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    /// Rendered output
    pub content: String,

    /// Title, author and date captured during conversion
    pub metadata: Metadata,

    /// Block, citation and word counts
    pub stats: ExtractionStats,
}

impl RenderResult {
    pub fn new(content: String, metadata: Metadata, stats: ExtractionStats) -> Self {
        Self {
            content,
            metadata,
            stats,
        }
    }
}

/// Statistics of a converted document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Number of headings of any level
    pub heading_count: u32,

    /// Number of numbered chapters
    pub chapter_count: u32,

    /// Number of numbered sections (all depths below chapter)
    pub section_count: u32,

    /// Number of paragraphs, bibliography entries excluded
    pub paragraph_count: u32,

    /// Number of bibliography entries
    pub bibliography_count: u32,

    /// Number of tables
    pub table_count: u32,

    /// Number of page breaks
    pub page_break_count: u32,

    /// Number of distinct cited keys
    pub citation_count: u32,

    /// Number of distinct keys missing from the bibliography
    pub missing_citation_count: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,
}

impl ExtractionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the blocks and citations of a document.
    ///
    /// Word and character counts stay zero; see [`count_text`](Self::count_text).
    pub fn from_document(doc: &Document) -> Self {
        let mut stats = Self::new();
        for block in &doc.blocks {
            stats.add_block(block);
        }
        stats.citation_count = doc.citations.cited.len() as u32;
        stats.missing_citation_count = doc.citations.missing.len() as u32;
        stats
    }

    /// Count one block.
    pub fn add_block(&mut self, block: &Block) {
        match block {
            Block::Heading(h) => {
                self.heading_count += 1;
                if h.is_numbered() {
                    match h.level {
                        HeadingLevel::Chapter => self.chapter_count += 1,
                        _ => self.section_count += 1,
                    }
                }
            }
            Block::Paragraph(p) if p.style == ParagraphStyle::Bibliography => {
                self.bibliography_count += 1;
            }
            Block::Paragraph(_) => self.paragraph_count += 1,
            Block::Table(_) => self.table_count += 1,
            Block::PageBreak => self.page_break_count += 1,
        }
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }
}
