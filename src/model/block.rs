//! Block-level types.

use super::{Paragraph, Table};
use serde::{Deserialize, Serialize};

/// A content block of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A chapter, section or paragraph heading
    Heading(Heading),

    /// A paragraph of styled text
    Paragraph(Paragraph),

    /// A table
    Table(Table),

    /// A page break marker
    PageBreak,
}

impl Block {
    /// Check if this block is a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self, Block::Heading(_))
    }

    /// Check if this block is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Block::Paragraph(_))
    }

    /// Check if this block is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }

    /// Get plain text content of the block.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Heading(h) => h.text.clone(),
            Block::Paragraph(p) => p.plain_text(),
            Block::Table(t) => t.plain_text(),
            Block::PageBreak => String::new(),
        }
    }
}

/// Heading depth, from chapter (0) down to paragraph headings (4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    Chapter,
    Section,
    Subsection,
    Subsubsection,
    Paragraph,
}

/// (level, LaTeX command, renderer style)
const HEADING_TABLE: [(HeadingLevel, &str, &str); 5] = [
    (HeadingLevel::Chapter, "chapter", "Chapter"),
    (HeadingLevel::Section, "section", "Heading 1"),
    (HeadingLevel::Subsection, "subsection", "Heading 2"),
    (HeadingLevel::Subsubsection, "subsubsection", "Heading 3"),
    (HeadingLevel::Paragraph, "paragraph", "Heading 4"),
];

impl HeadingLevel {
    /// Numeric depth: 0 for chapters through 4 for paragraph headings.
    pub fn depth(&self) -> u8 {
        *self as u8
    }

    /// The LaTeX command that introduces this heading.
    pub fn command(&self) -> &'static str {
        HEADING_TABLE[self.depth() as usize].1
    }

    /// Name of the renderer style for this heading.
    pub fn style_name(&self) -> &'static str {
        HEADING_TABLE[self.depth() as usize].2
    }

    /// Look up the heading level of a sectioning command name.
    pub fn from_command(command: &str) -> Option<Self> {
        HEADING_TABLE
            .iter()
            .find(|(_, cmd, _)| *cmd == command)
            .map(|(level, _, _)| *level)
    }
}

/// A heading with its position in the section hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading depth
    pub level: HeadingLevel,

    /// Counter values from chapter down to this heading (empty if unnumbered)
    pub number_path: Vec<u32>,

    /// Heading text, cleaned of markup
    pub text: String,
}

impl Heading {
    /// Create a heading.
    pub fn new(level: HeadingLevel, number_path: Vec<u32>, text: impl Into<String>) -> Self {
        Self {
            level,
            number_path,
            text: text.into(),
        }
    }

    /// Create a heading without a number.
    pub fn unnumbered(level: HeadingLevel, text: impl Into<String>) -> Self {
        Self::new(level, Vec::new(), text)
    }

    /// Dotted number label (e.g., "1.2.3"), or `None` if unnumbered.
    pub fn number_label(&self) -> Option<String> {
        if self.number_path.is_empty() {
            return None;
        }
        Some(
            self.number_path
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join("."),
        )
    }

    /// Check if this heading carries a number.
    pub fn is_numbered(&self) -> bool {
        !self.number_path.is_empty()
    }
}
