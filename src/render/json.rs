//! JSON rendering for converted manuscripts.

use crate::error::{Error, Result};
use crate::model::Document;

use super::Renderer;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a document to JSON.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    JsonRenderer::new(format).render(doc)
}

/// Serializes the whole document model with serde.
pub struct JsonRenderer {
    format: JsonFormat,
}

impl JsonRenderer {
    /// Create a new JSON renderer.
    pub fn new(format: JsonFormat) -> Self {
        Self { format }
    }
}

impl Renderer for JsonRenderer {
    type Output = String;

    fn render(&self, doc: &Document) -> Result<String> {
        let result = match self.format {
            JsonFormat::Pretty => serde_json::to_string_pretty(doc),
            JsonFormat::Compact => serde_json::to_string(doc),
        };

        result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Heading, HeadingLevel, Paragraph};

    #[test]
    fn test_to_json_pretty() {
        let mut doc = Document::new();
        doc.metadata.title = Some("Test".to_string());
        doc.add_block(Block::Heading(Heading::new(HeadingLevel::Chapter, vec![1], "Intro")));
        doc.add_block(Block::Paragraph(Paragraph::with_text("Hello")));

        let json = to_json(&doc, JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"title\""));
        assert!(json.contains("\"type\": \"heading\""));
        assert!(json.contains("\"level\": \"chapter\""));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact_round_trip() {
        let mut doc = Document::new();
        doc.add_block(Block::PageBreak);
        doc.citations.record_missing("ghost");

        let json = to_json(&doc, JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));

        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
