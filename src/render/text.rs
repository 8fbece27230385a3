//! Plain text rendering for converted manuscripts.

use crate::error::Result;
use crate::model::{Block, Document};

use super::{heading_label, RenderOptions, Renderer};

/// Convert a document to plain text.
pub fn to_text(doc: &Document, options: &RenderOptions) -> Result<String> {
    TextRenderer::new(options.clone()).render(doc)
}

/// Plain text renderer: numbered headings, paragraph text, tab-separated
/// table rows. Missing references are written as their bare key.
pub struct TextRenderer {
    options: RenderOptions,
}

impl TextRenderer {
    /// Create a new text renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }
}

impl Renderer for TextRenderer {
    type Output = String;

    fn render(&self, doc: &Document) -> Result<String> {
        let parts: Vec<String> = doc
            .blocks
            .iter()
            .map(|block| match block {
                Block::Heading(h) => heading_label(h, &self.options),
                other => other.plain_text(),
            })
            .filter(|text| !text.trim().is_empty())
            .collect();

        Ok(parts.join("\n\n").trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Heading, HeadingLevel, Paragraph, StyledRun};

    #[test]
    fn test_to_text() {
        let mut doc = Document::new();
        doc.add_block(Block::Heading(Heading::new(HeadingLevel::Section, vec![1, 2], "Data")));
        doc.add_block(Block::Paragraph(Paragraph::with_text("Hello, world!")));
        doc.add_block(Block::PageBreak);
        let mut para = Paragraph::with_text("Missing ");
        para.add_run(StyledRun::missing_ref("ghost"));
        doc.add_block(Block::Paragraph(para));

        let result = to_text(&doc, &RenderOptions::default()).unwrap();
        assert_eq!(result, "1.2 Data\n\nHello, world!\n\nMissing ghost");
    }
}
