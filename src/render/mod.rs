//! Rendering module for converting documents to output formats.
//!
//! The [`Renderer`] trait is the seam for output collaborators (a word
//! processor writer, for example). The renderers shipped here produce
//! Markdown, plain text and JSON for inspection.

mod json;
mod markdown;
mod options;
mod result;
mod text;

pub use json::{to_json, JsonFormat, JsonRenderer};
pub use markdown::{to_markdown, to_markdown_with_stats, MarkdownRenderer};
pub use options::RenderOptions;
pub use result::{ExtractionStats, RenderResult};
pub use text::{to_text, TextRenderer};

use crate::error::Result;
use crate::model::{Document, Heading, HeadingLevel};

/// Consumer of a converted document.
pub trait Renderer {
    /// What the renderer produces.
    type Output;

    /// Render the whole document.
    fn render(&self, doc: &Document) -> Result<Self::Output>;
}

/// Heading text with its number, as configured.
pub(crate) fn heading_label(heading: &Heading, options: &RenderOptions) -> String {
    let number = match heading.number_label() {
        Some(number) if options.number_headings => number,
        _ => return heading.text.clone(),
    };
    match (&options.chapter_label, heading.level) {
        (Some(label), HeadingLevel::Chapter) => format!("{} {}: {}", label, number, heading.text),
        _ => format!("{} {}", number, heading.text),
    }
}
