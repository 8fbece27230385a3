//! Document model types for converted manuscripts.
//!
//! This module defines the intermediate representation handed from the
//! converter to a renderer. The model carries structure and inline styling
//! only; visual style definitions and layout belong to the renderer.

mod block;
mod document;
mod paragraph;
mod table;

pub use block::{Block, Heading, HeadingLevel};
pub use document::{CitationState, Document, Metadata, SectionCounters};
pub use paragraph::{Paragraph, ParagraphStyle, RunStyle, StyledRun};
pub use table::Table;
