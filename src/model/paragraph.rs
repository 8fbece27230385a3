//! Paragraph and text-level types.

use serde::{Deserialize, Serialize};

/// A paragraph of styled text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Styled runs in source order
    pub runs: Vec<StyledRun>,

    /// Paragraph style
    pub style: ParagraphStyle,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self {
            runs: Vec::new(),
            style: ParagraphStyle::default(),
        }
    }

    /// Create a paragraph from already tokenized runs.
    pub fn from_runs(runs: Vec<StyledRun>, style: ParagraphStyle) -> Self {
        Self { runs, style }
    }

    /// Create a paragraph with plain text.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_run(StyledRun::plain(text));
        p
    }

    /// Set the paragraph style and return self.
    pub fn styled(mut self, style: ParagraphStyle) -> Self {
        self.style = style;
        self
    }

    /// Add a styled run.
    pub fn add_run(&mut self, run: StyledRun) {
        self.runs.push(run);
    }

    /// Get plain text content of the paragraph.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Check if the paragraph is empty.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty() || self.plain_text().trim().is_empty()
    }

    /// Iterate over the keys highlighted as missing references.
    pub fn missing_refs(&self) -> impl Iterator<Item = &str> {
        self.runs
            .iter()
            .filter(|r| r.is_missing_ref())
            .map(|r| r.text.as_str())
    }
}

impl Default for Paragraph {
    fn default() -> Self {
        Self::new()
    }
}

/// How a paragraph should be presented by a renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParagraphStyle {
    /// Body text
    #[default]
    Normal,
    /// Paragraph that introduces a definition
    Definition,
    /// Paragraph that introduces an enumeration
    List,
    /// Document title
    Title,
    /// Entry of the references section
    Bibliography,
}

impl ParagraphStyle {
    /// Name of the renderer style this paragraph maps to.
    pub fn style_name(&self) -> &'static str {
        match self {
            ParagraphStyle::Normal | ParagraphStyle::List => "Normal",
            ParagraphStyle::Definition => "Definition",
            ParagraphStyle::Title => "Title",
            ParagraphStyle::Bibliography => "Bibliography",
        }
    }
}

/// Inline styling of a run.
///
/// Styles are exclusive: a run is never both a missing reference and
/// formatted, and never both bold and italic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStyle {
    /// Unformatted text
    #[default]
    Plain,
    /// Bold text
    Bold,
    /// Italic text
    Italic,
    /// Citation key that could not be resolved
    MissingRef,
}

/// A run of text with a single style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledRun {
    /// The text content
    pub text: String,

    /// Run style
    pub style: RunStyle,
}

impl StyledRun {
    /// Create a run with the given style.
    pub fn new(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Create a plain text run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, RunStyle::Plain)
    }

    /// Create a bold text run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self::new(text, RunStyle::Bold)
    }

    /// Create an italic text run.
    pub fn italic(text: impl Into<String>) -> Self {
        Self::new(text, RunStyle::Italic)
    }

    /// Create a missing-reference run holding the raw citation key.
    pub fn missing_ref(key: impl Into<String>) -> Self {
        Self::new(key, RunStyle::MissingRef)
    }

    pub fn is_bold(&self) -> bool {
        self.style == RunStyle::Bold
    }

    pub fn is_italic(&self) -> bool {
        self.style == RunStyle::Italic
    }

    pub fn is_missing_ref(&self) -> bool {
        self.style == RunStyle::MissingRef
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_plain_text() {
        let mut p = Paragraph::new();
        p.add_run(StyledRun::plain("Hello "));
        p.add_run(StyledRun::bold("world"));
        p.add_run(StyledRun::plain("!"));

        assert_eq!(p.plain_text(), "Hello world!");
        assert!(!p.is_empty());
    }

    #[test]
    fn test_missing_ref_run_is_unformatted() {
        let run = StyledRun::missing_ref("unknown2099");
        assert!(run.is_missing_ref());
        assert!(!run.is_bold());
        assert!(!run.is_italic());
    }

    #[test]
    fn test_missing_refs_iterator() {
        let p = Paragraph::from_runs(
            vec![
                StyledRun::plain("See ("),
                StyledRun::missing_ref("a2001"),
                StyledRun::plain("; "),
                StyledRun::missing_ref("b2002"),
                StyledRun::plain(")"),
            ],
            ParagraphStyle::Normal,
        );
        assert_eq!(p.missing_refs().collect::<Vec<_>>(), vec!["a2001", "b2002"]);
    }

    #[test]
    fn test_whitespace_only_paragraph_is_empty() {
        assert!(Paragraph::with_text("  \n ").is_empty());
        assert!(Paragraph::new().is_empty());
    }

    #[test]
    fn test_style_names() {
        assert_eq!(ParagraphStyle::Definition.style_name(), "Definition");
        assert_eq!(ParagraphStyle::List.style_name(), "Normal");
    }
}
