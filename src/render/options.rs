//! Rendering options and configuration.

/// Options for rendering a converted document.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Include YAML frontmatter with metadata
    pub include_frontmatter: bool,

    /// Prefix numbered headings with their number path
    pub number_headings: bool,

    /// Label written before chapter numbers (e.g., "Chapter" gives
    /// "Chapter 2: Methodology"); `None` renders "2 Methodology"
    pub chapter_label: Option<String>,

    /// Marker placed before a missing citation key (`[?key]`)
    pub missing_ref_marker: String,

    /// Maximum heading level (1-6)
    pub max_heading_level: u8,

    /// Escape special Markdown characters
    pub escape_special_chars: bool,

    /// Write page breaks as a horizontal rule instead of a blank line
    pub page_break_rule: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable frontmatter.
    pub fn with_frontmatter(mut self, include: bool) -> Self {
        self.include_frontmatter = include;
        self
    }

    /// Enable or disable heading numbers.
    pub fn with_heading_numbers(mut self, number: bool) -> Self {
        self.number_headings = number;
        self
    }

    /// Set the chapter label.
    pub fn with_chapter_label(mut self, label: impl Into<String>) -> Self {
        self.chapter_label = Some(label.into());
        self
    }

    /// Set the missing reference marker.
    pub fn with_missing_marker(mut self, marker: impl Into<String>) -> Self {
        self.missing_ref_marker = marker.into();
        self
    }

    /// Set the maximum heading level.
    pub fn with_max_heading(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 6);
        self
    }

    /// Enable or disable Markdown escaping.
    pub fn with_escaping(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    /// Render page breaks as horizontal rules.
    pub fn with_page_break_rule(mut self, rule: bool) -> Self {
        self.page_break_rule = rule;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_frontmatter: false,
            number_headings: true,
            chapter_label: None,
            missing_ref_marker: "?".to_string(),
            max_heading_level: 6,
            escape_special_chars: true,
            page_break_rule: false,
        }
    }
}
