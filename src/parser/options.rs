//! Parsing options and configuration.

use crate::bib::DEFAULT_MAX_ENTRIES;
use crate::detect::Encoding;

use super::table_detector::TableDetectorConfig;

/// Options for converting LaTeX manuscripts.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Encodings tried in order when reading sources
    pub encodings: Vec<Encoding>,

    /// Maximum number of bibliography entries read from one source
    pub max_bib_entries: usize,

    /// Give subsubsections a four-part number path
    pub number_subsubsections: bool,

    /// Emit the `\title` as a leading title paragraph
    pub emit_title: bool,

    /// Phrases that mark a definition paragraph (case-insensitive)
    pub definition_phrases: Vec<String>,

    /// Phrases that mark a list-introducing paragraph (case-insensitive)
    pub list_phrases: Vec<String>,

    /// Table detection thresholds and vocabulary
    pub table: TableDetectorConfig,

    /// Heading of the appended references section
    pub references_title: String,

    /// Heading of the appended missing references report
    pub missing_references_title: String,

    /// Explanation paragraph of the missing references report
    pub missing_references_note: String,

    /// Append the references section and missing references report
    pub back_matter: bool,

    /// Whether to convert batches in parallel
    pub parallel: bool,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable strict mode (fail on unreadable sources).
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Enable lenient mode (read unreadable sources as empty).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set the encoding fallback order.
    pub fn with_encodings(mut self, encodings: Vec<Encoding>) -> Self {
        self.encodings = encodings;
        self
    }

    /// Set the bibliography entry limit.
    pub fn with_max_bib_entries(mut self, limit: usize) -> Self {
        self.max_bib_entries = limit;
        self
    }

    /// Enable or disable four-part subsubsection numbers.
    pub fn with_subsubsection_numbers(mut self, enabled: bool) -> Self {
        self.number_subsubsections = enabled;
        self
    }

    /// Enable or disable the leading title paragraph.
    pub fn with_title(mut self, emit: bool) -> Self {
        self.emit_title = emit;
        self
    }

    /// Replace the definition phrase set.
    pub fn with_definition_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.definition_phrases = phrases.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the list-introducing phrase set.
    pub fn with_list_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.list_phrases = phrases.into_iter().map(Into::into).collect();
        self
    }

    /// Set the table detector configuration.
    pub fn with_table_config(mut self, config: TableDetectorConfig) -> Self {
        self.table = config;
        self
    }

    /// Set the titles of the references section and missing references report.
    pub fn with_section_titles(
        mut self,
        references: impl Into<String>,
        missing: impl Into<String>,
    ) -> Self {
        self.references_title = references.into();
        self.missing_references_title = missing.into();
        self
    }

    /// Enable or disable the appended references sections.
    pub fn with_back_matter(mut self, append: bool) -> Self {
        self.back_matter = append;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

fn phrases(list: &[&str]) -> Vec<String> {
    list.iter().map(|p| p.to_string()).collect()
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            encodings: Encoding::DEFAULT_FALLBACK.to_vec(),
            max_bib_entries: DEFAULT_MAX_ENTRIES,
            number_subsubsections: false,
            emit_title: false,
            definition_phrases: phrases(&[
                "define-se",
                "definimos",
                "conceito de",
                "entende-se por",
                "considera-se",
                "compreende-se",
                "is defined as",
                "we define",
                "the concept of",
                "is understood as",
            ]),
            list_phrases: phrases(&[
                "são elas:",
                "incluem:",
                "destacam-se:",
                "principais são:",
                "podem ser:",
                "dividem-se em:",
                "are as follows:",
                "include:",
                "the following:",
                "can be:",
                "are divided into:",
            ]),
            table: TableDetectorConfig::default(),
            references_title: "References".to_string(),
            missing_references_title: "Missing References".to_string(),
            missing_references_note: "The following citation keys were not found in the bibliography:"
                .to_string(),
            back_matter: true,
            parallel: true,
        }
    }
}

/// Error handling mode for reading sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on unreadable or undecodable sources
    Strict,
    /// Warn and treat unreadable sources as empty
    #[default]
    Lenient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_builder() {
        let options = ParseOptions::new()
            .strict()
            .with_max_bib_entries(10)
            .with_subsubsection_numbers(true)
            .with_definition_phrases(["by definition"])
            .with_section_titles("Referências", "Referências ausentes")
            .with_back_matter(false)
            .sequential();

        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert_eq!(options.max_bib_entries, 10);
        assert!(options.number_subsubsections);
        assert_eq!(options.definition_phrases, vec!["by definition".to_string()]);
        assert_eq!(options.references_title, "Referências");
        assert_eq!(options.missing_references_title, "Referências ausentes");
        assert!(!options.back_matter);
        assert!(!options.parallel);
    }

    #[test]
    fn test_default_options() {
        let options = ParseOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert_eq!(options.encodings, Encoding::DEFAULT_FALLBACK.to_vec());
        assert_eq!(options.max_bib_entries, 500);
        assert!(!options.number_subsubsections);
        assert!(!options.emit_title);
        assert!(options.back_matter);
        assert!(options.parallel);
        assert!(options.definition_phrases.iter().any(|p| p == "define-se"));
    }
}
