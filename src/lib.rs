//! # untex
//!
//! LaTeX manuscript extraction library for Rust.
//!
//! This library converts LaTeX academic manuscripts into a structured
//! document model: numbered headings, styled paragraphs, tables and
//! resolved author-year citations, with missing citation keys tracked and
//! highlighted. The model can be rendered to Markdown, plain text and JSON,
//! or handed to any [`render::Renderer`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use untex::{convert_files, render, Bibliography, ParseOptions};
//!
//! fn main() -> untex::Result<()> {
//!     let options = ParseOptions::default();
//!     let bib = Bibliography::load("references.bib", &options)?;
//!     let doc = convert_files(&["intro.tex", "method.tex"], &bib, &options)?;
//!
//!     let markdown = render::to_markdown(&doc, &render::RenderOptions::default())?;
//!     println!("{}", markdown);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Citation resolution**: `\cite` family to `(Surname, YYYY)`, missing keys reported
//! - **Structure**: chapter/section numbering, definitions, page breaks
//! - **Tables**: `tabular` environments, bare `&` rows and table-like prose
//! - **Encoding fallback**: UTF-8, Windows-1252, Latin-1
//! - **Parallel processing**: Uses Rayon for batches of independent conversions

pub mod bib;
pub mod citation;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use bib::{BibEntry, Bibliography, EntryType, ResolvedReference};
pub use citation::CitationResolver;
pub use detect::Encoding;
pub use error::{Error, Result};
pub use model::{
    Block, CitationState, Document, Heading, HeadingLevel, Metadata, Paragraph, ParagraphStyle,
    RunStyle, SectionCounters, StyledRun, Table,
};
pub use parser::{Converter, ErrorMode, ParseOptions, TableDetector, TableDetectorConfig};
pub use render::{ExtractionStats, JsonFormat, RenderOptions, Renderer};

use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Convert a manuscript against bibliography source with default options.
///
/// # Example
///
/// ```
/// use untex::convert_str;
///
/// let bib = "@article{smith2020, author={Smith, John}, title={A Study}, journal={J. Tests}, year={2020}}";
/// let doc = convert_str("See \\cite{smith2020} and \\cite{unknown2099}.", bib);
///
/// assert_eq!(doc.blocks[0].plain_text(), "See (Smith, 2020) and (unknown2099).");
/// assert!(doc.citations.is_missing("unknown2099"));
/// ```
pub fn convert_str(manuscript: &str, bibliography: &str) -> Document {
    let bibliography = Bibliography::parse(bibliography);
    convert_str_with_options(manuscript, &bibliography, &ParseOptions::default())
}

/// Convert a manuscript with custom options.
pub fn convert_str_with_options(
    manuscript: &str,
    bibliography: &Bibliography,
    options: &ParseOptions,
) -> Document {
    convert_sources(&[manuscript], bibliography, options)
}

/// Convert several sources (one per chapter, for example) into one
/// document, separated by page breaks.
///
/// The references section and missing references report are appended
/// unless [`ParseOptions::back_matter`] is off.
pub fn convert_sources<S: AsRef<str>>(
    sources: &[S],
    bibliography: &Bibliography,
    options: &ParseOptions,
) -> Document {
    let mut converter = Converter::new(bibliography, options.clone());
    for source in sources {
        converter.push_source(source.as_ref());
    }
    if options.back_matter {
        converter.append_bibliography();
        converter.append_missing_report();
    }
    converter.finish()
}

/// Read and convert chapter files in order.
///
/// # Example
///
/// ```no_run
/// use untex::{convert_files, Bibliography, ParseOptions};
///
/// let options = ParseOptions::new().strict();
/// let bib = Bibliography::load("references.bib", &options).unwrap();
/// let doc = convert_files(&["chapters/intro.tex"], &bib, &options).unwrap();
/// println!("{} blocks", doc.block_count());
/// ```
pub fn convert_files<P: AsRef<Path>>(
    paths: &[P],
    bibliography: &Bibliography,
    options: &ParseOptions,
) -> Result<Document> {
    let sources = paths
        .iter()
        .map(|path| detect::read_source(path, options))
        .collect::<Result<Vec<_>>>()?;
    Ok(convert_sources(&sources, bibliography, options))
}

/// Convert independent jobs (each a list of chapter files) against one
/// shared bibliography.
///
/// Jobs run in parallel unless [`ParseOptions::parallel`] is off; results
/// keep the order of `jobs`.
pub fn convert_batch<P: AsRef<Path> + Sync>(
    jobs: &[Vec<P>],
    bibliography: &Bibliography,
    options: &ParseOptions,
) -> Vec<Result<Document>> {
    log::info!("Converting {} jobs", jobs.len());
    if options.parallel {
        jobs.par_iter()
            .map(|paths| convert_files(paths, bibliography, options))
            .collect()
    } else {
        jobs.iter()
            .map(|paths| convert_files(paths, bibliography, options))
            .collect()
    }
}

/// Load a bibliography file.
pub fn load_bibliography<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<Bibliography> {
    Bibliography::load(path, options)
}

/// Extract plain text from chapter files, without a bibliography.
///
/// # Example
///
/// ```no_run
/// use untex::extract_text;
///
/// let text = extract_text(&["thesis.tex"]).unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(paths: &[P]) -> Result<String> {
    let options = ParseOptions::default().with_back_matter(false);
    let doc = convert_files(paths, &Bibliography::new(), &options)?;
    render::to_text(&doc, &RenderOptions::default())
}

/// Builder for converting and rendering LaTeX manuscripts.
///
/// # Example
///
/// ```no_run
/// use untex::Untex;
///
/// let markdown = Untex::new()
///     .with_bibliography("references.bib")
///     .with_chapter_label("Chapter")
///     .with_frontmatter()
///     .parse(&["intro.tex", "method.tex"])?
///     .to_markdown()?;
/// # Ok::<(), untex::Error>(())
/// ```
pub struct Untex {
    parse_options: ParseOptions,
    render_options: RenderOptions,
    bibliography: Option<PathBuf>,
}

impl Untex {
    /// Create a new Untex builder.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            render_options: RenderOptions::default(),
            bibliography: None,
        }
    }

    /// Enable strict mode (fail on unreadable sources).
    pub fn strict(mut self) -> Self {
        self.parse_options = self.parse_options.strict();
        self
    }

    /// Enable lenient mode.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parse_options = self.parse_options.sequential();
        self
    }

    /// Set the bibliography file.
    pub fn with_bibliography(mut self, path: impl Into<PathBuf>) -> Self {
        self.bibliography = Some(path.into());
        self
    }

    /// Replace the parse options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    /// Replace the render options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Give subsubsections four-part numbers.
    pub fn with_subsubsection_numbers(mut self) -> Self {
        self.parse_options = self.parse_options.with_subsubsection_numbers(true);
        self
    }

    /// Emit the document title as a leading paragraph.
    pub fn with_title(mut self) -> Self {
        self.parse_options = self.parse_options.with_title(true);
        self
    }

    /// Set the titles of the appended references sections.
    pub fn with_section_titles(
        mut self,
        references: impl Into<String>,
        missing: impl Into<String>,
    ) -> Self {
        self.parse_options = self.parse_options.with_section_titles(references, missing);
        self
    }

    /// Do not append the references sections.
    pub fn without_back_matter(mut self) -> Self {
        self.parse_options = self.parse_options.with_back_matter(false);
        self
    }

    /// Enable frontmatter in output.
    pub fn with_frontmatter(mut self) -> Self {
        self.render_options = self.render_options.with_frontmatter(true);
        self
    }

    /// Set the chapter label used when rendering.
    pub fn with_chapter_label(mut self, label: impl Into<String>) -> Self {
        self.render_options = self.render_options.with_chapter_label(label);
        self
    }

    /// Convert chapter files and return a result wrapper.
    pub fn parse<P: AsRef<Path>>(self, paths: &[P]) -> Result<UntexResult> {
        let bibliography = self.load_bibliography()?;
        let document = convert_files(paths, &bibliography, &self.parse_options)?;
        Ok(UntexResult {
            document,
            render_options: self.render_options,
        })
    }

    /// Convert manuscript text against bibliography source.
    ///
    /// The configured bibliography file is not read.
    pub fn parse_str(self, manuscript: &str, bibliography: &str) -> UntexResult {
        let bibliography =
            Bibliography::parse_with_limit(bibliography, self.parse_options.max_bib_entries);
        UntexResult {
            document: convert_str_with_options(manuscript, &bibliography, &self.parse_options),
            render_options: self.render_options,
        }
    }

    fn load_bibliography(&self) -> Result<Bibliography> {
        match &self.bibliography {
            Some(path) => Bibliography::load(path, &self.parse_options),
            None => Ok(Bibliography::new()),
        }
    }
}

impl Default for Untex {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of converting a manuscript.
pub struct UntexResult {
    /// The converted document
    pub document: Document,
    /// Render options to use
    render_options: RenderOptions,
}

impl UntexResult {
    /// Convert to Markdown.
    pub fn to_markdown(&self) -> Result<String> {
        render::to_markdown(&self.document, &self.render_options)
    }

    /// Convert to plain text.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.document, &self.render_options)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Block and citation statistics.
    pub fn stats(&self) -> ExtractionStats {
        ExtractionStats::from_document(&self.document)
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BIB: &str = "@article{smith2020, author={Smith, John}, title={A Study}, journal={J. Tests}, year={2020}}";

    fn temp_source(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_untex_builder() {
        let untex = Untex::new()
            .strict()
            .with_frontmatter()
            .with_chapter_label("Capítulo")
            .without_back_matter()
            .sequential();

        assert_eq!(untex.parse_options.error_mode, ErrorMode::Strict);
        assert!(untex.render_options.include_frontmatter);
        assert_eq!(untex.render_options.chapter_label.as_deref(), Some("Capítulo"));
        assert!(!untex.parse_options.back_matter);
        assert!(!untex.parse_options.parallel);
    }

    #[test]
    fn test_untex_builder_default() {
        let builder = Untex::default();
        assert!(!builder.render_options.include_frontmatter);
        assert!(builder.bibliography.is_none());
    }

    #[test]
    fn test_convert_str_appends_back_matter() {
        let doc = convert_str("See \\cite{smith2020} and \\cite{ghost}.", BIB);
        let titles: Vec<&str> = doc.headings().map(|h| h.text.as_str()).collect();
        assert_eq!(titles, vec!["References", "Missing References"]);
    }

    #[test]
    fn test_convert_without_back_matter() {
        let options = ParseOptions::default().with_back_matter(false);
        let bib = Bibliography::parse(BIB);
        let doc = convert_str_with_options("See \\cite{smith2020}.", &bib, &options);
        assert_eq!(doc.block_count(), 1);
    }

    #[test]
    fn test_convert_files_lenient_missing_file() {
        let first = temp_source(b"\\chapter{One}\n\nText.");
        let paths = vec![first.path().to_path_buf(), PathBuf::from("/nonexistent/two.tex")];

        let doc = convert_files(&paths, &Bibliography::new(), &ParseOptions::default()).unwrap();
        assert_eq!(doc.counters.chapter, 1);
        assert_eq!(doc.blocks.last(), Some(&Block::PageBreak));
    }

    #[test]
    fn test_convert_files_strict_missing_file() {
        let options = ParseOptions::new().strict();
        let result = convert_files(&["/nonexistent/chapter.tex"], &Bibliography::new(), &options);
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_convert_files_cp1252() {
        let file = temp_source(b"\\section{Introdu\xE7\xE3o}");
        let doc =
            convert_files(&[file.path()], &Bibliography::new(), &ParseOptions::default()).unwrap();
        assert_eq!(doc.headings().next().unwrap().text, "Introdução");
    }

    #[test]
    fn test_convert_batch_keeps_order() {
        let a = temp_source(b"\\chapter{Alpha}");
        let b = temp_source(b"\\chapter{Beta}\n\n\\chapter{Gamma}");
        let jobs = vec![vec![a.path().to_path_buf()], vec![b.path().to_path_buf()]];
        let bib = Bibliography::new();

        for options in [ParseOptions::default(), ParseOptions::default().with_parallel(false)] {
            let results = convert_batch(&jobs, &bib, &options);
            let chapters: Vec<u32> = results
                .into_iter()
                .map(|r| r.unwrap().counters.chapter)
                .collect();
            assert_eq!(chapters, vec![1, 2]);
        }
    }

    #[test]
    fn test_untex_parse_str() {
        let result = Untex::new()
            .with_chapter_label("Chapter")
            .parse_str("\\chapter{Intro}\n\nSee \\cite{smith2020}.", BIB);

        let markdown = result.to_markdown().unwrap();
        assert!(markdown.starts_with("# Chapter 1: Intro\n\nSee (Smith, 2020)."));
        assert!(markdown.contains("# References"));
        assert_eq!(result.stats().chapter_count, 1);
        assert_eq!(result.stats().bibliography_count, 1);
    }

    #[test]
    fn test_untex_parse_with_bibliography_file() {
        let bib = temp_source(BIB.as_bytes());
        let chapter = temp_source(b"As shown \\cite{smith2020}.");

        let result = Untex::new()
            .with_bibliography(bib.path())
            .without_back_matter()
            .parse(&[chapter.path()])
            .unwrap();
        assert_eq!(result.to_text().unwrap(), "As shown (Smith, 2020).");
    }

    #[test]
    fn test_extract_text() {
        let file = temp_source(b"\\chapter{One}\n\nBody \\textbf{bold}.");
        let text = extract_text(&[file.path()]).unwrap();
        assert_eq!(text, "1 One\n\nBody bold.");
    }
}
