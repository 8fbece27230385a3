//! Structural segmentation of LaTeX manuscripts.
//!
//! The [`Converter`] owns all bookkeeping of one conversion (blocks, section
//! counters, citation sets, metadata). Sources are split on blank lines and
//! each block goes through the classifiers in priority order:
//!
//! 1. page break only
//! 2. sectioning command (chapter down to paragraph)
//! 3. structural commands (dropped)
//! 4. formal or bare tables
//! 5. definitions
//! 6. list introductions
//! 7. informal tables
//! 8. plain paragraph
//!
//! A block holding a sectioning command is split around the leftmost one:
//! the text before it, the heading and the text after it are handled in
//! that order, so headings are numbered in document order.

use std::sync::LazyLock;

use regex::Regex;

use crate::bib::Bibliography;
use crate::citation::CitationResolver;
use crate::model::{
    Block, CitationState, Document, Heading, HeadingLevel, Paragraph, ParagraphStyle,
    SectionCounters, StyledRun,
};

use super::classify::{self, HeadingMatch};
use super::cleanup::{remove_noise, strip_comments, CleanupPipeline};
use super::inline::tokenize;
use super::options::ParseOptions;
use super::table_detector::{Segment, TableDetector};

static BLOCK_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").expect("valid block separator regex"));

const HEADING_LEVELS: [HeadingLevel; 5] = [
    HeadingLevel::Chapter,
    HeadingLevel::Section,
    HeadingLevel::Subsection,
    HeadingLevel::Subsubsection,
    HeadingLevel::Paragraph,
];

/// Conversion context for one run.
///
/// # Example
/// ```
/// use untex::{Bibliography, Converter, ParseOptions};
///
/// let bib = Bibliography::parse("@article{smith2020, author={Smith, J.}, title={Title X}, journal={Journal}, year={2020}}");
/// let mut converter = Converter::new(&bib, ParseOptions::default());
/// converter.push_source("\\chapter{Intro}\n\nSee \\cite{smith2020}.");
/// let doc = converter.finish();
/// assert_eq!(doc.blocks.len(), 2);
/// ```
pub struct Converter<'a> {
    bibliography: &'a Bibliography,
    resolver: CitationResolver<'a>,
    options: ParseOptions,
    detector: TableDetector,
    prose: CleanupPipeline,
    plain: CleanupPipeline,
    document: Document,
    sources: usize,
}

impl<'a> Converter<'a> {
    /// Create a converter over a read-only bibliography.
    pub fn new(bibliography: &'a Bibliography, options: ParseOptions) -> Self {
        Self {
            bibliography,
            resolver: CitationResolver::new(bibliography),
            detector: TableDetector::with_config(options.table.clone()),
            options,
            prose: CleanupPipeline::prose(),
            plain: CleanupPipeline::plain(),
            document: Document::new(),
            sources: 0,
        }
    }

    /// Convert one source (a chapter file, for example) and append its
    /// blocks. Sources after the first are separated by a page break.
    pub fn push_source(&mut self, text: &str) {
        if self.sources > 0 {
            self.page_break();
        }
        self.sources += 1;

        let text = text.replace("\r\n", "\n");
        for block in BLOCK_SEPARATOR.split(&text) {
            self.push_block(block);
        }
    }

    /// Classify one block and append what it produces.
    pub fn push_block(&mut self, raw: &str) {
        let block = remove_noise(&strip_comments(raw));
        let block = block.trim();
        if block.is_empty() {
            return;
        }

        self.capture_metadata(block);

        if classify::is_page_break(block) {
            self.page_break();
            return;
        }

        if let Some(found) = classify::find_heading(block, &HEADING_LEVELS) {
            self.push_heading(found);
            return;
        }

        if classify::is_structural(block) {
            log::debug!("Skipping structural block: {}", preview(block));
            return;
        }

        let text = self.resolver.resolve(block, &mut self.document.citations);

        if self.detector.contains_table(&text) {
            log::debug!("Table signature in block: {}", preview(block));
            for segment in self.detector.extract(&text) {
                match segment {
                    Segment::Table(table) => self.document.add_block(Block::Table(table)),
                    Segment::Prose(prose) => self.push_paragraph(&prose, ParagraphStyle::Normal),
                }
            }
            return;
        }

        if classify::is_definition(&text, &self.options.definition_phrases) {
            self.push_paragraph(&text, ParagraphStyle::Definition);
            return;
        }

        if classify::is_list_intro(&text, &self.options.list_phrases) {
            self.push_paragraph(&text, ParagraphStyle::List);
            return;
        }

        if self.detector.is_informal_table(&text) {
            if let Some(table) = self.detector.parse_informal(&text) {
                log::debug!("Informal table with {} rows", table.row_count());
                self.document.add_block(Block::Table(table));
                return;
            }
        }

        self.push_paragraph(&text, ParagraphStyle::Normal);
    }

    /// Append a page break.
    pub fn page_break(&mut self) {
        self.document.add_block(Block::PageBreak);
    }

    /// Append the references section: a page break, an unnumbered chapter
    /// heading and one entry per resolved citation in key order.
    ///
    /// Nothing is appended when no citation resolved.
    pub fn append_bibliography(&mut self) {
        let references: Vec<String> = self
            .document
            .citations
            .resolved()
            .filter_map(|key| self.bibliography.resolve(key))
            .map(|reference| reference.display_text)
            .collect();
        if references.is_empty() {
            return;
        }

        self.page_break();
        let title = self.options.references_title.clone();
        self.document
            .add_block(Block::Heading(Heading::unnumbered(HeadingLevel::Chapter, title)));
        for reference in references {
            self.push_paragraph(&reference, ParagraphStyle::Bibliography);
        }
        log::info!("Appended references section");
    }

    /// Append the missing references report: a page break, an unnumbered
    /// chapter heading, an explanation and one highlighted entry per
    /// missing key.
    ///
    /// Nothing is appended when every citation resolved.
    pub fn append_missing_report(&mut self) {
        if !self.document.citations.has_missing() {
            return;
        }

        self.page_break();
        let title = self.options.missing_references_title.clone();
        self.document
            .add_block(Block::Heading(Heading::unnumbered(HeadingLevel::Chapter, title)));
        self.document.add_block(Block::Paragraph(Paragraph::with_text(
            self.options.missing_references_note.clone(),
        )));

        let missing: Vec<String> = self.document.citations.missing.iter().cloned().collect();
        log::warn!("{} citation keys not found in bibliography", missing.len());
        for key in missing {
            self.document.add_block(Block::Paragraph(Paragraph::from_runs(
                vec![StyledRun::plain("\u{2022} "), StyledRun::missing_ref(key)],
                ParagraphStyle::Normal,
            )));
        }
    }

    /// Blocks produced so far.
    pub fn blocks(&self) -> &[Block] {
        &self.document.blocks
    }

    /// Citation bookkeeping so far.
    pub fn citations(&self) -> &CitationState {
        &self.document.citations
    }

    /// Current section counters.
    pub fn counters(&self) -> &SectionCounters {
        &self.document.counters
    }

    /// Finish the conversion and take the document.
    pub fn finish(self) -> Document {
        log::info!(
            "Converted {} blocks, {} citations ({} missing)",
            self.document.block_count(),
            self.document.citations.cited.len(),
            self.document.citations.missing.len()
        );
        self.document
    }

    fn push_heading(&mut self, found: HeadingMatch) {
        if !found.before.is_empty() {
            self.push_block(&found.before);
        }

        let number_path = if found.starred {
            Vec::new()
        } else {
            self.document
                .counters
                .advance(found.level, self.options.number_subsubsections)
        };

        let title = self.resolver.resolve(&found.title, &mut self.document.citations);
        let text = self.plain.process(&title);
        log::debug!("{} heading: {}", found.level.style_name(), text);
        self.document
            .add_block(Block::Heading(Heading::new(found.level, number_path, text)));

        if !found.after.is_empty() {
            self.push_block(&found.after);
        }
    }

    fn push_paragraph(&mut self, text: &str, style: ParagraphStyle) {
        let cleaned = self.prose.process(text);
        let runs = tokenize(&cleaned);
        if !runs.is_empty() {
            self.document
                .add_block(Block::Paragraph(Paragraph::from_runs(runs, style)));
        }
    }

    fn capture_metadata(&mut self, block: &str) {
        let metadata = &mut self.document.metadata;
        let mut new_title = None;

        for (name, field) in [
            ("title", &mut metadata.title),
            ("author", &mut metadata.author),
            ("date", &mut metadata.date),
        ] {
            if field.is_some() {
                continue;
            }
            if let Some(value) = classify::command_argument(block, name) {
                let value = self.plain.process(&value);
                if value.is_empty() {
                    continue;
                }
                if name == "title" {
                    new_title = Some(value.clone());
                }
                *field = Some(value);
            }
        }

        if let (true, Some(title)) = (self.options.emit_title, new_title) {
            self.document.add_block(Block::Paragraph(
                Paragraph::with_text(title).styled(ParagraphStyle::Title),
            ));
        }
    }
}

fn preview(text: &str) -> String {
    text.chars().take(60).collect()
}
