//! Markdown rendering for converted manuscripts.

use crate::error::Result;
use crate::model::{Block, Document, Heading, Paragraph, ParagraphStyle, RunStyle, StyledRun, Table};

use super::{heading_label, ExtractionStats, RenderOptions, RenderResult, Renderer};

/// Convert a document to Markdown.
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> Result<String> {
    MarkdownRenderer::new(options.clone()).render(doc)
}

/// Convert a document to Markdown with statistics.
pub fn to_markdown_with_stats(doc: &Document, options: &RenderOptions) -> Result<RenderResult> {
    MarkdownRenderer::new(options.clone()).render_with_stats(doc)
}

/// Markdown renderer.
///
/// Headings become ATX headings (chapters at level 1), bold and italic runs
/// keep their `**`/`*` markers, missing references are written as
/// `[?key]` and tables as GFM pipe tables.
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a document to Markdown with extraction statistics.
    pub fn render_with_stats(&self, doc: &Document) -> Result<RenderResult> {
        let content = self.render(doc)?;

        let mut stats = ExtractionStats::from_document(doc);
        stats.count_text(&content);

        Ok(RenderResult::new(content, doc.metadata.clone(), stats))
    }

    fn render_block(&self, output: &mut String, block: &Block) {
        match block {
            Block::Heading(h) => self.render_heading(output, h),
            Block::Paragraph(p) => self.render_paragraph(output, p),
            Block::Table(t) => self.render_table(output, t),
            Block::PageBreak => {
                if self.options.page_break_rule {
                    output.push_str("---\n\n");
                } else if !output.is_empty() && !output.ends_with("\n\n") {
                    output.push_str("\n\n");
                }
            }
        }
    }

    fn render_heading(&self, output: &mut String, heading: &Heading) {
        let level = (heading.level.depth() + 1).min(self.options.max_heading_level);
        output.push_str(&"#".repeat(level as usize));
        output.push(' ');
        output.push_str(&self.escape(&heading_label(heading, &self.options)));
        output.push_str("\n\n");
    }

    fn render_paragraph(&self, output: &mut String, para: &Paragraph) {
        if para.is_empty() {
            return;
        }
        if para.style == ParagraphStyle::Title {
            output.push_str("# ");
        }
        for run in &para.runs {
            self.render_run(output, run);
        }
        output.push_str("\n\n");
    }

    fn render_run(&self, output: &mut String, run: &StyledRun) {
        let text = self.escape(&run.text);
        match run.style {
            RunStyle::Plain => output.push_str(&text),
            RunStyle::Bold => output.push_str(&format!("**{}**", text)),
            RunStyle::Italic => output.push_str(&format!("*{}*", text)),
            RunStyle::MissingRef => {
                output.push_str(&format!("[{}{}]", self.options.missing_ref_marker, text))
            }
        }
    }

    fn render_table(&self, output: &mut String, table: &Table) {
        if table.is_empty() || table.column_count() == 0 {
            return;
        }

        if let Some(ref caption) = table.caption {
            output.push_str(&format!("*{}*\n\n", self.escape(caption)));
        }

        for (i, row) in table.rows.iter().enumerate() {
            output.push('|');
            for cell in row {
                let content = cell.replace('\n', " ");
                output.push_str(&format!(" {} |", self.escape(content.trim())));
            }
            output.push('\n');

            if i == table.header_row {
                output.push('|');
                for _ in row {
                    output.push_str(" --- |");
                }
                output.push('\n');
            }
        }

        output.push('\n');
    }

    fn escape(&self, text: &str) -> String {
        if self.options.escape_special_chars {
            escape_markdown(text)
        } else {
            text.to_string()
        }
    }
}

impl Renderer for MarkdownRenderer {
    type Output = String;

    fn render(&self, doc: &Document) -> Result<String> {
        let mut output = String::new();

        if self.options.include_frontmatter {
            output.push_str(&doc.metadata.to_yaml_frontmatter());
        }

        for block in &doc.blocks {
            self.render_block(&mut output, block);
        }

        Ok(output.trim().to_string())
    }
}

/// Escape special Markdown characters.
/// Only escape characters that could be misinterpreted as Markdown syntax.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}
