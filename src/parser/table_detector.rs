//! Table detection in LaTeX source.
//!
//! Three paths, tried by the converter in this order:
//! - formal: `tabular`-family environments, split on `\\` and `&`;
//! - bare: runs of `a & b & c \\` lines outside any environment;
//! - informal: prose lines that read like a table of contents
//!   ("Chapter 2: Methodology"), recognised by topic keywords.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::bib::matching_brace;
use crate::model::Table;

use super::cleanup::CleanupPipeline;

static FORMAL_BEGIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\begin\{(table|tabular|longtable|array)(\*?)\}").expect("valid table begin regex")
});

static BARE_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&.*&.*\\\\").expect("valid bare row regex"));

static ROW_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\\\(?:\[[^\]]*\])?").expect("valid row end regex"));

static RULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\\(?:hline|toprule|midrule|bottomrule|endhead|endfirsthead|endfoot|endlastfoot)\b|\\cline\{[^}]*\}|\\cmidrule(?:\([^)]*\))?\{[^}]*\}",
    )
    .expect("valid rule regex")
});

static ENV_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\begin\{[^}]*\}(?:\[[^\]]*\])?(?:\{(?:[^{}]|\{[^{}]*\})*\})?|\\end\{[^}]*\}")
        .expect("valid environment marker regex")
});

static FLOAT_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?:centering|small|footnotesize|scriptsize)\b|\\label\{[^}]*\}")
        .expect("valid float noise regex")
});

static MULTI_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\multi(?:column|row)\{[^}]*\}\{[^}]*\}").expect("valid multicolumn regex")
});

/// Thresholds and vocabulary for table detection.
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    /// Minimum number of qualifying lines (and rows) to consider as table
    pub min_rows: usize,
    /// Minimum whitespace-separated tokens for a loose or informal line
    pub min_tokens: usize,
    /// Minimum words for an informal row once the block is accepted
    pub min_row_words: usize,
    /// Keywords that make a prose line look tabular (lowercase)
    pub topic_keywords: Vec<String>,
    /// Keywords that select rows of an accepted informal table (lowercase)
    pub row_keywords: Vec<String>,
    /// Sentence-opening words that disqualify a line (lowercase)
    pub stopwords: Vec<String>,
    /// Keywords that mark a first cell as a header (lowercase)
    pub header_keywords: Vec<String>,
    /// Labels of a synthesized header
    pub header_labels: Vec<String>,
    /// Label prefix for synthesized columns past `header_labels`
    pub column_label: String,
}

fn strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_tokens: 3,
            min_row_words: 2,
            topic_keywords: strings(&[
                "capítulo", "conteúdo", "questões", "principal",
                "chapter", "content", "questions", "main",
            ]),
            row_keywords: strings(&[
                "capítulo", "conteúdo", "questões", "principal", "metodologia", "resultados",
                "chapter", "content", "questions", "main", "methodology", "results",
            ]),
            stopwords: strings(&[
                "este", "esta", "o", "a", "um", "uma", "como", "para",
                "this", "the", "an", "as", "for",
            ]),
            header_keywords: strings(&["capítulo", "chapter"]),
            header_labels: strings(&["Chapter", "Content"]),
            column_label: "Column".to_string(),
        }
    }
}

/// A piece of a block after table extraction, in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Text outside any table, still raw LaTeX
    Prose(String),
    /// An extracted table
    Table(Table),
}

/// Detects and extracts tables from LaTeX blocks.
#[derive(Debug, Clone)]
pub struct TableDetector {
    config: TableDetectorConfig,
    cells: CleanupPipeline,
}

impl TableDetector {
    /// Create a new table detector with default configuration.
    pub fn new() -> Self {
        Self::with_config(TableDetectorConfig::default())
    }

    /// Create a new table detector with custom configuration.
    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self {
            config,
            cells: CleanupPipeline::plain(),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &TableDetectorConfig {
        &self.config
    }

    /// Check whether a block carries a formal environment or a bare row.
    pub fn contains_table(&self, text: &str) -> bool {
        FORMAL_BEGIN.is_match(text) || BARE_ROW.is_match(text)
    }

    /// Split a block into prose and tables.
    ///
    /// Formal environments are extracted first; without any, bare `&` rows
    /// are grouped. A span that yields no table data is kept as prose.
    pub fn extract(&self, text: &str) -> Vec<Segment> {
        let spans = self.find_formal_spans(text);
        if spans.is_empty() {
            return self.split_bare_rows(text);
        }

        let mut segments = Vec::new();
        let mut last = 0;
        for span in spans {
            push_prose(&mut segments, &text[last..span.start]);
            let raw = &text[span.clone()];
            match self.parse_formal(raw).or_else(|| self.parse_loose(raw)) {
                Some(table) => {
                    log::debug!(
                        "TableDetector: formal table {}x{}",
                        table.row_count(),
                        table.column_count()
                    );
                    segments.push(Segment::Table(table));
                }
                None => {
                    log::debug!("TableDetector: no table data in formal span");
                    push_prose(&mut segments, raw);
                }
            }
            last = span.end;
        }
        push_prose(&mut segments, &text[last..]);
        segments
    }

    /// Byte ranges of table environments, in document order.
    ///
    /// Each range runs from the leftmost `\begin{...}` to the first matching
    /// `\end{...}`; an environment without an end is ignored.
    pub fn find_formal_spans(&self, text: &str) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        let mut pos = 0;

        while let Some(caps) = FORMAL_BEGIN.captures_at(text, pos) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            let end_marker = format!("\\end{{{}{}}}", name.as_str(), &caps[2]);
            match text[whole.end()..].find(&end_marker) {
                Some(offset) => {
                    let end = whole.end() + offset + end_marker.len();
                    spans.push(whole.start()..end);
                    pos = end;
                }
                None => {
                    log::debug!("TableDetector: unterminated {} environment", name.as_str());
                    pos = whole.end();
                }
            }
        }
        spans
    }

    /// Parse a formal environment span into a table.
    pub fn parse_formal(&self, span: &str) -> Option<Table> {
        let (caption, body) = take_caption(span);
        let body = RULE.replace_all(&body, "");
        let body = ENV_MARKER.replace_all(&body, "");
        let body = FLOAT_NOISE.replace_all(&body, "");

        let rows: Vec<Vec<String>> = ROW_END
            .split(&body)
            .map(str::trim)
            .filter(|row| split_cells(row).len() > 1)
            .map(|row| self.clean_cells(split_cells(row)))
            .collect();

        if rows.is_empty() {
            return None;
        }

        let table = Table::from_rows(rows);
        Some(match caption {
            Some(caption) => table.with_caption(self.cells.process(&caption)),
            None => table,
        })
    }

    /// Fallback for a span with no `\\`/`&` grid: keep lines that look like
    /// data (`&` or enough tokens) and split them.
    pub fn parse_loose(&self, span: &str) -> Option<Table> {
        let lines: Vec<&str> = span
            .lines()
            .map(str::trim)
            .filter(|line| {
                line.contains('&')
                    || (line.split_whitespace().count() >= self.config.min_tokens
                        && !line.starts_with('\\'))
            })
            .collect();

        if lines.len() < self.config.min_rows {
            return None;
        }

        let rows: Vec<Vec<String>> = lines
            .into_iter()
            .map(|line| {
                if line.contains('&') {
                    let line = ROW_END.replace_all(line, "");
                    self.clean_cells(split_cells(&line))
                } else {
                    self.clean_cells(line.split_whitespace().collect())
                }
            })
            .filter(|cells| cells.iter().any(|c| !c.is_empty()))
            .collect();

        (!rows.is_empty()).then(|| Table::from_rows(rows))
    }

    /// Group contiguous `&` lines into tables; other lines stay prose.
    ///
    /// A group only becomes a table when one of its lines carries the full
    /// `a & b & c \\` signature.
    pub fn split_bare_rows(&self, text: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut prose: Vec<&str> = Vec::new();
        let mut group: Vec<&str> = Vec::new();

        let lines: Vec<&str> = text.lines().collect();
        for (i, &line) in lines.iter().enumerate() {
            let is_row = split_cells(line).len() > 1;
            if is_row {
                group.push(line);
            } else {
                prose.push(line);
            }

            let group_ends = !group.is_empty() && (!is_row || i + 1 == lines.len());
            if !group_ends {
                continue;
            }

            // The line that closed the group belongs after it
            let trailing = if is_row { None } else { prose.pop() };
            match self.parse_bare_group(&group) {
                Some(table) => {
                    push_prose(&mut segments, &prose.join("\n"));
                    prose.clear();
                    segments.push(Segment::Table(table));
                }
                None => prose.append(&mut group),
            }
            group.clear();
            prose.extend(trailing);
        }

        push_prose(&mut segments, &prose.join("\n"));
        segments
    }

    fn parse_bare_group(&self, group: &[&str]) -> Option<Table> {
        if !group.iter().any(|line| BARE_ROW.is_match(line)) {
            return None;
        }
        let rows: Vec<Vec<String>> = group
            .iter()
            .map(|line| {
                let line = RULE.replace_all(line, "");
                let line = ROW_END.replace_all(&line, "");
                self.clean_cells(split_cells(&line))
            })
            .collect();
        log::debug!("TableDetector: bare table with {} rows", rows.len());
        Some(Table::from_rows(rows))
    }

    /// Check whether prose reads like an informal table.
    ///
    /// Needs `min_rows` lines with at least `min_tokens` words that do not
    /// start with a command or a sentence-opening stopword and contain a
    /// topic keyword.
    pub fn is_informal_table(&self, text: &str) -> bool {
        let qualifying = text
            .lines()
            .map(str::trim)
            .filter(|line| self.is_informal_line(line))
            .count();
        qualifying >= self.config.min_rows
    }

    fn is_informal_line(&self, line: &str) -> bool {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.len() < self.config.min_tokens || line.starts_with('\\') {
            return false;
        }
        let Some(first) = words.first() else {
            return false;
        };
        let first = first
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if self.config.stopwords.iter().any(|s| *s == first) {
            return false;
        }
        let lower = line.to_lowercase();
        self.config.topic_keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    /// Build a table from informal prose lines.
    ///
    /// Each keyword line is cleaned and split on a colon, else on an en or
    /// em dash, else word by word (three words or fewer), else into the
    /// first two words and the rest. A generic header is prepended when the
    /// first row does not start with a header keyword.
    pub fn parse_informal(&self, text: &str) -> Option<Table> {
        let mut rows: Vec<Vec<String>> = Vec::new();

        for line in text.lines().map(str::trim) {
            if line.is_empty()
                || line.starts_with('\\')
                || line.split_whitespace().count() < self.config.min_row_words
            {
                continue;
            }
            let lower = line.to_lowercase();
            if !self.config.row_keywords.iter().any(|k| lower.contains(k.as_str())) {
                continue;
            }
            let clean = self.cells.process(line);
            if clean.is_empty() {
                continue;
            }
            let cells = split_informal(&clean);
            if cells.len() >= 2 {
                rows.push(cells);
            }
        }

        if rows.len() < self.config.min_rows {
            return None;
        }

        let has_header = rows[0].first().is_some_and(|cell| {
            let cell = cell.to_lowercase();
            self.config
                .header_keywords
                .iter()
                .any(|k| cell.contains(k.as_str()))
        });
        if !has_header {
            let width = rows.iter().map(Vec::len).max().unwrap_or(0);
            rows.insert(0, self.synthesized_header(width));
        }

        log::debug!("TableDetector: informal table with {} rows", rows.len());
        Some(Table::from_rows(rows))
    }

    fn synthesized_header(&self, width: usize) -> Vec<String> {
        let mut header = self.config.header_labels.clone();
        for i in header.len() + 1..=width {
            header.push(format!("{} {}", self.config.column_label, i));
        }
        header
    }

    fn clean_cells(&self, cells: Vec<&str>) -> Vec<String> {
        cells
            .into_iter()
            .map(|cell| {
                let cell = MULTI_SPAN.replace_all(cell, "");
                self.cells.process(&cell)
            })
            .collect()
    }
}

impl Default for TableDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a row on unescaped `&`.
fn split_cells(row: &str) -> Vec<&str> {
    let mut cells = Vec::new();
    let mut start = 0;
    let mut prev = None;
    for (i, c) in row.char_indices() {
        if c == '&' && prev != Some('\\') {
            cells.push(row[start..i].trim());
            start = i + 1;
        }
        prev = Some(c);
    }
    cells.push(row[start..].trim());
    cells
}

fn split_informal(line: &str) -> Vec<String> {
    let pieces: Vec<&str> = if line.contains(':') {
        line.split(':').collect()
    } else if line.contains(['\u{2013}', '\u{2014}']) {
        line.split(['\u{2013}', '\u{2014}']).collect()
    } else {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.len() <= 3 {
            words
        } else {
            return vec![words[..2].join(" "), words[2..].join(" ")];
        }
    };
    pieces.into_iter().map(|p| p.trim().to_string()).collect()
}

/// Remove `\caption{...}` and return its raw text.
fn take_caption(span: &str) -> (Option<String>, String) {
    let Some(start) = span.find("\\caption") else {
        return (None, span.to_string());
    };
    let after = &span[start + "\\caption".len()..];
    let Some(open) = after.find('{') else {
        return (None, span.to_string());
    };
    if !after[..open].trim().is_empty() && !after[..open].trim_start().starts_with('[') {
        return (None, span.to_string());
    }
    match matching_brace(&after[open..]) {
        Some(close) => {
            let caption = after[open + 1..open + close].to_string();
            let rest = format!("{}{}", &span[..start], &after[open + close + 1..]);
            (Some(caption), rest)
        }
        None => (None, span.to_string()),
    }
}

fn push_prose(segments: &mut Vec<Segment>, text: &str) {
    if !text.trim().is_empty() {
        segments.push(Segment::Prose(text.trim().to_string()));
    }
}
