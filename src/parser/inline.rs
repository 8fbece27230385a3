//! Inline markup tokenizer.
//!
//! Cleaned text carries three kinds of inline markers: missing-reference
//! sentinels, `**bold**` and `*italic*`. The tokenizer is a small lexer
//! driven by a fixed precedence table; each pass splits only the runs that
//! are still plain after the previous passes, so formatting never nests.

use crate::citation::MISSING_REF;
use crate::model::{Paragraph, ParagraphStyle, RunStyle, StyledRun};
use regex::Regex;
use std::sync::LazyLock;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid bold regex"));

static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*]+)\*").expect("valid italic regex"));

/// Passes in precedence order.
static PRECEDENCE: [(RunStyle, &LazyLock<Regex>); 3] = [
    (RunStyle::MissingRef, &MISSING_REF),
    (RunStyle::Bold, &BOLD),
    (RunStyle::Italic, &ITALIC),
];

/// Split cleaned text into styled runs.
///
/// Leading whitespace of the first run and trailing whitespace of the last
/// run are trimmed; interior spacing is kept as written. Control characters
/// that cannot appear in XML are removed.
pub fn tokenize(text: &str) -> Vec<StyledRun> {
    let mut runs = vec![StyledRun::plain(text)];

    for (style, pattern) in PRECEDENCE.iter() {
        runs = runs
            .into_iter()
            .flat_map(|run| match run.style {
                RunStyle::Plain => split_plain(&run.text, *style, pattern),
                _ => vec![run],
            })
            .collect();
    }

    assemble(runs, text)
}

/// Tokenize text into a paragraph with the given style.
pub fn tokenize_paragraph(text: &str, style: ParagraphStyle) -> Paragraph {
    Paragraph::from_runs(tokenize(text), style)
}

/// Remove bold and italic markers, keeping their content.
pub fn strip_markers(text: &str) -> String {
    let text = BOLD.replace_all(text, "$1");
    ITALIC.replace_all(&text, "$1").into_owned()
}

/// Split one plain segment on every leftmost, non-overlapping match.
fn split_plain(text: &str, style: RunStyle, pattern: &Regex) -> Vec<StyledRun> {
    let mut out = Vec::new();
    let mut last = 0;

    for caps in pattern.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            out.push(StyledRun::plain(&text[last..whole.start()]));
        }
        if !inner.as_str().is_empty() {
            out.push(StyledRun::new(inner.as_str(), style));
        }
        last = whole.end();
    }

    if last < text.len() {
        out.push(StyledRun::plain(&text[last..]));
    }
    out
}

fn assemble(runs: Vec<StyledRun>, source: &str) -> Vec<StyledRun> {
    let mut runs: Vec<StyledRun> = runs
        .into_iter()
        .map(|mut run| {
            run.text.retain(|c| !is_xml_incompatible(c));
            run
        })
        .filter(|run| !run.is_empty())
        .collect();

    while let Some(first) = runs.first_mut() {
        let trimmed = first.text.trim_start();
        if trimmed.is_empty() {
            runs.remove(0);
        } else {
            first.text = trimmed.to_string();
            break;
        }
    }
    while let Some(last) = runs.last_mut() {
        let trimmed = last.text.trim_end();
        if trimmed.is_empty() {
            runs.pop();
        } else {
            last.text = trimmed.to_string();
            break;
        }
    }

    if runs.is_empty() {
        let fallback: String = source.chars().filter(|c| !is_xml_incompatible(*c)).collect();
        let fallback = fallback.trim();
        if !fallback.is_empty() {
            runs.push(StyledRun::plain(fallback));
        }
    }
    runs
}

/// Control characters outside the XML 1.0 character range.
fn is_xml_incompatible(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{7F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}
