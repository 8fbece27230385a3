//! LaTeX-to-text cleanup pipeline.
//!
//! Runs after comment stripping and citation resolution. Styling commands
//! become inline markers (`**bold**`, `*italic*`) in prose mode and are
//! unwrapped in plain mode; every other command is either mapped to its
//! text equivalent or unwrapped, and braces are removed.

use crate::bib::matching_brace;
use crate::citation::{wrap_missing, MISSING_REF};
use crate::parser::inline::strip_markers;
use regex::{Captures, Regex};
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// How styling in the cleaned text is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupMode {
    /// Keep bold/italic as inline markers and missing-ref sentinels intact
    #[default]
    Prose,
    /// Unwrap styling, replace sentinels with raw keys and join lines
    /// (table cells, headings, captions, metadata)
    Plain,
}

const LBRACE: char = '\u{0002}';
const RBRACE: char = '\u{0003}';

/// Delimiters of a stashed missing-reference sentinel; the index between
/// them points into the keys taken out before cleanup.
const STASH_OPEN: char = '\u{E000}';
const STASH_CLOSE: char = '\u{E001}';

static STASHED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x{E000}(\d+)\x{E001}").expect("valid stash regex"));

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(^|[^\\])%.*$").expect("valid comment regex"));

static NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\\dictum\[[^\]]*\]\{[^}]*\}|\\vskip\s*-?[\d.]+\w*|\\RequirePackage(?:\[[^\]]*\])?\{[^}]*\}|\\frenchspacing\b|\\raggedbottom\b",
    )
    .expect("valid noise regex")
});

static STYLE_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(textbf|textit|emph|textsc|texttt|underline|textup|textrm|textsf|textmd|textnormal|mbox)\s*\{")
        .expect("valid style regex")
});

static DOTLESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\([ij])\b\s*").expect("valid dotless regex"));

static SYMBOL_ACCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\\([`'^"~=.])\s*(?:\{\s*([A-Za-z])\s*\}|([A-Za-z]))"#).expect("valid accent regex")
});

static LETTER_ACCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\([uvHckr])(?:\s*\{\s*([A-Za-z])\s*\}|\s+([A-Za-z]))").expect("valid accent regex")
});

static LETTER_MACRO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(ss|ae|AE|oe|OE|aa|AA|o|O)\b(?:\{\})?\s?").expect("valid letter regex")
});

/// Ordered literal rewrites applied after accents are composed.
static REPLACEMENTS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        // Unescaped tie before `\textasciitilde` introduces a literal one
        (r"(^|[^\\])~", "${1}\u{00A0}"),
        (r"\\\\(?:\[[^\]]*\])?", "\n"),
        (r"\\newline\b", "\n"),
        (r"\\(?:newpage|clearpage)\b", "\n\n"),
        (r"\\par\b", "\n\n"),
        (r"\\(?:noindent|indent)\b\s*", ""),
        (r"\\&", "&"),
        (r"\\\$", "$$"),
        (r"\\%", "%"),
        (r"\\_", "_"),
        (r"\\#", "#"),
        (r"\\textasciitilde\b(?:\{\})?", "~"),
        (r"\\textbackslash\b(?:\{\})?", "\\"),
        (r"\\(?:ldots|dots|textellipsis)\b(?:\{\})?", "..."),
        (r"\\LaTeX\b(?:\{\})?", "LaTeX"),
        (r"\\TeX\b(?:\{\})?", "TeX"),
        (r"\\[,;:]", " "),
        (r"\\(?:quad|qquad)\b", " "),
        (r"\\(?:xspace|@|/|!)", ""),
        (r"\\label\{[^}]*\}", ""),
        (r"\\(?:eq)?ref\{[^}]*\}", "[REF]"),
        (r"\\pageref\{[^}]*\}", "[PAGE]"),
        (r"\\(?:autocite|cite|textcite|parencite|citep|citet)\*?(?:\[[^\]]*\]){0,2}\{[^}]*\}", "[CITE]"),
        (r"\\item\b(?:\[([^\]]*)\])?\s*", "\n\u{2022} ${1}"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("valid replacement regex"),
            replacement,
        )
    })
    .collect()
});

/// Commands whose argument is layout and never text.
static DROPPED_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\\(?:hspace|vspace|includegraphics|bibliographystyle|setlength|addtolength|setcounter|addcontentsline|phantom|hphantom|vphantom)\*?(?:\[[^\]]*\])?(?:\{[^}]*\})+",
    )
    .expect("valid dropped command regex")
});

static TABULAR_SPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\begin\{(?:tabular|array|longtable)\*?\}(?:\[[^\]]*\])?\{(?:[^{}]|\{[^{}]*\})*\}")
        .expect("valid column spec regex")
});

static ENVIRONMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?:begin|end)\s*\{[^}]*\}(?:\[[^\]]*\])?").expect("valid environment regex")
});

static GENERIC_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\[A-Za-z@]+\*?(?:\[[^\]]*\])?\s?").expect("valid command regex")
});

static HORIZONTAL_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("valid space regex"));

static LINE_EDGE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^ +| +$").expect("valid line edge regex"));

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n+").expect("valid blank lines regex"));

/// Remove LaTeX comments: an unescaped `%` to the end of its line.
pub fn strip_comments(text: &str) -> String {
    COMMENT.replace_all(text, "$1").into_owned()
}

/// Remove template noise commands (`\dictum`, `\vskip`, `\RequirePackage`,
/// `\frenchspacing`, `\raggedbottom`).
pub fn remove_noise(text: &str) -> String {
    NOISE.replace_all(text, "").into_owned()
}

/// LaTeX-to-text cleanup.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanupPipeline {
    mode: CleanupMode,
}

impl CleanupPipeline {
    /// Create a pipeline with the given mode.
    pub fn new(mode: CleanupMode) -> Self {
        Self { mode }
    }

    /// Pipeline that keeps inline markers.
    pub fn prose() -> Self {
        Self::new(CleanupMode::Prose)
    }

    /// Pipeline that produces unstyled single-line text.
    pub fn plain() -> Self {
        Self::new(CleanupMode::Plain)
    }

    /// Clean `text`.
    pub fn process(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        let mut keys = Vec::new();
        let mut result = MISSING_REF
            .replace_all(text, |caps: &Captures| {
                keys.push(caps[1].to_string());
                format!("{STASH_OPEN}{}{STASH_CLOSE}", keys.len() - 1)
            })
            .into_owned();

        result = result.replace("\\{", &LBRACE.to_string());
        result = result.replace("\\}", &RBRACE.to_string());

        result = self.rewrite_styles(&result);
        result = compose_accents(&result);

        for (pattern, replacement) in REPLACEMENTS.iter() {
            result = pattern.replace_all(&result, *replacement).into_owned();
        }

        result = DROPPED_COMMAND.replace_all(&result, "").into_owned();
        result = TABULAR_SPEC.replace_all(&result, "").into_owned();
        result = ENVIRONMENT.replace_all(&result, "").into_owned();
        result = GENERIC_COMMAND.replace_all(&result, "").into_owned();
        result = result.replace(['{', '}'], "");

        result = result.replace("---", "\u{2014}").replace("--", "\u{2013}");
        result = result
            .replace("``", "\u{201C}")
            .replace("''", "\u{201D}")
            .replace('`', "\u{2018}");

        result = result.replace(LBRACE, "{").replace(RBRACE, "}");

        if self.mode == CleanupMode::Plain {
            result = result.replace('\n', " ");
        }

        self.restore_keys(&collapse_whitespace(&result), &keys)
    }

    /// Put stashed keys back: as sentinels in prose mode, bare in plain mode.
    fn restore_keys(&self, text: &str, keys: &[String]) -> String {
        if keys.is_empty() {
            return text.to_string();
        }
        STASHED
            .replace_all(text, |caps: &Captures| {
                let key = caps[1].parse::<usize>().ok().and_then(|i| keys.get(i));
                match (key, self.mode) {
                    (Some(key), CleanupMode::Prose) => wrap_missing(key),
                    (Some(key), CleanupMode::Plain) => key.clone(),
                    (None, _) => String::new(),
                }
            })
            .into_owned()
    }

    fn rewrite_styles(&self, text: &str) -> String {
        let mode = self.mode;
        rewrite_command(text, &STYLE_COMMAND, &|command, content| {
            if content.trim().is_empty() {
                return content.to_string();
            }
            // Inner markers are unwrapped so styles never nest
            match (mode, command) {
                (CleanupMode::Prose, "textbf") => wrap_styled(&strip_markers(content), "**"),
                (CleanupMode::Prose, "textit" | "emph") => {
                    wrap_styled(&strip_markers(content), "*")
                }
                _ => content.to_string(),
            }
        })
    }
}

/// Surround styled content with `marker`, leaving stashed missing keys and
/// edge whitespace outside the markers.
fn wrap_styled(content: &str, marker: &str) -> String {
    let mut out = String::with_capacity(content.len() + 2 * marker.len());
    let mut last = 0;
    for stashed in STASHED.find_iter(content) {
        out.push_str(&wrap_piece(&content[last..stashed.start()], marker));
        out.push_str(stashed.as_str());
        last = stashed.end();
    }
    out.push_str(&wrap_piece(&content[last..], marker));
    out
}

fn wrap_piece(piece: &str, marker: &str) -> String {
    let trimmed = piece.trim();
    if trimmed.is_empty() {
        return piece.to_string();
    }
    let start = piece.len() - piece.trim_start().len();
    let end = start + trimmed.len();
    format!("{}{marker}{trimmed}{marker}{}", &piece[..start], &piece[end..])
}

/// Rewrite every `\command{...}` matched by `pattern` (which must end with
/// the opening brace), innermost arguments first.
fn rewrite_command(text: &str, pattern: &Regex, wrap: &dyn Fn(&str, &str) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(caps) = pattern.captures(rest) {
        let Some(whole) = caps.get(0) else { break };
        let open = whole.end() - 1;
        match matching_brace(&rest[open..]) {
            Some(close) => {
                out.push_str(&rest[..whole.start()]);
                let inner = rewrite_command(&rest[open + 1..open + close], pattern, wrap);
                out.push_str(&wrap(&caps[1], &inner));
                rest = &rest[open + close + 1..];
            }
            None => {
                out.push_str(&rest[..whole.end()]);
                rest = &rest[whole.end()..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Compose accent commands into precomposed characters.
fn compose_accents(text: &str) -> String {
    let text = DOTLESS.replace_all(text, "$1");
    let text = SYMBOL_ACCENT.replace_all(&text, |caps: &Captures| accented(caps));
    let text = LETTER_ACCENT.replace_all(&text, |caps: &Captures| accented(caps));
    LETTER_MACRO
        .replace_all(&text, |caps: &Captures| {
            match &caps[1] {
                "ss" => "\u{00DF}",
                "ae" => "\u{00E6}",
                "AE" => "\u{00C6}",
                "oe" => "\u{0153}",
                "OE" => "\u{0152}",
                "aa" => "\u{00E5}",
                "AA" => "\u{00C5}",
                "o" => "\u{00F8}",
                _ => "\u{00D8}",
            }
            .to_string()
        })
        .into_owned()
}

fn accented(caps: &Captures) -> String {
    let base = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
    let mark = match &caps[1] {
        "`" => '\u{0300}',
        "'" => '\u{0301}',
        "^" => '\u{0302}',
        "~" => '\u{0303}',
        "=" => '\u{0304}',
        "u" => '\u{0306}',
        "." => '\u{0307}',
        "\"" => '\u{0308}',
        "r" => '\u{030A}',
        "H" => '\u{030B}',
        "v" => '\u{030C}',
        "c" => '\u{0327}',
        _ => '\u{0328}',
    };
    format!("{base}{mark}").nfc().collect()
}

fn collapse_whitespace(text: &str) -> String {
    let text = HORIZONTAL_SPACE.replace_all(text, " ");
    let text = LINE_EDGE_SPACE.replace_all(&text, "");
    let text = BLANK_LINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::wrap_missing;

    fn prose(text: &str) -> String {
        CleanupPipeline::prose().process(text)
    }

    fn plain(text: &str) -> String {
        CleanupPipeline::plain().process(text)
    }

    #[test]
    fn test_strip_comments_keeps_escaped_percent() {
        let text = "50\\% of cases % a remark\n% whole line\nnext";
        assert_eq!(strip_comments(text), "50\\% of cases \n\nnext");
    }

    #[test]
    fn test_remove_noise() {
        let text = "\\dictum[Author]{Quote}\\vskip 2em Text\\frenchspacing";
        assert_eq!(remove_noise(text), " Text");
    }

    #[test]
    fn test_styling_markers() {
        assert_eq!(prose("a \\textbf{bold} and \\emph{it}"), "a **bold** and *it*");
        assert_eq!(prose("\\textit{x} \\textsc{Caps}"), "*x* Caps");
        assert_eq!(plain("a \\textbf{bold} and \\emph{it}"), "a bold and it");
    }

    #[test]
    fn test_nested_styles_flattened() {
        assert_eq!(prose("\\textbf{a \\emph{b} c}"), "**a b c**");
        assert_eq!(prose("\\emph{see \\textbf{this}}"), "*see this*");
    }

    #[test]
    fn test_nested_braces_in_styling() {
        assert_eq!(prose("\\textbf{the {\\LaTeX} way}"), "**the LaTeX way**");
    }

    #[test]
    fn test_escapes() {
        assert_eq!(prose("R\\&D costs \\$5, 10\\% \\_x \\#1"), "R&D costs $5, 10% _x #1");
        assert_eq!(prose("set \\{a\\}"), "set {a}");
    }

    #[test]
    fn test_accents() {
        assert_eq!(prose("Introdu\\c{c}\\~ao"), "Introdução");
        assert_eq!(prose("caf\\'e na\\\"ive \\'{\\i}ndice"), "café naïve índice");
        assert_eq!(prose("Stra\\ss e"), "Straße");
    }

    #[test]
    fn test_ties_dashes_quotes() {
        assert_eq!(prose("Fig.~1"), "Fig.\u{00A0}1");
        assert_eq!(prose("1--2 and a---b"), "1\u{2013}2 and a\u{2014}b");
        assert_eq!(prose("``quoted''"), "\u{201C}quoted\u{201D}");
        assert_eq!(prose("\\textasciitilde"), "~");
    }

    #[test]
    fn test_references_and_labels() {
        assert_eq!(
            prose("See Section~\\ref{sec:a}\\label{x} on page \\pageref{p}."),
            "See Section\u{00A0}[REF] on page [PAGE]."
        );
        assert_eq!(prose("as \\cite{ } said"), "as [CITE] said");
    }

    #[test]
    fn test_line_breaks_and_paragraphs() {
        assert_eq!(prose("one\\\\two\\newline three"), "one\ntwo\nthree");
        assert_eq!(prose("a\\par b"), "a\n\nb");
        assert_eq!(prose("\\noindent Text \\ldots"), "Text ...");
    }

    #[test]
    fn test_unknown_commands_unwrapped() {
        assert_eq!(prose("\\url{http://x.org} and \\foo[opt]{bar}"), "http://x.org and bar");
        assert_eq!(prose("a\\hspace{1cm}b"), "ab");
        assert_eq!(prose("\\begin{center}Centered\\end{center}"), "Centered");
    }

    #[test]
    fn test_whitespace_collapse() {
        assert_eq!(prose("  a    b \n\n\n\n c  "), "a b\n\nc");
    }

    #[test]
    fn test_plain_mode_sentinels_and_lines() {
        let text = format!("x {} y\nz", wrap_missing("key1"));
        assert_eq!(plain(&text), "x key1 y z");
        assert_eq!(prose(&text), format!("x {} y\nz", wrap_missing("key1")));
    }

    #[test]
    fn test_missing_key_untouched_by_rewrites() {
        for key in ["smith--jones", "a~b", "x`y''", "k*1*"] {
            let text = format!("See ({}).", wrap_missing(key));
            assert_eq!(prose(&text), format!("See ({}).", wrap_missing(key)));
            assert_eq!(plain(&text), format!("See ({key})."));
        }
    }

    #[test]
    fn test_missing_key_inside_styling() {
        let text = format!("\\textbf{{see ({})}} now", wrap_missing("ghost"));
        assert_eq!(prose(&text), format!("**see (**{}**)** now", wrap_missing("ghost")));
        assert_eq!(plain(&text), "see (ghost) now");

        let text = format!("\\emph{{{}}}", wrap_missing("ghost"));
        assert_eq!(prose(&text), wrap_missing("ghost"));
    }

    #[test]
    fn test_style_markers_hug_content() {
        assert_eq!(prose("a \\textbf{ bold } b"), "a **bold** b");
    }

    #[test]
    fn test_items() {
        assert_eq!(prose("\\item First \\item[b)] Second"), "\u{2022} First\n\u{2022} b) Second");
    }
}
