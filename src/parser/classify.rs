//! Block classification predicates.
//!
//! Every function here is pure: it looks at one block of (comment-free)
//! LaTeX and answers a single question about it. The converter applies them
//! in a fixed priority order.

use std::sync::LazyLock;

use regex::Regex;

use crate::bib::matching_brace;
use crate::model::HeadingLevel;

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(chapter|section|subsection|subsubsection|paragraph)(\*?)\s*(?:\[[^\]]*\])?\s*\{")
        .expect("valid heading regex")
});

static STRUCTURAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\\(?:documentclass|usepackage|newcommand|renewcommand|providecommand|def|let",
        r"|input|include|includeonly|frenchspacing|raggedbottom|selectlanguage",
        r"|pagenumbering|pagestyle|cleardoublepage|thispagestyle|togglecommentblocks",
        r"|pagecolor|nopagecolor|addbibresource|appendix|bookmarksetup",
        r"|title|author|date|maketitle|tableofcontents|listoffigures|listoftables",
        r"|printbibliography|bibliography|bibliographystyle|frontmatter|mainmatter|backmatter)\b",
        r"|\\(?:begin|end)\{document\}",
    ))
    .expect("valid structural regex")
});

static METADATA_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(title|author|date)\b\s*(?:\[[^\]]*\])?\s*\{").expect("valid metadata regex")
});

static PAGE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\\(?:newpage|clearpage|pagebreak)\b\s*)+$").expect("valid page break regex")
});

/// A sectioning command found in a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingMatch {
    /// Heading depth
    pub level: HeadingLevel,
    /// Whether the starred (unnumbered) form was used
    pub starred: bool,
    /// Raw title argument
    pub title: String,
    /// Block text preceding the command
    pub before: String,
    /// Block text following the command's argument
    pub after: String,
}

/// Find the leftmost sectioning command of one of `levels` in `text`.
///
/// The optional short title (`\section[short]{long}`) is skipped; the long
/// title is returned. A command whose argument is unbalanced is ignored.
pub fn find_heading(text: &str, levels: &[HeadingLevel]) -> Option<HeadingMatch> {
    HEADING.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        let level = HeadingLevel::from_command(&caps[1])?;
        if !levels.contains(&level) {
            return None;
        }
        let open = whole.end() - 1;
        let close = open + matching_brace(&text[open..])?;

        Some(HeadingMatch {
            level,
            starred: &caps[2] == "*",
            title: text[open + 1..close].to_string(),
            before: text[..whole.start()].trim().to_string(),
            after: text[close + 1..].trim().to_string(),
        })
    })
}

/// Check whether a block carries a command that produces no content
/// (preamble, macro definitions, page style switches, front matter).
pub fn is_structural(text: &str) -> bool {
    STRUCTURAL.is_match(text)
}

/// Check whether a block consists only of page break commands.
pub fn is_page_break(text: &str) -> bool {
    PAGE_BREAK.is_match(text)
}

/// Case-insensitive check for any of `phrases` in `text`.
pub fn contains_phrase(text: &str, phrases: &[String]) -> bool {
    let lower = text.to_lowercase();
    phrases.iter().any(|p| lower.contains(&p.to_lowercase()))
}

/// Check whether a block introduces a definition.
pub fn is_definition(text: &str, phrases: &[String]) -> bool {
    contains_phrase(text, phrases)
}

/// Check whether a block introduces an enumeration.
pub fn is_list_intro(text: &str, phrases: &[String]) -> bool {
    contains_phrase(text, phrases)
}

/// Raw argument of the first `\name{...}` in `text`.
///
/// Only the metadata commands `title`, `author` and `date` are recognized;
/// any other name yields `None`.
pub fn command_argument(text: &str, name: &str) -> Option<String> {
    let whole = METADATA_COMMAND
        .captures_iter(text)
        .find(|caps| &caps[1] == name)?
        .get(0)?;
    let open = whole.end() - 1;
    let close = open + matching_brace(&text[open..])?;
    Some(text[open + 1..close].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTIONS: [HeadingLevel; 3] = [
        HeadingLevel::Section,
        HeadingLevel::Subsection,
        HeadingLevel::Subsubsection,
    ];

    fn phrases(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_find_chapter() {
        let m = find_heading("\\chapter{Introdução}\nFirst words.", &[HeadingLevel::Chapter]).unwrap();
        assert_eq!(m.level, HeadingLevel::Chapter);
        assert_eq!(m.title, "Introdução");
        assert!(m.before.is_empty());
        assert_eq!(m.after, "First words.");
        assert!(!m.starred);
    }

    #[test]
    fn test_find_section_levels() {
        let m = find_heading("\\subsubsection{Deep}", &SECTIONS).unwrap();
        assert_eq!(m.level, HeadingLevel::Subsubsection);

        let m = find_heading("\\subsection{Mid}", &SECTIONS).unwrap();
        assert_eq!(m.level, HeadingLevel::Subsection);

        assert!(find_heading("\\chapter{X}", &SECTIONS).is_none());
        assert!(find_heading("\\sectionmark{X}", &SECTIONS).is_none());
    }

    #[test]
    fn test_starred_and_short_title() {
        let m = find_heading("\\section*{Acknowledgements}", &SECTIONS).unwrap();
        assert!(m.starred);

        let m = find_heading("\\section[Short]{A {Long} Title}\\label{s}", &SECTIONS).unwrap();
        assert_eq!(m.title, "A {Long} Title");
        assert_eq!(m.after, "\\label{s}");
    }

    #[test]
    fn test_leftmost_heading_of_any_level() {
        let all = [
            HeadingLevel::Chapter,
            HeadingLevel::Section,
            HeadingLevel::Subsection,
            HeadingLevel::Subsubsection,
            HeadingLevel::Paragraph,
        ];
        let m = find_heading("Lead text.\\section{S}\\chapter{B} tail", &all).unwrap();
        assert_eq!(m.level, HeadingLevel::Section);
        assert_eq!(m.before, "Lead text.");
        assert_eq!(m.after, "\\chapter{B} tail");
    }

    #[test]
    fn test_unbalanced_heading_ignored() {
        assert!(find_heading("\\section{Broken", &SECTIONS).is_none());
    }

    #[test]
    fn test_is_structural() {
        assert!(is_structural("\\documentclass{book}"));
        assert!(is_structural("\\usepackage[utf8]{inputenc}"));
        assert!(is_structural("\\begin{document}"));
        assert!(is_structural("\\title{Thesis}\n\\author{Ana}"));
        assert!(!is_structural("Plain prose with \\textbf{bold}."));
        assert!(!is_structural("\\includegraphics{fig}"));
        assert!(!is_structural("\\definition of terms"));
    }

    #[test]
    fn test_is_page_break() {
        assert!(is_page_break("\\newpage"));
        assert!(is_page_break("  \\clearpage\n\\newpage "));
        assert!(!is_page_break("\\newpage Text"));
    }

    #[test]
    fn test_definition_phrases() {
        let defs = phrases(&["define-se", "is defined as"]);
        assert!(is_definition("Define-se qualidade como...", &defs));
        assert!(is_definition("Quality IS DEFINED AS fitness.", &defs));
        assert!(!is_definition("Nothing here.", &defs));
    }

    #[test]
    fn test_list_phrases() {
        let lists = phrases(&["são elas:", "are as follows:"]);
        assert!(is_list_intro("As etapas são elas: coleta e análise.", &lists));
        assert!(!is_list_intro("Steps follow.", &lists));
    }

    #[test]
    fn test_command_argument() {
        let text = "\\title{A {Nested} Title}\n\\author[short]{Ana Lima}";
        assert_eq!(command_argument(text, "title").as_deref(), Some("A {Nested} Title"));
        assert_eq!(command_argument(text, "author").as_deref(), Some("Ana Lima"));
        assert_eq!(command_argument(text, "date"), None);
    }

    #[test]
    fn test_command_argument_names() {
        let text = "\\titlepage\n\\title{Real}\n\\date{2024}";
        assert_eq!(command_argument(text, "title").as_deref(), Some("Real"));
        assert_eq!(command_argument(text, "date").as_deref(), Some("2024"));
        assert_eq!(command_argument("\\chapter{X}", "chapter"), None);
    }
}
