//! Plain-text reference formatting.
//!
//! Formatted references use `*...*` around journal and book titles so the
//! inline tokenizer turns them into italic runs.

use super::entry::{BibEntry, EntryType};

/// Format a bibliography entry as an author-year reference.
///
/// Missing author and title fall back to `Unknown Author` and `Untitled`.
/// The year comes from `date` (truncated at the first hyphen), then `year`,
/// then `n.d.`. Only the first of several authors is kept.
pub fn format_reference(entry: &BibEntry) -> String {
    let mut author = clean(entry.field("author").unwrap_or("Unknown Author"));
    if let Some((first, _)) = author.split_once(" and ") {
        author = first.trim().to_string();
    }
    let title = clean(entry.field("title").unwrap_or("Untitled"));
    let mut year = clean(entry.first_field(&["date", "year"]).unwrap_or("n.d."));
    if let Some((head, _)) = year.split_once('-') {
        year = head.trim().to_string();
    }

    match entry.entry_type {
        EntryType::Article => {
            let mut reference = format!("{author} ({year}). {title}.");
            if let Some(journal) = optional(entry, &["journaltitle", "journal"]) {
                reference.push_str(&format!(" *{journal}*"));
            }
            if let Some(volume) = optional(entry, &["volume"]) {
                reference.push_str(&format!(", {volume}"));
            }
            if let Some(pages) = optional(entry, &["pages"]) {
                reference.push_str(&format!(", {pages}"));
            }
            reference.push('.');
            reference
        }
        EntryType::Book => {
            let mut reference = format!("{author} ({year}). *{title}*.");
            if let Some(publisher) = optional(entry, &["publisher"]) {
                match optional(entry, &["location", "address"]) {
                    Some(location) => reference.push_str(&format!(" {location}: {publisher}.")),
                    None => reference.push_str(&format!(" {publisher}.")),
                }
            }
            reference
        }
        EntryType::InProceedings | EntryType::InCollection => {
            let mut reference = format!("{author} ({year}). {title}.");
            if let Some(booktitle) = optional(entry, &["booktitle"]) {
                reference.push_str(" In");
                if let Some(editor) = optional(entry, &["editor"]) {
                    reference.push_str(&format!(" {editor} (Ed.),"));
                }
                reference.push_str(&format!(" *{booktitle}*."));
            }
            reference
        }
        EntryType::Other(_) => format!("{author} ({year}). {title}."),
    }
}

fn optional(entry: &BibEntry, names: &[&str]) -> Option<String> {
    entry
        .first_field(names)
        .map(clean)
        .filter(|value| !value.is_empty())
}

fn clean(value: &str) -> String {
    value.replace(['{', '}'], "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article() {
        let entry = BibEntry::new("smith2020", EntryType::Article)
            .with_field("author", "Smith, John")
            .with_field("title", "A Study")
            .with_field("journal", "J. Tests")
            .with_field("year", "2020");

        assert_eq!(
            format_reference(&entry),
            "Smith, John (2020). A Study. *J. Tests*."
        );
    }

    #[test]
    fn test_article_volume_pages_and_journaltitle() {
        let entry = BibEntry::new("k", EntryType::Article)
            .with_field("author", "Costa, Ana and Lima, Rui")
            .with_field("title", "{Quality} of Data")
            .with_field("journal", "Ignored")
            .with_field("journaltitle", "Data Review")
            .with_field("volume", "12")
            .with_field("pages", "1--20")
            .with_field("date", "2019-05-01");

        assert_eq!(
            format_reference(&entry),
            "Costa, Ana (2019). Quality of Data. *Data Review*, 12, 1--20."
        );
    }

    #[test]
    fn test_book() {
        let entry = BibEntry::new("k", EntryType::Book)
            .with_field("author", "Doe, Jane")
            .with_field("title", "Big Book")
            .with_field("publisher", "Press")
            .with_field("address", "Porto")
            .with_field("year", "2001");
        assert_eq!(
            format_reference(&entry),
            "Doe, Jane (2001). *Big Book*. Porto: Press."
        );

        let entry = BibEntry::new("k", EntryType::Book).with_field("publisher", "Press");
        assert_eq!(
            format_reference(&entry),
            "Unknown Author (n.d.). *Untitled*. Press."
        );
    }

    #[test]
    fn test_inproceedings() {
        let entry = BibEntry::new("k", EntryType::InProceedings)
            .with_field("author", "Roe, R.")
            .with_field("title", "Talk")
            .with_field("booktitle", "Proc. X")
            .with_field("editor", "Ed, E.")
            .with_field("year", "2015");
        assert_eq!(
            format_reference(&entry),
            "Roe, R. (2015). Talk. In Ed, E. (Ed.), *Proc. X*."
        );

        let entry = BibEntry::new("k", EntryType::InCollection)
            .with_field("author", "Roe, R.")
            .with_field("title", "Chapter")
            .with_field("booktitle", "Collected")
            .with_field("year", "2015");
        assert_eq!(
            format_reference(&entry),
            "Roe, R. (2015). Chapter. In *Collected*."
        );
    }

    #[test]
    fn test_other_type() {
        let entry = BibEntry::new("k", EntryType::from_name("misc"))
            .with_field("author", "Web, Site")
            .with_field("title", "Page");
        assert_eq!(format_reference(&entry), "Web, Site (n.d.). Page.");
    }
}
