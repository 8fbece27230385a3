//! Source encoding detection and reading with fallback.
//!
//! Manuscripts and `.bib` files written on different systems arrive in
//! different encodings. Decoding tries an ordered list of encodings and keeps
//! the first one that accepts the bytes.

use crate::error::{Error, Result};
use crate::parser::{ErrorMode, ParseOptions};
use std::fs;
use std::io;
use std::path::Path;

/// A text encoding understood by the source reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// UTF-8, with an optional byte order mark
    Utf8,
    /// Windows code page 1252 (rejects the five undefined bytes)
    Windows1252,
    /// ISO-8859-1; accepts any byte sequence
    Latin1,
}

impl Encoding {
    /// Default fallback order.
    pub const DEFAULT_FALLBACK: [Encoding; 3] =
        [Encoding::Utf8, Encoding::Windows1252, Encoding::Latin1];

    /// Canonical label of the encoding.
    pub fn label(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Windows1252 => "windows-1252",
            Encoding::Latin1 => "iso-8859-1",
        }
    }

    /// Decode bytes, returning `None` if they are not valid in this encoding.
    pub fn decode(&self, data: &[u8]) -> Option<String> {
        match self {
            Encoding::Utf8 => {
                let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
                std::str::from_utf8(data).ok().map(str::to_string)
            }
            Encoding::Windows1252 => data.iter().map(|&b| decode_cp1252(b)).collect(),
            Encoding::Latin1 => Some(data.iter().map(|&b| b as char).collect()),
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Code points for 0x80..=0x9F in windows-1252; `None` marks undefined bytes.
const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

fn decode_cp1252(byte: u8) -> Option<char> {
    match byte {
        0x80..=0x9F => CP1252_HIGH[(byte - 0x80) as usize],
        _ => Some(byte as char),
    }
}

/// Decode bytes with the first encoding in `encodings` that accepts them.
///
/// # Returns
/// * `Some((text, encoding))` for the first successful decode
/// * `None` if every encoding rejected the data
pub fn decode_with_fallback(data: &[u8], encodings: &[Encoding]) -> Option<(String, Encoding)> {
    encodings
        .iter()
        .find_map(|enc| enc.decode(data).map(|text| (text, *enc)))
}

/// Detect which encoding from `encodings` would be used for the data.
pub fn detect_encoding(data: &[u8], encodings: &[Encoding]) -> Option<Encoding> {
    decode_with_fallback(data, encodings).map(|(_, enc)| enc)
}

/// Read a text source from disk with encoding fallback.
///
/// In [`ErrorMode::Lenient`] (the default) a missing file or an
/// undecodable one is logged and read as empty text. In
/// [`ErrorMode::Strict`] both conditions are returned as errors.
///
/// # Example
/// ```no_run
/// use untex::detect::read_source;
/// use untex::ParseOptions;
///
/// let text = read_source("chapters/introduction.tex", &ParseOptions::default()).unwrap();
/// println!("{} bytes of LaTeX", text.len());
/// ```
pub fn read_source<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<String> {
    let path = path.as_ref();

    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if options.error_mode == ErrorMode::Lenient => {
            if e.kind() == io::ErrorKind::NotFound {
                log::warn!("File not found: {}", path.display());
            } else {
                log::warn!("Could not read {}: {}", path.display(), e);
            }
            return Ok(String::new());
        }
        Err(e) => return Err(e.into()),
    };

    match decode_with_fallback(&data, &options.encodings) {
        Some((text, encoding)) => {
            if encoding != Encoding::Utf8 {
                log::info!("Decoded {} as {}", path.display(), encoding);
            }
            Ok(text)
        }
        None if options.error_mode == ErrorMode::Lenient => {
            log::warn!(
                "Could not read file {} with any encoding",
                path.display()
            );
            Ok(String::new())
        }
        None => Err(Error::Encoding {
            path: path.to_path_buf(),
            tried: options
                .encodings
                .iter()
                .map(Encoding::label)
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_with_bom() {
        let data = b"\xEF\xBB\xBFIntrodu\xC3\xA7\xC3\xA3o";
        let (text, enc) = decode_with_fallback(data, &Encoding::DEFAULT_FALLBACK).unwrap();
        assert_eq!(text, "Introdução");
        assert_eq!(enc, Encoding::Utf8);
    }

    #[test]
    fn test_windows1252_fallback() {
        // "café" with smart quotes, encoded in cp1252
        let data = b"\x93caf\xE9\x94";
        let (text, enc) = decode_with_fallback(data, &Encoding::DEFAULT_FALLBACK).unwrap();
        assert_eq!(text, "\u{201C}café\u{201D}");
        assert_eq!(enc, Encoding::Windows1252);
    }

    #[test]
    fn test_latin1_accepts_undefined_cp1252_bytes() {
        let data = b"a\x81b";
        assert_eq!(Encoding::Windows1252.decode(data), None);
        assert_eq!(
            detect_encoding(data, &Encoding::DEFAULT_FALLBACK),
            Some(Encoding::Latin1)
        );
    }

    #[test]
    fn test_all_encodings_fail() {
        let data = b"\xFF\x81";
        assert_eq!(
            decode_with_fallback(data, &[Encoding::Utf8, Encoding::Windows1252]),
            None
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(Encoding::Utf8.label(), "utf-8");
        assert_eq!(Encoding::Windows1252.to_string(), "windows-1252");
    }
}
