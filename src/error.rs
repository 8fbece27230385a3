//! Error types for untex library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for untex operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading or rendering a manuscript.
///
/// The conversion core itself never fails: unresolved citations, unmatched
/// classifiers and malformed tables all degrade to plain text. Errors only
/// surface from I/O in strict mode and from renderers.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// None of the configured encodings could decode the source.
    #[error("Could not decode {path} with any of: {tried}")]
    Encoding {
        /// Source that failed to decode
        path: PathBuf,
        /// Comma-separated list of encodings that were tried
        tried: String,
    },

    /// The bibliography source could not be loaded.
    #[error("Bibliography error: {0}")]
    Bibliography(String),

    /// Error during rendering (Markdown, text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
