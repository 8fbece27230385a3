//! LaTeX parsing module.

pub mod classify;
pub mod cleanup;
pub mod inline;
mod options;
mod segmenter;
mod table_detector;

pub use cleanup::{remove_noise, strip_comments, CleanupMode, CleanupPipeline};
pub use inline::{strip_markers, tokenize, tokenize_paragraph};
pub use options::{ErrorMode, ParseOptions};
pub use segmenter::Converter;
pub use table_detector::{Segment, TableDetector, TableDetectorConfig};
