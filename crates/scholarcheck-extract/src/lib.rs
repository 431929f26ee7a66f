//! Locates candidate publication entries inside a larger document and
//! filters out fabricated or templated entries before they reach the
//! verification pipeline.
//!
//! The intelligence of the extraction step is delegated to an external
//! text-generation collaborator behind [`generator::TextGenerator`]; this
//! crate owns everything deterministic around it: segmentation, output
//! repair, validation, and near-duplicate collapse.

pub mod extractor;
pub mod filter;
pub mod generator;
pub mod repair;
pub mod section;

pub use extractor::PublicationExtractor;
pub use generator::{GeneratorError, TextGenerator};

/// Knobs for the deterministic half of extraction.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Entries with raw text shorter than this are dropped.
    pub min_entry_chars: usize,
    /// Titles whose strict-normalized form is shorter than this must be
    /// literally present in the source document.
    pub min_plausible_title_chars: usize,
    /// Similarity above which two entries are considered duplicates.
    pub dedup_threshold: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_entry_chars: 40,
            min_plausible_title_chars: 25,
            dedup_threshold: 98.0,
        }
    }
}
