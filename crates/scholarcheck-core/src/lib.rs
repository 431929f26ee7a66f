use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod aggregator;
pub mod config_file;
pub mod engine;
pub mod name_match;
pub mod names;
pub mod profile;
pub mod rate_limit;
pub mod similarity;
pub mod source;
pub mod text;
pub mod verifier;

// Re-export for convenience
pub use aggregator::{AggregatedVerdict, PublicationReport};
pub use engine::{Engine, RunReport};
pub use name_match::matches_any;
pub use names::NameParts;
pub use profile::{AuthorCache, AuthorProfile, AuthorRecord};
pub use rate_limit::RateLimiters;
pub use similarity::similarity;
pub use verifier::SourceVerifier;

/// A claimed publication, as extracted from a candidate's document.
///
/// Immutable once handed to the verification pipeline. When a DOI is
/// present it takes precedence over title matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publication {
    pub title: String,
    pub doi: Option<String>,
    /// The raw entry text the claim was extracted from.
    pub raw_text: String,
}

/// Outcome of verifying one publication against one source.
///
/// Variants are ordered so that aggregation is `max()` over the lattice
/// `UnableToVerify < VerifiedDifferentAuthor < Verified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// No acceptable match found, or the source was unreachable.
    UnableToVerify,
    /// The publication was found but the candidate's authorship was not
    /// confirmed.
    VerifiedDifferentAuthor,
    /// Title and authorship both confirmed.
    Verified,
}

/// Best-match evidence from one source for one publication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRecord {
    pub source: String,
    pub matched_title: String,
    pub matched_doi: Option<String>,
    pub extracted_authors: Vec<String>,
    /// Per-source author identifier for the candidate, when their name
    /// matched a credited author and the source exposes one.
    pub candidate_author_id: Option<String>,
    /// Opaque follow-up locator (landing page, DOI URL).
    pub url: Option<String>,
}

/// Verdict from a single source for a single publication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationVerdict {
    pub source: String,
    pub status: VerificationStatus,
    pub details: Option<SourceRecord>,
}

impl VerificationVerdict {
    pub fn unable(source: &str) -> Self {
        Self {
            source: source.to_string(),
            status: VerificationStatus::UnableToVerify,
            details: None,
        }
    }
}

/// Per-source similarity thresholds (0–100). Sources prone to loosely
/// related results get higher thresholds.
#[derive(Debug, Clone)]
pub struct SourceThresholds {
    pub openalex: f64,
    pub crossref: f64,
    pub europepmc: f64,
    pub scholar: f64,
}

impl Default for SourceThresholds {
    fn default() -> Self {
        Self {
            openalex: 90.0,
            crossref: 90.0,
            europepmc: 92.0,
            scholar: 98.0,
        }
    }
}

impl SourceThresholds {
    pub fn for_source(&self, name: &str) -> f64 {
        match name {
            "OpenAlex" => self.openalex,
            "CrossRef" => self.crossref,
            "Europe PMC" => self.europepmc,
            "Scholar" => self.scholar,
            _ => 90.0,
        }
    }
}

/// Runtime configuration for the verification engine.
#[derive(Debug, Clone)]
pub struct Config {
    pub openalex_key: Option<String>,
    pub scholar_api_key: Option<String>,
    pub crossref_mailto: Option<String>,
    pub disabled_sources: Vec<String>,
    pub thresholds: SourceThresholds,
    /// Candidate records requested per source query.
    pub max_results: usize,
    pub query_timeout_secs: u64,
    /// Publications verified concurrently within one batch window.
    pub chunk_size: usize,
    /// Delay between batch windows (jittered).
    pub chunk_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openalex_key: None,
            scholar_api_key: None,
            crossref_mailto: None,
            disabled_sources: vec![],
            thresholds: SourceThresholds::default(),
            max_results: 5,
            query_timeout_secs: 10,
            chunk_size: 3,
            chunk_delay_ms: 1200,
        }
    }
}

impl Config {
    /// Overlay values from an on-disk config file onto the defaults.
    pub fn from_file(file: &config_file::ConfigFile) -> Self {
        let mut config = Self::default();
        if let Some(keys) = &file.api_keys {
            config.openalex_key = keys.openalex_key.clone();
            config.scholar_api_key = keys.scholar_api_key.clone();
            config.crossref_mailto = keys.crossref_mailto.clone();
        }
        if let Some(sources) = &file.sources {
            if let Some(disabled) = &sources.disabled {
                config.disabled_sources = disabled.clone();
            }
            if let Some(t) = sources.openalex_threshold {
                config.thresholds.openalex = t;
            }
            if let Some(t) = sources.crossref_threshold {
                config.thresholds.crossref = t;
            }
            if let Some(t) = sources.europepmc_threshold {
                config.thresholds.europepmc = t;
            }
            if let Some(t) = sources.scholar_threshold {
                config.thresholds.scholar = t;
            }
            if let Some(n) = sources.max_results {
                config.max_results = n;
            }
        }
        if let Some(v) = &file.verification {
            if let Some(secs) = v.query_timeout_secs {
                config.query_timeout_secs = secs;
            }
            if let Some(n) = v.chunk_size {
                config.chunk_size = n.max(1);
            }
            if let Some(ms) = v.chunk_delay_ms {
                config.chunk_delay_ms = ms;
            }
        }
        config
    }
}

/// Union of per-source author identifiers discovered for one candidate,
/// keyed by source name. First-write-wins within a run.
pub type AuthorIds = BTreeMap<String, String>;

#[cfg(test)]
mod status_tests {
    use super::*;

    #[test]
    fn status_lattice_order() {
        assert!(VerificationStatus::UnableToVerify < VerificationStatus::VerifiedDifferentAuthor);
        assert!(VerificationStatus::VerifiedDifferentAuthor < VerificationStatus::Verified);
    }

    #[test]
    fn status_serializes_snake_case() {
        let s = serde_json::to_string(&VerificationStatus::VerifiedDifferentAuthor).unwrap();
        assert_eq!(s, "\"verified_different_author\"");
    }

    #[test]
    fn config_from_file_overlays_thresholds() {
        let file: config_file::ConfigFile = toml::from_str(
            r#"
            [sources]
            scholar_threshold = 95.0
            max_results = 8
            "#,
        )
        .unwrap();
        let config = Config::from_file(&file);
        assert_eq!(config.thresholds.scholar, 95.0);
        assert_eq!(config.thresholds.openalex, 90.0);
        assert_eq!(config.max_results, 8);
    }
}
