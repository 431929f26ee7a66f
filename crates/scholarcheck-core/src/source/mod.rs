//! Source adapter trait and implementations for querying bibliographic
//! indexes.

pub mod crossref;
pub mod europe_pmc;
pub mod mock;
pub mod openalex;
pub mod scholar;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Errors from a source adapter. All variants are transport-level and are
/// downgraded to `unable_to_verify` by the verifier; none propagates out
/// of the pipeline.
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    #[error("HTTP request error: {0}")]
    Http(String),
    #[error("rate limited (429)")]
    RateLimited,
    #[error("unexpected response shape: {0}")]
    Malformed(String),
}

/// A per-author identifier exposed by a source alongside its display name.
#[derive(Debug, Clone)]
pub struct AuthorId {
    pub display_name: String,
    pub id: String,
}

/// Source-specific author representation on a raw search result.
#[derive(Debug, Clone)]
pub enum AuthorField {
    /// Structured author list, one name per entry.
    Names(Vec<String>),
    /// A single creator string, e.g. `"Smith J, Jones B."`.
    Creator(String),
    /// A free-text result summary whose leading segment is the author
    /// list, e.g. `"J Doe, A Smith - Nature, 2021 - nature.com"`.
    Summary(String),
}

impl AuthorField {
    /// Extract individual author name strings from whichever shape the
    /// source provided.
    pub fn names(&self) -> Vec<String> {
        match self {
            AuthorField::Names(names) => names
                .iter()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
            AuthorField::Creator(line) => split_author_list(line),
            AuthorField::Summary(summary) => {
                // Authors are the segment before the first " - " separator.
                static SEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+-\s+").unwrap());
                let leading = SEP.split(summary).next().unwrap_or(summary);
                split_author_list(leading)
            }
        }
    }
}

/// Split a comma/semicolon-joined author line, dropping "et al" style
/// trailers and ellipses.
fn split_author_list(line: &str) -> Vec<String> {
    static ET_AL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^et\.?\s*al\.?$").unwrap());
    line.split([',', ';'])
        .map(|part| part.trim().trim_end_matches('.').trim())
        .filter(|part| !part.is_empty())
        .filter(|part| !ET_AL.is_match(part))
        .filter(|part| *part != "…" && *part != "...")
        .map(|part| part.to_string())
        .collect()
}

/// A candidate record returned by a source search.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub title: String,
    pub doi: Option<String>,
    pub authors: AuthorField,
    /// Per-author identifiers, when the source exposes them.
    pub author_ids: Vec<AuthorId>,
    /// Follow-up locator (landing page or DOI URL).
    pub url: Option<String>,
}

/// A bibliographic source that can be searched by title.
///
/// Adapters own only transport and response shaping; selection, matching
/// and authorship logic are shared in [`crate::verifier`]. Adapters
/// return `Err` only for transport-level failures; a missing required
/// configuration is a programmer error and panics at construction.
pub trait SourceAdapter: Send + Sync {
    /// Canonical source name (e.g. "OpenAlex", "Europe PMC").
    fn name(&self) -> &'static str;

    /// Search the source for up to `max_results` candidate records.
    fn search<'a>(
        &'a self,
        title: &'a str,
        max_results: usize,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RawRecord>, SourceError>> + Send + 'a>>;
}

/// Map an HTTP status to a `SourceError`, distinguishing 429.
pub(crate) fn status_error(status: reqwest::StatusCode) -> SourceError {
    if status.as_u16() == 429 {
        SourceError::RateLimited
    } else {
        SourceError::Http(format!("HTTP {}", status))
    }
}
