//! Per-source verification: query a source, select the best candidate
//! record, extract authorship evidence, decide a verdict.
//!
//! Adapters differ only in transport and response shaping; everything in
//! this module is shared across sources. No failure here ever propagates:
//! an unreachable source, an empty result set or an unusable claim all
//! collapse to `UnableToVerify` for this source alone.

use std::sync::Arc;
use std::time::Duration;

use crate::rate_limit::RateLimiters;
use crate::similarity::similarity;
use crate::source::{RawRecord, SourceAdapter};
use crate::text::normalize_strict;
use crate::{name_match, Publication, SourceRecord, VerificationStatus, VerificationVerdict};

/// Minimum shorter/longer normalized-length ratio for a title match.
/// Guards against a short title matching as a substring of an unrelated
/// longer one.
const MIN_LENGTH_RATIO: f64 = 0.8;

/// One source's verification pipeline: adapter plus its matching knobs.
pub struct SourceVerifier {
    adapter: Arc<dyn SourceAdapter>,
    /// Similarity score (0–100) a candidate title must exceed.
    pub threshold: f64,
    /// Candidate records requested per query.
    pub max_results: usize,
}

impl SourceVerifier {
    pub fn new(adapter: Arc<dyn SourceAdapter>, threshold: f64, max_results: usize) -> Self {
        Self {
            adapter,
            threshold,
            max_results,
        }
    }

    pub fn source_name(&self) -> &'static str {
        self.adapter.name()
    }

    /// Verify one claimed publication against this source.
    pub async fn verify(
        &self,
        claim: &Publication,
        candidate: Option<&str>,
        client: &reqwest::Client,
        timeout: Duration,
        limiters: &RateLimiters,
    ) -> VerificationVerdict {
        let source = self.adapter.name();

        // A claim with neither title nor DOI cannot form a meaningful
        // query; refuse instead of searching for nothing.
        if claim.title.trim().is_empty() && claim.doi.is_none() {
            return VerificationVerdict::unable(source);
        }

        limiters.acquire(source).await;

        let records = match self
            .adapter
            .search(&claim.title, self.max_results, client, timeout)
            .await
        {
            Ok(records) => records,
            Err(e) => {
                tracing::debug!(source, error = %e, "source query failed");
                return VerificationVerdict::unable(source);
            }
        };

        let Some(record) = select_best(claim, &records, self.threshold) else {
            return VerificationVerdict::unable(source);
        };

        let extracted_authors = record.authors.names();

        let (status, candidate_author_id) = match candidate {
            Some(name) if name_match::matches_any(name, &extracted_authors) => {
                let id = credited_author_id(name, record);
                (VerificationStatus::Verified, id)
            }
            // The publication exists, but the candidate's authorship was
            // not confirmed (no match, or no candidate name to confirm).
            _ => (VerificationStatus::VerifiedDifferentAuthor, None),
        };

        VerificationVerdict {
            source: source.to_string(),
            status,
            details: Some(SourceRecord {
                source: source.to_string(),
                matched_title: record.title.clone(),
                matched_doi: record.doi.clone(),
                extracted_authors,
                candidate_author_id,
                url: record.url.clone(),
            }),
        }
    }
}

/// Select the best candidate record for a claim.
///
/// A DOI match is authoritative and skips title scoring entirely.
/// Otherwise the first record whose title clears the similarity threshold
/// and the length-ratio guard wins.
fn select_best<'a>(
    claim: &Publication,
    records: &'a [RawRecord],
    threshold: f64,
) -> Option<&'a RawRecord> {
    if let Some(ref claimed_doi) = claim.doi {
        let want = normalize_doi(claimed_doi);
        if !want.is_empty() {
            if let Some(record) = records
                .iter()
                .find(|r| r.doi.as_deref().map(normalize_doi) == Some(want.clone()))
            {
                return Some(record);
            }
        }
    }

    records.iter().find(|record| {
        similarity(&claim.title, &record.title) > threshold
            && length_ratio(&claim.title, &record.title) >= MIN_LENGTH_RATIO
    })
}

/// Shorter/longer ratio of the strict-normalized titles.
fn length_ratio(a: &str, b: &str) -> f64 {
    let la = normalize_strict(a).chars().count();
    let lb = normalize_strict(b).chars().count();
    let (shorter, longer) = if la <= lb { (la, lb) } else { (lb, la) };
    if longer == 0 {
        return 0.0;
    }
    shorter as f64 / longer as f64
}

/// Case-insensitive canonical DOI form, with resolver URL prefixes removed.
fn normalize_doi(doi: &str) -> String {
    let d = doi.trim().to_lowercase();
    for prefix in ["https://doi.org/", "http://doi.org/", "https://dx.doi.org/", "http://dx.doi.org/", "doi:"] {
        if let Some(rest) = d.strip_prefix(prefix) {
            return rest.to_string();
        }
    }
    d
}

/// The candidate's per-source author id, when their name matches a
/// credited author that carries one.
fn credited_author_id(candidate: &str, record: &RawRecord) -> Option<String> {
    let cand = crate::names::NameParts::parse(candidate);
    record
        .author_ids
        .iter()
        .find(|entry| {
            name_match::same_person(&cand, &crate::names::NameParts::parse(&entry.display_name))
        })
        .map(|entry| entry.id.clone())
}
