//! Fan-out/fan-in across sources and across a batch of publications.
//!
//! Per-source calls for one publication are independent and run
//! concurrently; merging is commutative over the status lattice, so no
//! ordering is required across sources. Across a batch, publications are
//! verified in small chunked windows with a jittered delay between
//! chunks, keeping the aggregate request rate within provider limits by
//! construction. Output order always equals input order.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::rate_limit::RateLimiters;
use crate::verifier::SourceVerifier;
use crate::{AuthorIds, Publication, VerificationStatus, VerificationVerdict};

/// Merged verdict for one publication across all configured sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedVerdict {
    pub status: VerificationStatus,
    /// Per-source author identifiers for the candidate, from sources
    /// that independently confirmed the candidate's name.
    pub author_ids: AuthorIds,
    /// Per-source evidence, ordered by source name for reproducibility.
    pub per_source: Vec<VerificationVerdict>,
}

/// One publication's claim plus its aggregated verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicationReport {
    pub publication: Publication,
    pub verdict: AggregatedVerdict,
}

/// Merge per-source verdicts: highest-confidence status wins, author ids
/// union across name-confirming sources.
pub fn merge_verdicts(mut verdicts: Vec<VerificationVerdict>) -> AggregatedVerdict {
    verdicts.sort_by(|a, b| a.source.cmp(&b.source));

    let status = verdicts
        .iter()
        .map(|v| v.status)
        .max()
        .unwrap_or(VerificationStatus::UnableToVerify);

    let mut author_ids = AuthorIds::new();
    for verdict in &verdicts {
        if verdict.status != VerificationStatus::Verified {
            continue;
        }
        if let Some(id) = verdict
            .details
            .as_ref()
            .and_then(|d| d.candidate_author_id.clone())
        {
            author_ids.entry(verdict.source.clone()).or_insert(id);
        }
    }

    AggregatedVerdict {
        status,
        author_ids,
        per_source: verdicts,
    }
}

/// Verify one publication against every configured source concurrently.
///
/// A source that fails or panics contributes nothing; the remaining
/// sources are unaffected.
pub async fn verify_publication(
    verifiers: &[Arc<SourceVerifier>],
    publication: &Publication,
    candidate: Option<&str>,
    client: &reqwest::Client,
    timeout: Duration,
    limiters: &Arc<RateLimiters>,
) -> AggregatedVerdict {
    let mut join_set = JoinSet::new();

    for verifier in verifiers {
        let verifier = Arc::clone(verifier);
        let publication = publication.clone();
        let candidate = candidate.map(String::from);
        let client = client.clone();
        let limiters = Arc::clone(limiters);

        join_set.spawn(async move {
            verifier
                .verify(&publication, candidate.as_deref(), &client, timeout, &limiters)
                .await
        });
    }

    let mut verdicts = Vec::with_capacity(verifiers.len());
    while let Some(joined) = join_set.join_next().await {
        if let Ok(verdict) = joined {
            verdicts.push(verdict);
        }
    }

    merge_verdicts(verdicts)
}

/// Verify a batch of publications in chunked windows.
///
/// Within a window, publications are verified concurrently; between
/// windows the batch sleeps `chunk_delay` plus up to 25% jitter. Reports
/// come back in input order regardless of completion order.
#[allow(clippy::too_many_arguments)]
pub async fn verify_batch(
    verifiers: &[Arc<SourceVerifier>],
    publications: &[Publication],
    candidate: Option<&str>,
    client: &reqwest::Client,
    timeout: Duration,
    limiters: &Arc<RateLimiters>,
    chunk_size: usize,
    chunk_delay: Duration,
) -> Vec<PublicationReport> {
    let chunk_size = chunk_size.max(1);
    let total = publications.len();
    let mut slots: Vec<Option<PublicationReport>> = (0..total).map(|_| None).collect();

    for (chunk_index, chunk) in publications.chunks(chunk_size).enumerate() {
        if chunk_index > 0 && !chunk_delay.is_zero() {
            let jitter_ms = fastrand::u64(0..=chunk_delay.as_millis() as u64 / 4);
            tokio::time::sleep(chunk_delay + Duration::from_millis(jitter_ms)).await;
        }

        let base = chunk_index * chunk_size;
        let mut join_set = JoinSet::new();

        for (offset, publication) in chunk.iter().enumerate() {
            let verifiers = verifiers.to_vec();
            let publication = publication.clone();
            let candidate = candidate.map(String::from);
            let client = client.clone();
            let limiters = Arc::clone(limiters);

            join_set.spawn(async move {
                let verdict = verify_publication(
                    &verifiers,
                    &publication,
                    candidate.as_deref(),
                    &client,
                    timeout,
                    &limiters,
                )
                .await;
                (
                    base + offset,
                    PublicationReport {
                        publication,
                        verdict,
                    },
                )
            });
        }

        while let Some(joined) = join_set.join_next().await {
            if let Ok((index, report)) = joined {
                slots[index] = Some(report);
            }
        }
    }

    slots.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceRecord;

    fn verdict(source: &str, status: VerificationStatus) -> VerificationVerdict {
        VerificationVerdict {
            source: source.to_string(),
            status,
            details: None,
        }
    }

    fn verified_with_id(source: &str, id: &str) -> VerificationVerdict {
        VerificationVerdict {
            source: source.to_string(),
            status: VerificationStatus::Verified,
            details: Some(SourceRecord {
                source: source.to_string(),
                matched_title: "T".into(),
                matched_doi: None,
                extracted_authors: vec!["J. Doe".into()],
                candidate_author_id: Some(id.to_string()),
                url: None,
            }),
        }
    }

    // =========================================================================
    // Status lattice
    // =========================================================================

    #[test]
    fn any_verified_wins() {
        let merged = merge_verdicts(vec![
            verdict("A", VerificationStatus::UnableToVerify),
            verdict("B", VerificationStatus::Verified),
        ]);
        assert_eq!(merged.status, VerificationStatus::Verified);
    }

    #[test]
    fn different_author_beats_unable() {
        let merged = merge_verdicts(vec![
            verdict("A", VerificationStatus::UnableToVerify),
            verdict("B", VerificationStatus::VerifiedDifferentAuthor),
        ]);
        assert_eq!(merged.status, VerificationStatus::VerifiedDifferentAuthor);
    }

    #[test]
    fn all_unable_stays_unable() {
        let merged = merge_verdicts(vec![
            verdict("A", VerificationStatus::UnableToVerify),
            verdict("B", VerificationStatus::UnableToVerify),
        ]);
        assert_eq!(merged.status, VerificationStatus::UnableToVerify);
    }

    #[test]
    fn empty_input_is_unable() {
        let merged = merge_verdicts(vec![]);
        assert_eq!(merged.status, VerificationStatus::UnableToVerify);
        assert!(merged.per_source.is_empty());
    }

    #[test]
    fn merge_is_commutative() {
        let a = merge_verdicts(vec![
            verdict("A", VerificationStatus::Verified),
            verdict("B", VerificationStatus::UnableToVerify),
        ]);
        let b = merge_verdicts(vec![
            verdict("B", VerificationStatus::UnableToVerify),
            verdict("A", VerificationStatus::Verified),
        ]);
        assert_eq!(a.status, b.status);
        let names_a: Vec<_> = a.per_source.iter().map(|v| &v.source).collect();
        let names_b: Vec<_> = b.per_source.iter().map(|v| &v.source).collect();
        assert_eq!(names_a, names_b);
    }

    // =========================================================================
    // Author id union
    // =========================================================================

    #[test]
    fn author_ids_collected_only_from_verified_sources() {
        let mut mismatch = verified_with_id("B", "ignored");
        mismatch.status = VerificationStatus::VerifiedDifferentAuthor;

        let merged = merge_verdicts(vec![verified_with_id("A", "A123"), mismatch]);
        assert_eq!(merged.author_ids.get("A").map(String::as_str), Some("A123"));
        assert!(!merged.author_ids.contains_key("B"));
    }

    #[test]
    fn author_ids_union_across_sources() {
        let merged = merge_verdicts(vec![
            verified_with_id("A", "A123"),
            verified_with_id("B", "B456"),
        ]);
        assert_eq!(merged.author_ids.len(), 2);
    }
}
