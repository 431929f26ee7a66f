//! Cross-source author identity: profile records, the run-lifetime
//! author cache, and best-effort enrichment.
//!
//! Enrichment never influences verdicts. A fetch failure leaves the
//! profile without a record; the per-publication statuses stand on their
//! own.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::source::{SourceError, openalex::short_id};
use crate::{AuthorIds, PublicationReport, VerificationStatus};

/// One historical affiliation of an author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Affiliation {
    pub institution: String,
    pub country_code: Option<String>,
    pub years: Vec<i32>,
}

/// Aggregate research metrics for an author.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchMetrics {
    pub h_index: u32,
    pub i10_index: u32,
    pub two_year_mean_citedness: f64,
    pub total_citations: u64,
    pub total_works: u64,
}

/// An author record as fetched from a profile source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorRecord {
    pub id: String,
    pub display_name: String,
    pub orcid: Option<String>,
    pub affiliations: Vec<Affiliation>,
    pub metrics: ResearchMetrics,
    pub topics: Vec<String>,
}

/// Cross-source identity record for one verified candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorProfile {
    pub candidate_name: String,
    /// Per-source author identifiers, first-write-wins within a run.
    pub identifiers: AuthorIds,
    /// Enriched record, when a profile source lookup succeeded.
    pub record: Option<AuthorRecord>,
    pub verified_publications: usize,
}

/// A source that can dereference an author id into a full record.
pub trait ProfileSource: Send + Sync {
    /// Which verification source's ids this can dereference.
    fn source_name(&self) -> &'static str;

    fn fetch<'a>(
        &'a self,
        author_id: &'a str,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<AuthorRecord, SourceError>> + Send + 'a>>;
}

/// In-memory, process-lifetime cache of author records keyed by source
/// author id. Read-through with write-on-miss; entries are never
/// invalidated (staleness within a single run is acceptable).
#[derive(Default)]
pub struct AuthorCache {
    records: DashMap<String, Arc<AuthorRecord>>,
}

impl AuthorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up an author record, fetching and caching on miss. Fetch
    /// failures are logged and yield `None`; they are never fatal.
    pub async fn get_or_fetch(
        &self,
        author_id: &str,
        source: &dyn ProfileSource,
        client: &reqwest::Client,
        timeout: Duration,
    ) -> Option<Arc<AuthorRecord>> {
        if let Some(record) = self.records.get(author_id) {
            return Some(Arc::clone(record.value()));
        }

        match source.fetch(author_id, client, timeout).await {
            Ok(record) => {
                let record = Arc::new(record);
                self.records
                    .insert(author_id.to_string(), Arc::clone(&record));
                Some(record)
            }
            Err(e) => {
                tracing::warn!(author_id, error = %e, "author record fetch failed");
                None
            }
        }
    }
}

/// Collect per-source author ids across a batch of reports,
/// first-write-wins per source, and count verified publications.
pub fn collect_identifiers(reports: &[PublicationReport]) -> (AuthorIds, usize) {
    let mut identifiers = BTreeMap::new();
    let mut verified = 0;

    for report in reports {
        if report.verdict.status == VerificationStatus::Verified {
            verified += 1;
        }
        for (source, id) in &report.verdict.author_ids {
            identifiers
                .entry(source.clone())
                .or_insert_with(|| id.clone());
        }
    }

    (identifiers, verified)
}

/// OpenAlex author endpoint as a profile source.
pub struct OpenAlexProfiles {
    pub api_key: Option<String>,
}

impl ProfileSource for OpenAlexProfiles {
    fn source_name(&self) -> &'static str {
        "OpenAlex"
    }

    fn fetch<'a>(
        &'a self,
        author_id: &'a str,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<AuthorRecord, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let mut url = format!(
                "https://api.openalex.org/authors/{}",
                urlencoding::encode(&short_id(author_id))
            );
            if let Some(ref key) = self.api_key {
                url.push_str(&format!("?api_key={}", urlencoding::encode(key)));
            }

            let resp = client
                .get(&url)
                .header("User-Agent", "scholarcheck")
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| SourceError::Http(e.to_string()))?;

            if !resp.status().is_success() {
                return Err(crate::source::status_error(resp.status()));
            }

            let data: serde_json::Value = resp
                .json()
                .await
                .map_err(|e| SourceError::Malformed(e.to_string()))?;

            Ok(parse_author(&data))
        })
    }
}

/// Map an OpenAlex author payload into an [`AuthorRecord`].
fn parse_author(data: &serde_json::Value) -> AuthorRecord {
    let stats = &data["summary_stats"];

    let affiliations = data["affiliations"]
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|aff| {
                    let inst = &aff["institution"];
                    let name = inst["display_name"].as_str()?;
                    Some(Affiliation {
                        institution: name.to_string(),
                        country_code: inst["country_code"].as_str().map(String::from),
                        years: aff["years"]
                            .as_array()
                            .map(|ys| ys.iter().filter_map(|y| y.as_i64().map(|v| v as i32)).collect())
                            .unwrap_or_default(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let topics = data["topics"]
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|t| t["display_name"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    AuthorRecord {
        id: short_id(data["id"].as_str().unwrap_or_default()),
        display_name: data["display_name"].as_str().unwrap_or_default().to_string(),
        orcid: data["orcid"].as_str().map(String::from),
        affiliations,
        metrics: ResearchMetrics {
            h_index: stats["h_index"].as_u64().unwrap_or(0) as u32,
            i10_index: stats["i10_index"].as_u64().unwrap_or(0) as u32,
            two_year_mean_citedness: stats["2yr_mean_citedness"].as_f64().unwrap_or(0.0),
            total_citations: data["cited_by_count"].as_u64().unwrap_or(0),
            total_works: data["works_count"].as_u64().unwrap_or(0),
        },
        topics,
    }
}
