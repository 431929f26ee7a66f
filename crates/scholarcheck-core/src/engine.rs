//! Library entry point: wires configured sources into verifiers and runs
//! batches of publications through the aggregation pipeline, with
//! best-effort author-profile enrichment on top.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::aggregator::{self, AggregatedVerdict, PublicationReport};
use crate::profile::{
    AuthorCache, AuthorProfile, OpenAlexProfiles, ProfileSource, collect_identifiers,
};
use crate::rate_limit::RateLimiters;
use crate::source::{SourceAdapter, crossref, europe_pmc, openalex, scholar};
use crate::verifier::SourceVerifier;
use crate::{Config, Publication};

/// Output for one verification run over a document's publications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// One report per input publication, in input order.
    pub reports: Vec<PublicationReport>,
    /// Present when at least one verified publication yielded an
    /// identifiable author id for the candidate.
    pub profile: Option<AuthorProfile>,
}

/// A configured verification engine. Owns the verifiers, the shared HTTP
/// client, rate limiters, and the run-lifetime author cache.
pub struct Engine {
    verifiers: Vec<Arc<SourceVerifier>>,
    client: reqwest::Client,
    limiters: Arc<RateLimiters>,
    cache: Arc<AuthorCache>,
    profiles: Option<Arc<dyn ProfileSource>>,
    timeout: Duration,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl Engine {
    /// Build an engine from runtime configuration.
    pub fn new(config: Config) -> Self {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let limiters = Arc::new(RateLimiters::new(
            config.openalex_key.is_some(),
            config.crossref_mailto.is_some(),
        ));

        let should_include = |name: &str| {
            !config
                .disabled_sources
                .iter()
                .any(|d| d.eq_ignore_ascii_case(name))
        };

        let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();
        if should_include("OpenAlex") {
            adapters.push(Arc::new(openalex::OpenAlex {
                api_key: config.openalex_key.clone(),
            }));
        }
        if should_include("CrossRef") {
            adapters.push(Arc::new(crossref::CrossRef {
                mailto: config.crossref_mailto.clone(),
            }));
        }
        if should_include("Europe PMC") {
            adapters.push(Arc::new(europe_pmc::EuropePmc));
        }
        if let Some(ref key) = config.scholar_api_key {
            if should_include("Scholar") {
                adapters.push(Arc::new(scholar::Scholar::new(key.clone())));
            }
        }

        let verifiers = adapters
            .into_iter()
            .map(|adapter| {
                let threshold = config.thresholds.for_source(adapter.name());
                Arc::new(SourceVerifier::new(adapter, threshold, config.max_results))
            })
            .collect();

        let profiles: Option<Arc<dyn ProfileSource>> = Some(Arc::new(OpenAlexProfiles {
            api_key: config.openalex_key.clone(),
        }));

        Self {
            verifiers,
            client,
            limiters,
            cache: Arc::new(AuthorCache::new()),
            profiles,
            timeout: Duration::from_secs(config.query_timeout_secs),
            chunk_size: config.chunk_size,
            chunk_delay: Duration::from_millis(config.chunk_delay_ms),
        }
    }

    /// Build an engine over explicit verifiers. Used by tests and by
    /// callers that bring their own adapters.
    pub fn with_verifiers(verifiers: Vec<Arc<SourceVerifier>>) -> Self {
        Self {
            verifiers,
            client: reqwest::Client::new(),
            limiters: Arc::new(RateLimiters::unlimited()),
            cache: Arc::new(AuthorCache::new()),
            profiles: None,
            timeout: Duration::from_secs(10),
            chunk_size: 3,
            chunk_delay: Duration::ZERO,
        }
    }

    /// Replace the profile source used for enrichment.
    pub fn with_profile_source(mut self, source: Arc<dyn ProfileSource>) -> Self {
        self.profiles = Some(source);
        self
    }

    /// Override batch chunking.
    pub fn with_chunking(mut self, chunk_size: usize, chunk_delay: Duration) -> Self {
        self.chunk_size = chunk_size.max(1);
        self.chunk_delay = chunk_delay;
        self
    }

    /// The run-lifetime author cache (shared, injected into lookups).
    pub fn author_cache(&self) -> Arc<AuthorCache> {
        Arc::clone(&self.cache)
    }

    /// Verify a single publication against all configured sources.
    pub async fn verify_publication(
        &self,
        publication: &Publication,
        candidate: Option<&str>,
    ) -> AggregatedVerdict {
        aggregator::verify_publication(
            &self.verifiers,
            publication,
            candidate,
            &self.client,
            self.timeout,
            &self.limiters,
        )
        .await
    }

    /// Verify a batch of publications for one candidate and assemble the
    /// run report, including best-effort profile enrichment.
    pub async fn verify_publications(
        &self,
        publications: &[Publication],
        candidate: Option<&str>,
    ) -> RunReport {
        let reports = aggregator::verify_batch(
            &self.verifiers,
            publications,
            candidate,
            &self.client,
            self.timeout,
            &self.limiters,
            self.chunk_size,
            self.chunk_delay,
        )
        .await;

        let profile = match candidate {
            Some(name) => self.build_profile(name, &reports).await,
            None => None,
        };

        RunReport { reports, profile }
    }

    /// Assemble the candidate's cross-source profile from a run's
    /// reports. Created lazily: only when a verified publication yielded
    /// at least one identifier.
    async fn build_profile(
        &self,
        candidate: &str,
        reports: &[PublicationReport],
    ) -> Option<AuthorProfile> {
        let (identifiers, verified) = collect_identifiers(reports);
        if verified == 0 || identifiers.is_empty() {
            return None;
        }

        let mut record = None;
        if let Some(ref profiles) = self.profiles {
            if let Some(id) = identifiers.get(profiles.source_name()) {
                record = self
                    .cache
                    .get_or_fetch(id, profiles.as_ref(), &self.client, self.timeout)
                    .await
                    .map(|r| (*r).clone());
            }
        }

        Some(AuthorProfile {
            candidate_name: candidate.to_string(),
            identifiers,
            record,
            verified_publications: verified,
        })
    }
}
