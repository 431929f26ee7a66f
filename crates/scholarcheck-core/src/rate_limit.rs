//! Per-source rate limiting.
//!
//! Each source query waits for its governor permit before hitting the
//! network, which spaces requests at the configured rate across all
//! concurrent callers. Together with the aggregator's chunked batch
//! windows this bounds the request rate by design rather than by
//! accident of scheduling.

use std::collections::HashMap;
use std::num::NonZeroU32;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Collection of per-source rate limiters, keyed by source name.
pub struct RateLimiters {
    limiters: HashMap<&'static str, DirectLimiter>,
}

impl Default for RateLimiters {
    fn default() -> Self {
        Self::new(false, false)
    }
}

fn per_second(n: u32) -> DirectLimiter {
    let n = NonZeroU32::new(n.max(1)).expect("rate is nonzero");
    RateLimiter::direct(Quota::per_second(n))
}

impl RateLimiters {
    /// Build limiters from what credentials are configured. Keys and
    /// polite-pool mailto addresses buy higher provider-side limits.
    pub fn new(has_openalex_key: bool, has_crossref_mailto: bool) -> Self {
        let mut limiters = HashMap::new();

        // OpenAlex: 10/s keyless, substantially higher with a key.
        limiters.insert("OpenAlex", per_second(if has_openalex_key { 50 } else { 10 }));

        // CrossRef: 1/s anonymous, 3/s in the polite pool.
        limiters.insert("CrossRef", per_second(if has_crossref_mailto { 3 } else { 1 }));

        // Europe PMC: undocumented, conservative 2/s.
        limiters.insert("Europe PMC", per_second(2));

        // Scholar endpoint is metered per account; keep it slow.
        limiters.insert("Scholar", per_second(1));

        Self { limiters }
    }

    /// A limiter set that never waits. For tests and offline adapters.
    pub fn unlimited() -> Self {
        Self {
            limiters: HashMap::new(),
        }
    }

    /// Wait until the named source's limiter allows a request. Unknown
    /// source names pass through without waiting.
    pub async fn acquire(&self, source: &str) {
        if let Some(limiter) = self.limiters.get(source) {
            limiter.until_ready().await;
        }
    }
}
