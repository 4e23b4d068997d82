//! Fallback policy — what a domain shows when a fetch fails.
//!
//! A pure decision seam: the store hands the policy whatever degraded
//! material exists (cache entry, raw file content) and persists/serves the
//! decision it gets back.

/// Degraded result chosen by a [`FallbackPolicy`] after a failed fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackDecision<R> {
    /// Serve the cache entry; banner "using cached data".
    Cached(Vec<R>),
    /// Serve locally synthesized records; banner "using fallback". The
    /// store caches these as if they were a normal fetch result.
    Synthesized(Vec<R>),
    /// Nothing to serve — hard error.
    Exhausted,
}

/// Domain policy for degraded behavior when the network call fails.
pub trait FallbackPolicy<R>: Send + Sync {
    /// Decide what to show for `resource`.
    ///
    /// `cached` is the cache entry if one exists; `source` is raw file
    /// content the caller supplied with the fetch (chunk domain only).
    fn resolve(
        &self,
        resource: &str,
        cached: Option<Vec<R>>,
        source: Option<&str>,
    ) -> FallbackDecision<R>;
}

/// Serve the cache entry when one exists, otherwise hard error. The
/// annotation domain's policy.
pub struct CachedOrError;

impl<R> FallbackPolicy<R> for CachedOrError {
    fn resolve(
        &self,
        _resource: &str,
        cached: Option<Vec<R>>,
        _source: Option<&str>,
    ) -> FallbackDecision<R> {
        match cached {
            Some(records) => FallbackDecision::Cached(records),
            None => FallbackDecision::Exhausted,
        }
    }
}
