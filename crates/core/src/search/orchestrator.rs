//! Provider fallback and concurrent enrichment.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;

use super::{Enricher, ProviderKind, SearchProvider, SearchResult};
use crate::page::FetchOutcome;
use crate::parse::char_len;

/// Enriched content must be longer than the current content by this factor.
pub const ENRICHMENT_GAIN: f64 = 1.5;

/// Runs searches against an ordered list of providers.
pub struct SearchOrchestrator {
    providers: Vec<Arc<dyn SearchProvider>>,
    enricher: Arc<dyn Enricher>,
}

impl SearchOrchestrator {
    /// `providers` are tried in the given order.
    pub fn new(providers: Vec<Arc<dyn SearchProvider>>, enricher: Arc<dyn Enricher>) -> Self {
        Self { providers, enricher }
    }

    pub fn providers(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|p| p.kind()).collect()
    }

    /// Search and optionally enrich.
    ///
    /// With `provider` set, only that provider is queried. Otherwise providers
    /// are tried in order until one returns a result. Provider errors are
    /// logged and count as no results, so this never fails.
    pub async fn search(
        &self, query: &str, num_results: usize, provider: Option<ProviderKind>, fetch_content: bool,
    ) -> Vec<SearchResult> {
        let candidates: Vec<&Arc<dyn SearchProvider>> = match provider {
            Some(kind) => self.providers.iter().filter(|p| p.kind() == kind).collect(),
            None => self.providers.iter().collect(),
        };

        if candidates.is_empty() {
            tracing::warn!(query, provider = ?provider, "no matching search provider configured");
        }

        let mut results = Vec::new();
        for candidate in candidates {
            let kind = candidate.kind();
            match candidate.search(query, num_results).await {
                Ok(found) if !found.is_empty() => {
                    tracing::info!(query, provider = %kind, results = found.len(), "provider returned results");
                    results = found;
                    break;
                }
                Ok(_) => tracing::info!(query, provider = %kind, "provider returned no results"),
                Err(e) => tracing::warn!(query, provider = %kind, error = %e, "provider failed"),
            }
        }

        results.truncate(num_results);

        if fetch_content && !results.is_empty() {
            self.enrich_all(&mut results).await;
        }

        results
    }

    /// Enrich every result with a URL concurrently, preserving order.
    pub async fn enrich_all(&self, results: &mut [SearchResult]) {
        let started = Instant::now();
        let enricher = &self.enricher;

        let tasks = results.iter_mut().filter(|r| !r.url.is_empty()).map(|result| async move {
            let outcome = enricher.enrich(&result.url).await;
            apply_outcome(result, outcome)
        });

        let replaced = join_all(tasks).await.into_iter().filter(|replaced| *replaced).count();
        tracing::info!(
            total = results.len(),
            replaced,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "enrichment finished"
        );
    }
}

/// Merge an acquisition outcome into a result.
///
/// Content is replaced only by a successful outcome whose text is more than
/// [`ENRICHMENT_GAIN`] times longer than the current content. A non-empty
/// publish date is copied regardless. Returns whether content was replaced.
pub fn apply_outcome(result: &mut SearchResult, outcome: FetchOutcome) -> bool {
    if let Some(date) = outcome.publish_date.filter(|d| !d.is_empty()) {
        result.date = Some(date);
    }

    let current = char_len(&result.content) as f64;
    if outcome.success && char_len(&outcome.content) as f64 > current * ENRICHMENT_GAIN {
        tracing::debug!(url = %result.url, chars = char_len(&outcome.content), "content replaced");
        result.content = outcome.content;
        result.full_content = true;
        return true;
    }

    tracing::debug!(url = %result.url, success = outcome.success, "content kept");
    false
}
