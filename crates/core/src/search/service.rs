//! Caller-facing search entry point.
//!
//! # Example
//!
//! ```rust
//! use gleaner_core::{GleanerConfig, SearchService};
//!
//! let service = SearchService::from_config(&GleanerConfig::default()).unwrap();
//! let rt = tokio::runtime::Runtime::new().unwrap();
//!
//! // No API keys configured: every provider fails and a placeholder comes back.
//! let response = rt.block_on(service.perform_search("新闻", None, false));
//! assert_eq!(response.results.len(), 1);
//! assert_eq!(response.meta.total_results, 1);
//! ```

use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::orchestrator::SearchOrchestrator;
use super::serpapi::SerpApiProvider;
use super::serper::SerperProvider;
use super::{Enricher, ProviderKind, SearchProvider, SearchResult};
use crate::Result;
use crate::config::GleanerConfig;
use crate::page::PagePipeline;

/// Value of [`SearchMeta::engine`].
pub const ENGINE_NAME: &str = "gleaner";

/// Metadata describing one search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMeta {
    pub engine: String,
    /// RFC 3339 UTC time the response was assembled.
    pub timestamp: String,
    pub total_results: usize,
    /// Whether any result came from a news vertical.
    pub is_news_search: bool,
}

/// Envelope returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub meta: SearchMeta,
}

/// The single result returned when no provider produced anything.
pub fn placeholder_result(query: &str) -> SearchResult {
    SearchResult::new(
        format!("关于\"{query}\"的搜索"),
        format!("https://www.google.com/search?q={}", urlencoding::encode(query)),
        format!("无法获取\"{query}\"的搜索结果。请尝试直接访问搜索引擎。"),
    )
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}

/// Wraps the orchestrator with the response contract.
pub struct SearchService {
    orchestrator: SearchOrchestrator,
    num_results: usize,
}

impl SearchService {
    pub fn new(orchestrator: SearchOrchestrator, num_results: usize) -> Self {
        Self { orchestrator, num_results }
    }

    /// Service with both providers, in default order, and the page pipeline
    /// as enricher.
    pub fn from_config(config: &GleanerConfig) -> Result<Self> {
        let providers: Vec<Arc<dyn SearchProvider>> = ProviderKind::default_order()
            .iter()
            .map(|kind| -> Result<Arc<dyn SearchProvider>> {
                let provider: Arc<dyn SearchProvider> = match kind {
                    ProviderKind::Serper => Arc::new(SerperProvider::new(&config.providers)?),
                    ProviderKind::SerpApi => Arc::new(SerpApiProvider::new(&config.providers)?),
                };
                Ok(provider)
            })
            .collect::<Result<_>>()?;

        let enricher: Arc<dyn Enricher> =
            Arc::new(PagePipeline::from_config(config.fetch.clone(), config.extract.clone())?);

        Ok(Self::new(SearchOrchestrator::new(providers, enricher), config.num_results))
    }

    pub fn providers(&self) -> Vec<ProviderKind> {
        self.orchestrator.providers()
    }

    pub fn num_results(&self) -> usize {
        self.num_results
    }

    /// Search with the configured result count; see [`Self::perform_search_with`].
    pub async fn perform_search(
        &self, query: &str, provider: Option<ProviderKind>, fetch_content: bool,
    ) -> SearchResponse {
        self.perform_search_with(query, self.num_results, provider, fetch_content).await
    }

    /// Search and wrap the results. Never fails: an empty result set is
    /// replaced by [`placeholder_result`].
    pub async fn perform_search_with(
        &self, query: &str, num_results: usize, provider: Option<ProviderKind>, fetch_content: bool,
    ) -> SearchResponse {
        let mut results = self.orchestrator.search(query, num_results, provider, fetch_content).await;

        if results.is_empty() {
            tracing::info!(query, "no results, returning placeholder");
            results.push(placeholder_result(query));
        }

        let meta = SearchMeta {
            engine: ENGINE_NAME.to_string(),
            timestamp: now_rfc3339(),
            total_results: results.len(),
            is_news_search: results.iter().any(|r| r.is_news),
        };

        SearchResponse { query: query.to_string(), results, meta }
    }
}
