//! Web search providers and result enrichment.
//!
//! Providers turn a query into normalized [`SearchResult`]s. The
//! [`orchestrator`] tries them in order and optionally enriches each result
//! with the article text of its source page; [`service`] is the
//! caller-facing entry point.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::Serialize;

use crate::Result;
use crate::page::{FetchOutcome, PagePipeline};

pub mod orchestrator;
pub mod serpapi;
pub mod serper;
pub mod service;

/// Snippet used when a provider returns none.
pub const NO_DESCRIPTION: &str = "No description available";

/// One normalized search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// The snippet, or the page's article text after successful enrichment.
    pub content: String,
    /// Whether `content` was replaced by extracted article text.
    pub full_content: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub is_news: bool,
}

impl SearchResult {
    /// A plain result whose content starts as the snippet.
    ///
    /// An empty snippet is replaced by [`NO_DESCRIPTION`].
    pub fn new(title: impl Into<String>, url: impl Into<String>, snippet: impl Into<String>) -> Self {
        let mut snippet = snippet.into();
        if snippet.trim().is_empty() {
            snippet = NO_DESCRIPTION.to_string();
        }

        Self {
            title: title.into(),
            url: url.into(),
            content: snippet.clone(),
            snippet,
            full_content: false,
            source: None,
            date: None,
            image_url: None,
            is_news: false,
        }
    }
}

/// Identifies a search provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Serper,
    SerpApi,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Serper, ProviderKind::SerpApi];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Serper => "serper",
            ProviderKind::SerpApi => "serpapi",
        }
    }

    /// Fallback order used when no provider is requested.
    pub fn default_order() -> &'static [ProviderKind] {
        &Self::ALL
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised provider name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProvider(pub String);

impl fmt::Display for UnknownProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown search engine '{}'", self.0)
    }
}

impl std::error::Error for UnknownProvider {}

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serper" => Ok(ProviderKind::Serper),
            "serpapi" => Ok(ProviderKind::SerpApi),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// A third-party web search API.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Run `query`, returning at most `num_results` results in provider order.
    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<SearchResult>>;
}

/// Acquires the article behind a result URL.
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich(&self, url: &str) -> FetchOutcome;
}

#[async_trait]
impl Enricher for PagePipeline {
    async fn enrich(&self, url: &str) -> FetchOutcome {
        self.fetch_and_extract(url).await
    }
}
