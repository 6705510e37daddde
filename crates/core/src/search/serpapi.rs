//! Client for the SerpApi search API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use serde_json::Value;

use super::{ProviderKind, SearchProvider, SearchResult};
use crate::config::ProviderConfig;
use crate::{GleanerError, Result};

const PROVIDER: &str = "serpapi";

/// Ask for the news vertical.
const NEWS_VERTICAL: &str = "nws";

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<SerpApiItem>,
    #[serde(default)]
    news_results: Vec<SerpApiItem>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SerpApiItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    snippet: Option<String>,
    /// A name string, or an object with a `name` field.
    source: Option<Value>,
    date: Option<String>,
    thumbnail: Option<String>,
}

/// SerpApi provider (`GET /search` with the key as a query parameter).
#[derive(Debug, Clone)]
pub struct SerpApiProvider {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    country: String,
    language: String,
    user_agent: String,
}

impl SerpApiProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(GleanerError::HttpError)?;

        Ok(Self {
            client,
            api_key: config.serpapi_api_key.clone(),
            endpoint: config.serpapi_endpoint.clone(),
            country: config.country.clone(),
            language: config.language.clone(),
            user_agent: config.user_agent.clone(),
        })
    }
}

#[async_trait]
impl SearchProvider for SerpApiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::SerpApi
    }

    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<SearchResult>> {
        let api_key = self.api_key.as_deref().ok_or(GleanerError::MissingCredential { provider: PROVIDER })?;
        let num = num_results.to_string();

        tracing::debug!(query, endpoint = %self.endpoint, "querying serpapi");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("api_key", api_key),
                ("num", num.as_str()),
                ("hl", self.language.as_str()),
                ("gl", self.country.as_str()),
                ("tbm", NEWS_VERTICAL),
            ])
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GleanerError::ProviderStatus { provider: PROVIDER, status: status.as_u16() });
        }

        let text = response.text().await?;
        let results = parse_response(&text, num_results)?;
        tracing::info!(query, results = results.len(), "serpapi search finished");
        Ok(results)
    }
}

/// Map a SerpApi response body to results: organic results first, then news
/// results, keeping at most `num_results` overall.
pub fn parse_response(body: &str, num_results: usize) -> Result<Vec<SearchResult>> {
    let response: SerpApiResponse = serde_json::from_str(body)
        .map_err(|e| GleanerError::ProviderResponse { provider: PROVIDER, message: e.to_string() })?;

    if let Some(message) = response.error
        && response.organic_results.is_empty()
        && response.news_results.is_empty()
    {
        return Err(GleanerError::ProviderResponse { provider: PROVIDER, message });
    }

    let organic = response
        .organic_results
        .into_iter()
        .map(|item| SearchResult::new(item.title, item.link, item.snippet.unwrap_or_default()));

    let news = response.news_results.into_iter().map(|item| {
        let mut result = SearchResult::new(item.title, item.link, item.snippet.unwrap_or_default());
        result.source = item.source.as_ref().and_then(source_name);
        result.date = item.date.filter(|d| !d.is_empty());
        result.image_url = item.thumbnail.filter(|t| !t.is_empty());
        result.is_news = true;
        result
    });

    Ok(organic.chain(news).take(num_results).collect())
}

fn source_name(source: &Value) -> Option<String> {
    let name = match source {
        Value::String(name) => name.as_str(),
        Value::Object(map) => map.get("name")?.as_str()?,
        _ => return None,
    };
    (!name.is_empty()).then(|| name.to_string())
}
