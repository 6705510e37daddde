//! Client for the Serper Google search API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::USER_AGENT;
use serde::{Deserialize, Serialize};

use super::{ProviderKind, SearchProvider, SearchResult};
use crate::config::ProviderConfig;
use crate::{GleanerError, Result};

const PROVIDER: &str = "serper";

/// Restricts results to the past week.
const RECENCY_FILTER: &str = "qdr:w";

#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: usize,
    gl: &'a str,
    hl: &'a str,
    tbs: &'a str,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperOrganic>,
}

#[derive(Debug, Deserialize)]
struct SerperOrganic {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    snippet: Option<String>,
}

/// Serper provider (`POST /search` with an `X-API-KEY` header).
#[derive(Debug, Clone)]
pub struct SerperProvider {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    country: String,
    language: String,
    user_agent: String,
}

impl SerperProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(GleanerError::HttpError)?;

        Ok(Self {
            client,
            api_key: config.serper_api_key.clone(),
            endpoint: config.serper_endpoint.clone(),
            country: config.country.clone(),
            language: config.language.clone(),
            user_agent: config.user_agent.clone(),
        })
    }
}

#[async_trait]
impl SearchProvider for SerperProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Serper
    }

    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<SearchResult>> {
        let api_key = self.api_key.as_deref().ok_or(GleanerError::MissingCredential { provider: PROVIDER })?;

        let body = SerperRequest {
            q: query,
            num: num_results,
            gl: &self.country,
            hl: &self.language,
            tbs: RECENCY_FILTER,
        };

        tracing::debug!(query, endpoint = %self.endpoint, "querying serper");
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", api_key)
            .header(USER_AGENT, &self.user_agent)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GleanerError::ProviderStatus { provider: PROVIDER, status: status.as_u16() });
        }

        let text = response.text().await?;
        let results = parse_response(&text, num_results)?;
        tracing::info!(query, results = results.len(), "serper search finished");
        Ok(results)
    }
}

/// Map a Serper response body to results, keeping at most `num_results`.
pub fn parse_response(body: &str, num_results: usize) -> Result<Vec<SearchResult>> {
    let response: SerperResponse = serde_json::from_str(body)
        .map_err(|e| GleanerError::ProviderResponse { provider: PROVIDER, message: e.to_string() })?;

    Ok(response
        .organic
        .into_iter()
        .take(num_results)
        .map(|item| SearchResult::new(item.title, item.link, item.snippet.unwrap_or_default()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::NO_DESCRIPTION;

    const BODY: &str = r#"{
        "searchParameters": {"q": "新闻"},
        "organic": [
            {"title": "First", "link": "https://a.example.com/1", "snippet": "First snippet", "position": 1},
            {"title": "Second", "link": "https://b.example.com/2", "position": 2},
            {"title": "Third", "link": "https://c.example.com/3", "snippet": "Third snippet", "position": 3}
        ]
    }"#;

    #[test]
    fn test_parse_response_maps_organic() {
        let results = parse_response(BODY, 10).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "First");
        assert_eq!(results[0].url, "https://a.example.com/1");
        assert_eq!(results[0].content, "First snippet");
        assert_eq!(results[1].snippet, NO_DESCRIPTION);
        assert!(results.iter().all(|r| !r.is_news && !r.full_content));
    }

    #[test]
    fn test_parse_response_truncates() {
        let results = parse_response(BODY, 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].title, "Second");
    }

    #[test]
    fn test_parse_response_without_organic() {
        assert!(parse_response(r#"{"answerBox": {}}"#, 10).unwrap().is_empty());
    }

    #[test]
    fn test_parse_response_malformed() {
        let err = parse_response("<html>busy</html>", 10).unwrap_err();
        assert!(matches!(err, GleanerError::ProviderResponse { provider: "serper", .. }));
    }

    #[test]
    fn test_request_body_shape() {
        let body = SerperRequest { q: "新闻", num: 5, gl: "cn", hl: "zh-cn", tbs: RECENCY_FILTER };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"q": "新闻", "num": 5, "gl": "cn", "hl": "zh-cn", "tbs": "qdr:w"}));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let provider = SerperProvider::new(&ProviderConfig::default()).unwrap();
        let err = provider.search("新闻", 10).await.unwrap_err();
        assert!(err.is_configuration());
    }
}
