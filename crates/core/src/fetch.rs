//! Page fetching over HTTP.
//!
//! This module retrieves raw page bytes for the page pipeline. Decoding is
//! left to [`crate::encoding`] so the declared charset can be honoured.

use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, redirect};
use url::Url;

use crate::{GleanerError, Result};

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Maximum number of redirects followed.
    pub max_redirects: usize,
    /// Browser-like User-Agent string.
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 20,
            max_redirects: 5,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
            accept_language: "zh-CN,zh;q=0.9,en;q=0.8".to_string(),
        }
    }
}

/// Undecoded response of a successful page fetch.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// Final URL after redirects.
    pub url: Url,
    pub status: u16,
    /// The `Content-Type` header, if sent.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Validates that `url` is an absolute http(s) URL.
pub fn parse_page_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| GleanerError::InvalidUrl(e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(GleanerError::InvalidUrl(
            "URL must use the http:// or https:// scheme".to_string(),
        ));
    }

    Ok(parsed)
}

/// Fetches pages with one shared connection pool.
///
/// A single attempt is made per call; there is no retry.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    config: FetchConfig,
}

impl PageFetcher {
    /// Builds the underlying client.
    ///
    /// # Errors
    ///
    /// Returns [`GleanerError::HttpError`] if the TLS backend cannot be
    /// initialised.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .redirect(redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(GleanerError::HttpError)?;

        Ok(Self { client, config })
    }

    /// Performs a GET request and returns the undecoded body.
    ///
    /// # Errors
    ///
    /// - [`GleanerError::InvalidUrl`] when `url` is not absolute http(s)
    /// - [`GleanerError::Timeout`] when the configured timeout elapses
    /// - [`GleanerError::HttpStatus`] for a non-success final status
    /// - [`GleanerError::HttpError`] for any other transport failure
    pub async fn fetch(&self, url: &str) -> Result<RawPage> {
        let parsed_url = parse_page_url(url)?;
        tracing::debug!(url = %parsed_url, "fetching page");

        let response = self
            .client
            .get(parsed_url)
            .header(USER_AGENT, &self.config.user_agent)
            .header(ACCEPT, &self.config.accept)
            .header(ACCEPT_LANGUAGE, &self.config.accept_language)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(GleanerError::HttpStatus { url: final_url.to_string(), status: status.as_u16() });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await.map_err(|e| self.map_transport_error(e))?.to_vec();
        tracing::debug!(url = %final_url, status = status.as_u16(), bytes = bytes.len(), "page fetched");

        Ok(RawPage { url: final_url, status: status.as_u16(), content_type, bytes })
    }

    fn map_transport_error(&self, e: reqwest::Error) -> GleanerError {
        if e.is_timeout() { GleanerError::Timeout { timeout: self.config.timeout } } else { GleanerError::HttpError(e) }
    }
}
