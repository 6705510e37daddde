//! Engine configuration.
//!
//! [`GleanerConfig`] bundles the fetch, extraction and provider settings.
//! Credentials are opaque strings; they are normally read from the
//! environment with [`GleanerConfig::from_env`].
//!
//! # Example
//!
//! ```rust
//! use gleaner_core::GleanerConfig;
//!
//! let config = GleanerConfig::builder()
//!     .serper_api_key("test-key")
//!     .fetch_timeout(5)
//!     .max_content_length(1500)
//!     .build();
//!
//! assert_eq!(config.fetch.timeout, 5);
//! assert_eq!(config.extract.max_content_length, 1500);
//! ```

use crate::extract::ExtractConfig;
use crate::fetch::FetchConfig;

/// Environment variable holding the Serper API key.
pub const SERPER_API_KEY_VAR: &str = "SERPER_API_KEY";

/// Environment variable holding the SerpApi API key.
pub const SERPAPI_API_KEY_VAR: &str = "SERPAPI_API_KEY";

pub const DEFAULT_SERPER_ENDPOINT: &str = "https://google.serper.dev/search";
pub const DEFAULT_SERPAPI_ENDPOINT: &str = "https://serpapi.com/search";

/// Search provider settings.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub serper_api_key: Option<String>,
    pub serpapi_api_key: Option<String>,
    pub serper_endpoint: String,
    pub serpapi_endpoint: String,
    /// Provider request timeout in seconds (default: 10).
    pub timeout: u64,
    /// Country code sent as `gl` (default: "cn").
    pub country: String,
    /// Interface language sent as `hl` (default: "zh-cn").
    pub language: String,
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            serper_api_key: None,
            serpapi_api_key: None,
            serper_endpoint: DEFAULT_SERPER_ENDPOINT.to_string(),
            serpapi_endpoint: DEFAULT_SERPAPI_ENDPOINT.to_string(),
            timeout: 10,
            country: "cn".to_string(),
            language: "zh-cn".to_string(),
            user_agent: concat!("gleaner/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone)]
pub struct GleanerConfig {
    pub fetch: FetchConfig,
    pub extract: ExtractConfig,
    pub providers: ProviderConfig,
    /// Results requested from providers per search (default: 10).
    pub num_results: usize,
}

impl Default for GleanerConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            extract: ExtractConfig::default(),
            providers: ProviderConfig::default(),
            num_results: 10,
        }
    }
}

impl GleanerConfig {
    /// Creates a new builder for GleanerConfig.
    pub fn builder() -> GleanerConfigBuilder {
        GleanerConfigBuilder::new()
    }

    /// Defaults with API keys read from [`SERPER_API_KEY_VAR`] and
    /// [`SERPAPI_API_KEY_VAR`].
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults with API keys read through `lookup`. Blank values count as
    /// unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut config = Self::default();
        config.providers.serper_api_key = read(SERPER_API_KEY_VAR);
        config.providers.serpapi_api_key = read(SERPAPI_API_KEY_VAR);
        config
    }
}

/// Builder for GleanerConfig.
///
/// Provides a fluent API for configuring the engine.
pub struct GleanerConfigBuilder {
    config: GleanerConfig,
}

impl GleanerConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: GleanerConfig::default() }
    }

    /// Starts from an existing config, such as one read from the environment.
    pub fn from_config(config: GleanerConfig) -> Self {
        Self { config }
    }

    pub fn serper_api_key(mut self, value: impl Into<String>) -> Self {
        self.config.providers.serper_api_key = Some(value.into());
        self
    }

    pub fn serpapi_api_key(mut self, value: impl Into<String>) -> Self {
        self.config.providers.serpapi_api_key = Some(value.into());
        self
    }

    pub fn serper_endpoint(mut self, value: impl Into<String>) -> Self {
        self.config.providers.serper_endpoint = value.into();
        self
    }

    pub fn serpapi_endpoint(mut self, value: impl Into<String>) -> Self {
        self.config.providers.serpapi_endpoint = value.into();
        self
    }

    /// Sets the provider request timeout in seconds.
    pub fn provider_timeout(mut self, value: u64) -> Self {
        self.config.providers.timeout = value;
        self
    }

    /// Sets the page fetch timeout in seconds.
    pub fn fetch_timeout(mut self, value: u64) -> Self {
        self.config.fetch.timeout = value;
        self
    }

    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.fetch.user_agent = value.into();
        self
    }

    /// Sets the character limit applied to accepted content.
    pub fn max_content_length(mut self, value: usize) -> Self {
        self.config.extract.max_content_length = value;
        self
    }

    /// Sets whether listing pages are followed to an article.
    pub fn follow_list_pages(mut self, value: bool) -> Self {
        self.config.extract.follow_list_pages = value;
        self
    }

    pub fn num_results(mut self, value: usize) -> Self {
        self.config.num_results = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> GleanerConfig {
        self.config
    }
}

impl Default for GleanerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GleanerConfig::default();
        assert_eq!(config.num_results, 10);
        assert_eq!(config.providers.timeout, 10);
        assert_eq!(config.providers.serper_endpoint, DEFAULT_SERPER_ENDPOINT);
        assert!(config.providers.serper_api_key.is_none());
        assert_eq!(config.fetch.timeout, 20);
    }

    #[test]
    fn test_builder_overrides() {
        let config = GleanerConfig::builder()
            .serpapi_api_key("abc")
            .serpapi_endpoint("http://127.0.0.1:9/search")
            .num_results(3)
            .follow_list_pages(false)
            .build();

        assert_eq!(config.providers.serpapi_api_key.as_deref(), Some("abc"));
        assert_eq!(config.providers.serpapi_endpoint, "http://127.0.0.1:9/search");
        assert_eq!(config.num_results, 3);
        assert!(!config.extract.follow_list_pages);
    }

    #[test]
    fn test_from_lookup_reads_keys() {
        let config = GleanerConfig::from_lookup(|name| match name {
            SERPER_API_KEY_VAR => Some(" serper-key ".to_string()),
            SERPAPI_API_KEY_VAR => Some(String::new()),
            _ => None,
        });

        assert_eq!(config.providers.serper_api_key.as_deref(), Some("serper-key"));
        assert!(config.providers.serpapi_api_key.is_none());
    }
}
