pub mod config;
pub mod encoding;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod listing;
pub mod page;
pub mod parse;
pub mod preprocess;
pub mod quality;
pub mod search;
pub mod sites;

pub use config::{GleanerConfig, GleanerConfigBuilder, ProviderConfig};
pub use encoding::{decode_html, resolve_charset};
pub use error::{GleanerError, Result};
#[doc(hidden)]
pub use extract::{extract_body, extract_generic_tier, extract_news_tier};
pub use extract::{ExtractConfig, ExtractedContent, extract_article, extract_content, truncate_content};
pub use fetch::{FetchConfig, PageFetcher, RawPage};
pub use listing::{find_article_link, is_list_page};
pub use page::{FetchOutcome, PagePipeline};
pub use parse::{Document, Element};
pub use preprocess::strip_noise;
pub use quality::{ACCEPT_THRESHOLD, QualityScore, score_content};
pub use search::orchestrator::SearchOrchestrator;
pub use search::serpapi::SerpApiProvider;
pub use search::serper::SerperProvider;
pub use search::service::{SearchMeta, SearchResponse, SearchService, placeholder_result};
pub use search::{Enricher, ProviderKind, SearchProvider, SearchResult};
pub use sites::{BodyMode, SiteRegistry, SiteRule};
