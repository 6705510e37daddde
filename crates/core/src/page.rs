//! One content acquisition attempt for one URL.
//!
//! [`PagePipeline`] chains the fetcher, charset resolution, noise removal,
//! listing detection, site rules, generic extraction and quality scoring.
//! Every failure is folded into a [`FetchOutcome`] with `success: false`, so
//! callers never handle errors from this layer.
//!
//! Parsed documents are not `Send`; they are built and dropped inside the
//! synchronous sections between fetches.

use std::sync::Arc;

use serde::Serialize;
use url::Url;

use crate::encoding::decode_html;
use crate::extract::{ExtractConfig, extract_article, truncate_content};
use crate::fetch::{FetchConfig, PageFetcher};
use crate::listing::{find_article_link, is_list_page};
use crate::parse::Document;
use crate::quality::{ACCEPT_THRESHOLD, QualityScore, score_content};
use crate::sites::SiteRegistry;
use crate::{GleanerError, Result};

/// Title reported when a page could not be acquired.
pub const FAILURE_TITLE: &str = "无法访问此链接";

/// Result of one acquisition attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchOutcome {
    /// URL the content came from; the article URL when a listing was followed.
    pub url: String,
    pub title: String,
    /// Extracted text, truncated, or a failure message when `success` is false.
    pub content: String,
    pub publish_date: Option<String>,
    pub success: bool,
    /// Present whenever scoring ran, including rejections.
    pub quality: Option<QualityScore>,
}

impl FetchOutcome {
    /// Outcome for a page that could not be fetched or decoded.
    pub fn failure(url: &str, err: &GleanerError) -> Self {
        Self {
            url: url.to_string(),
            title: FAILURE_TITLE.to_string(),
            content: format!("爬取失败: {err}"),
            publish_date: None,
            success: false,
            quality: None,
        }
    }
}

/// Fetches a page and turns it into a [`FetchOutcome`].
#[derive(Debug, Clone)]
pub struct PagePipeline {
    fetcher: PageFetcher,
    registry: Arc<SiteRegistry>,
    config: ExtractConfig,
}

impl PagePipeline {
    pub fn new(fetcher: PageFetcher, registry: Arc<SiteRegistry>, config: ExtractConfig) -> Self {
        Self { fetcher, registry, config }
    }

    /// Pipeline with the built-in site rules.
    pub fn from_config(fetch: FetchConfig, extract: ExtractConfig) -> Result<Self> {
        Ok(Self::new(PageFetcher::new(fetch)?, Arc::new(SiteRegistry::builtin()), extract))
    }

    /// Fetch `url` and extract its article.
    ///
    /// Listing pages are followed to their first article link once; if the
    /// followed page fails or is rejected, the listing's own outcome is
    /// returned.
    pub async fn fetch_and_extract(&self, url: &str) -> FetchOutcome {
        match self.acquire(url).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(url, error = %e, "page acquisition failed");
                FetchOutcome::failure(url, &e)
            }
        }
    }

    async fn acquire(&self, url: &str) -> Result<FetchOutcome> {
        let (next, outcome) = self.acquire_once(url, self.config.follow_list_pages).await?;

        if let Some(next) = next {
            tracing::debug!(list = url, article = %next, "following article link from list page");
            match self.acquire_once(next.as_str(), false).await {
                Ok((_, followed)) if followed.success => return Ok(followed),
                Ok(_) => tracing::debug!(article = %next, "followed article rejected, keeping list page"),
                Err(e) => tracing::debug!(article = %next, error = %e, "followed article failed, keeping list page"),
            }
        }

        Ok(outcome)
    }

    async fn acquire_once(&self, url: &str, follow_lists: bool) -> Result<(Option<Url>, FetchOutcome)> {
        let page = self.fetcher.fetch(url).await?;
        tracing::debug!(url = %page.url, status = page.status, bytes = page.bytes.len(), "page fetched");
        let html = decode_html(&page.bytes, page.content_type.as_deref());
        Ok(self.analyze(&html, &page.url, follow_lists))
    }

    /// Extract and score a page, returning the article link to follow when
    /// the page is a listing and `follow_lists` is set.
    pub fn analyze(&self, html: &str, url: &Url, follow_lists: bool) -> (Option<Url>, FetchOutcome) {
        let doc = Document::parse_cleaned(html, Some(url.clone()));

        let next = if follow_lists && is_list_page(&doc) { find_article_link(&doc) } else { None };
        let outcome = self.extract_document(&doc, url.as_str());

        (next, outcome)
    }

    /// Extract and score already-fetched HTML without following listings.
    ///
    /// # Example
    ///
    /// ```rust
    /// use gleaner_core::{ExtractConfig, FetchConfig, PagePipeline};
    ///
    /// let pipeline = PagePipeline::from_config(FetchConfig::default(), ExtractConfig::default()).unwrap();
    /// let outcome = pipeline.extract_html("<html><body><p>Hi</p></body></html>", "https://example.com/");
    /// assert!(!outcome.success);
    /// assert!(outcome.quality.is_some());
    /// ```
    pub fn extract_html(&self, html: &str, url: &str) -> FetchOutcome {
        let base = Url::parse(url).ok();
        let doc = Document::parse_cleaned(html, base);
        self.extract_document(&doc, url)
    }

    fn extract_document(&self, doc: &Document, url: &str) -> FetchOutcome {
        let extracted = extract_article(doc, url, &self.registry);
        let quality = score_content(&extracted.content);

        if !quality.is_acceptable() {
            let err = GleanerError::NotReadable {
                score: quality.score,
                threshold: ACCEPT_THRESHOLD,
                reason: quality.reason.clone(),
            };
            tracing::debug!(url, score = quality.score, reason = %quality.reason, "content rejected");
            return FetchOutcome {
                url: url.to_string(),
                title: extracted.title,
                content: err.to_string(),
                publish_date: extracted.publish_date,
                success: false,
                quality: Some(quality),
            };
        }

        tracing::debug!(url, score = quality.score, site = extracted.site, "content accepted");
        FetchOutcome {
            url: url.to_string(),
            title: extracted.title,
            content: truncate_content(&extracted.content, self.config.max_content_length),
            publish_date: extracted.publish_date,
            success: true,
            quality: Some(quality),
        }
    }
}
