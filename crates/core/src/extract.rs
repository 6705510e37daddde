use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::parse::{Document, Element, char_len};
use crate::sites::SiteRegistry;

/// Content shorter than this is treated as "nothing found" by every tier.
pub const MIN_CONTENT_CHARS: usize = 100;

/// Paragraphs of this many characters or fewer are dropped.
pub const MIN_PARAGRAPH_CHARS: usize = 10;

/// Marker appended to truncated content.
pub const ELLIPSIS: &str = "...";

const MIN_H1_CHARS: usize = 5;
const MAX_H1_CHARS: usize = 100;

/// Containers tried in order on news-like URLs; the first one yielding
/// text wins.
pub const NEWS_CONTENT_SELECTORS: &[&str] = &[
    "article",
    ".article",
    ".article-content",
    ".article-body",
    ".story-body",
    ".news-content",
    ".news-text",
    ".content-detail",
    ".story-content",
    ".post-content",
    ".entry-content",
    ".main-content",
    "#article-content",
    ".text-content",
    ".detail",
    ".detailContent",
    ".content-wrapper",
];

/// Broader containers; the longest text across all of them wins.
pub const GENERIC_CONTENT_SELECTORS: &[&str] = &[
    "article",
    ".article",
    ".content",
    ".main",
    ".post",
    ".entry",
    ".entry-content",
    "#content",
    "#main",
    "#article",
    ".body",
    ".post-content",
    ".article-content",
    "main",
    "[role=\"main\"]",
    ".text",
    ".container",
    ".page-content",
    ".page",
    ".news",
    ".story",
];

/// Structured publish-date metadata, read in document order.
pub const META_DATE_SELECTOR: &str = r#"meta[property="article:published_time"], meta[name="pubdate"], meta[name="publishdate"], meta[itemprop="datePublished"]"#;

/// Visible date containers, tried in order.
pub const DATE_SELECTORS: &[&str] = &[
    ".date",
    ".time",
    ".publish-date",
    ".publish-time",
    ".article-date",
    ".article-time",
    ".post-date",
    ".post-time",
    ".entry-date",
    ".timestamp",
    "[itemprop=\"datePublished\"]",
    ".news-date",
    ".news-time",
];

static NEWS_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"news|article|post|blog|新闻|资讯|报道").unwrap());

static DATE_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}[-/]\d{1,2}[-/]\d{1,2}|\d{1,2}[-/]\d{1,2}[-/]\d{4}").unwrap());

/// Configuration for content extraction
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Maximum characters of content kept after scoring
    pub max_content_length: usize,
    /// Whether listing pages are followed to their first article link
    pub follow_list_pages: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { max_content_length: 3000, follow_list_pages: true }
    }
}

/// The result of content extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedContent {
    /// Page title
    pub title: String,
    /// Article text, untruncated
    pub content: String,
    /// Publish date as found on the page
    pub publish_date: Option<String>,
    /// Name of the site rule that produced the content, if any
    pub site: Option<&'static str>,
}

/// Whether the URL looks like it points at a news item, article or post.
pub fn is_news_url(url: &str) -> bool {
    NEWS_URL.is_match(url)
}

/// Join the `<p>` texts of `container` that are longer than
/// [`MIN_PARAGRAPH_CHARS`] with blank lines.
pub fn paragraph_text(container: &Element<'_>) -> String {
    container
        .select("p")
        .map(|paragraphs| {
            paragraphs
                .iter()
                .map(|p| p.text().trim().to_string())
                .filter(|text| char_len(text) > MIN_PARAGRAPH_CHARS)
                .collect::<Vec<_>>()
                .join("\n\n")
        })
        .unwrap_or_default()
}

/// News tier: the first container selector yielding content wins.
///
/// Within the matched containers, qualifying paragraphs are preferred and
/// the containers' full text is the fallback.
pub fn extract_news_tier(doc: &Document) -> String {
    for selector in NEWS_CONTENT_SELECTORS {
        let Ok(containers) = doc.select_outermost(selector) else {
            continue;
        };
        if containers.is_empty() {
            continue;
        }

        let paragraphs: Vec<String> =
            containers.iter().map(paragraph_text).filter(|text| !text.is_empty()).collect();

        let content = if paragraphs.is_empty() {
            joined_text(&containers)
        } else {
            paragraphs.join("\n\n")
        };

        if !content.is_empty() {
            tracing::debug!(selector, chars = char_len(&content), "news tier matched");
            return content;
        }
    }

    String::new()
}

/// Generic tier: the longest normalized text across all selectors wins.
pub fn extract_generic_tier(doc: &Document) -> String {
    let mut best = String::new();
    let mut best_len = 0;

    for selector in GENERIC_CONTENT_SELECTORS {
        let Ok(containers) = doc.select_outermost(selector) else {
            continue;
        };
        if containers.is_empty() {
            continue;
        }

        let text = joined_text(&containers);
        let len = char_len(&text);
        if len > best_len {
            best = text;
            best_len = len;
        }
    }

    best
}

fn joined_text(containers: &[Element<'_>]) -> String {
    containers
        .iter()
        .map(Element::normalized_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run the tiers in order, falling back to the whole body.
pub fn extract_body(doc: &Document, url: &str) -> String {
    let mut content = if is_news_url(url) { extract_news_tier(doc) } else { String::new() };

    if char_len(&content) < MIN_CONTENT_CHARS {
        let generic = extract_generic_tier(doc);
        if char_len(&generic) > char_len(&content) || content.is_empty() {
            content = generic;
        }
    }

    if char_len(&content) < MIN_CONTENT_CHARS {
        tracing::debug!(url, "falling back to full body text");
        content = doc.body_text();
    }

    content
}

/// Page `<title>`, overridden by the first `<h1>` when its length is
/// strictly between 5 and 100 characters.
pub fn extract_title(doc: &Document) -> String {
    let title = doc.title().unwrap_or_default();

    if let Ok(Some(h1)) = doc.select_first("h1") {
        let text = h1.normalized_text();
        let len = char_len(&text);
        if len > MIN_H1_CHARS && len < MAX_H1_CHARS {
            return text;
        }
    }

    title
}

/// Publish date from structured metadata, then from the first date
/// container whose text looks like a date.
pub fn extract_publish_date(doc: &Document) -> Option<String> {
    extract_publish_date_with(doc, &[])
}

/// Like [`extract_publish_date`], with site-specific containers tried
/// before the generic ones.
///
/// Site containers may carry the date in a `datetime` attribute, which is
/// taken without pattern matching.
pub fn extract_publish_date_with(doc: &Document, site_selectors: &[&str]) -> Option<String> {
    if let Some(date) = doc.meta_content(META_DATE_SELECTOR) {
        return Some(date);
    }

    for selector in site_selectors {
        if let Ok(Some(el)) = doc.select_first(selector) {
            if let Some(datetime) = el.attr("datetime").map(str::trim).filter(|v| !v.is_empty()) {
                return Some(datetime.to_string());
            }
            let text = el.normalized_text();
            if DATE_TEXT.is_match(&text) {
                return Some(text);
            }
        }
    }

    DATE_SELECTORS.iter().find_map(|selector| {
        let el = doc.select_first(selector).ok().flatten()?;
        let text = el.normalized_text();
        DATE_TEXT.is_match(&text).then_some(text)
    })
}

/// Generic extraction: title, tiered body text and publish date.
pub fn extract_content(doc: &Document, url: &str) -> ExtractedContent {
    ExtractedContent {
        title: extract_title(doc),
        content: extract_body(doc, url),
        publish_date: extract_publish_date(doc),
        site: None,
    }
}

/// Site rule first, generic extraction when no rule applies or the rule
/// finds nothing usable.
pub fn extract_article(doc: &Document, url: &str, registry: &SiteRegistry) -> ExtractedContent {
    let parsed = Url::parse(url).ok();
    if let Some(host) = parsed.as_ref().and_then(Url::host_str)
        && let Some(rule) = registry.lookup(host)
    {
        if let Some(extracted) = rule.extract(doc) {
            tracing::debug!(site = rule.name, url, "site rule matched");
            return extracted;
        }
        tracing::debug!(site = rule.name, url, "site rule yielded nothing, using generic extraction");
    }

    extract_content(doc, url)
}

/// Keep the first `max` characters, appending [`ELLIPSIS`] when anything
/// was cut.
pub fn truncate_content(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], ELLIPSIS),
        None => text.to_string(),
    }
}
