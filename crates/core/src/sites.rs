//! Publisher-specific extraction rules.
//!
//! Well-known publishers get a dedicated rule naming where their body,
//! headline and date live. The table is built once at startup and shared
//! read-only by every enrichment task.
//!
//! # Example
//!
//! ```rust
//! use gleaner_core::sites::SiteRegistry;
//!
//! let registry = SiteRegistry::builtin();
//! assert_eq!(registry.lookup("news.sina.com.cn").map(|r| r.name), Some("sina"));
//! assert_eq!(registry.lookup("m.news.sina.com.cn").map(|r| r.name), Some("sina"));
//! assert!(registry.lookup("example.org").is_none());
//! ```

use crate::extract::{ExtractedContent, MIN_CONTENT_CHARS, extract_publish_date_with, extract_title, paragraph_text};
use crate::parse::{Document, char_len};

/// How a rule turns its body container into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// Join qualifying `<p>` texts with blank lines, falling back to the
    /// container text.
    Paragraphs,
    /// Take the container's normalized text.
    Text,
}

/// Extraction rule for one publisher.
#[derive(Debug, Clone, Copy)]
pub struct SiteRule {
    /// Short identifier reported on extracted content.
    pub name: &'static str,
    /// Hostnames served by the publisher.
    pub hosts: &'static [&'static str],
    /// Body containers, first match wins.
    pub body: &'static [&'static str],
    /// Headline elements, first non-empty match wins.
    pub title: &'static [&'static str],
    /// Date elements tried before the generic date containers.
    pub date: &'static [&'static str],
    pub mode: BodyMode,
}

impl SiteRule {
    /// Extract content with this rule.
    ///
    /// Returns `None` when no body selector matches or the body text is
    /// shorter than [`MIN_CONTENT_CHARS`], so the caller can fall through
    /// to generic extraction.
    pub fn extract(&self, doc: &Document) -> Option<ExtractedContent> {
        let container = self.body.iter().find_map(|selector| doc.select_first(selector).ok().flatten())?;

        let content = match self.mode {
            BodyMode::Paragraphs => {
                let paragraphs = paragraph_text(&container);
                if paragraphs.is_empty() { container.normalized_text() } else { paragraphs }
            }
            BodyMode::Text => container.normalized_text(),
        };

        if char_len(&content) < MIN_CONTENT_CHARS {
            return None;
        }

        let title = self
            .title
            .iter()
            .filter_map(|selector| doc.select_first(selector).ok().flatten())
            .map(|el| el.normalized_text())
            .find(|text| !text.is_empty())
            .unwrap_or_else(|| extract_title(doc));

        Some(ExtractedContent {
            title,
            content,
            publish_date: extract_publish_date_with(doc, self.date),
            site: Some(self.name),
        })
    }

    fn matches_exact(&self, host: &str) -> bool {
        self.hosts.iter().any(|h| *h == host)
    }

    fn matches_within(&self, host: &str) -> bool {
        self.hosts.iter().any(|h| host.contains(h))
    }
}

/// Ordered table of site rules.
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    rules: Vec<SiteRule>,
}

impl SiteRegistry {
    /// Registry with the given rules, in priority order.
    pub fn new(rules: Vec<SiteRule>) -> Self {
        Self { rules }
    }

    /// Registry with the built-in publisher rules.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_RULES.to_vec())
    }

    /// Registry that never matches.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Find the rule for a hostname.
    ///
    /// Exact hostname matches across all rules win over containment
    /// matches, so `news.163.com` prefers a rule listing it over one listing
    /// `163.com`. Comparison is case-insensitive.
    pub fn lookup(&self, host: &str) -> Option<&SiteRule> {
        let host = host.to_ascii_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches_exact(&host))
            .or_else(|| self.rules.iter().find(|rule| rule.matches_within(&host)))
    }

    pub fn rules(&self) -> &[SiteRule] {
        &self.rules
    }
}

impl Default for SiteRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

const BUILTIN_RULES: &[SiteRule] = &[
    SiteRule {
        name: "sina",
        hosts: &["news.sina.com.cn", "finance.sina.com.cn", "sina.com.cn"],
        body: &["#article", "#artibody", ".article"],
        title: &[".main-title", "h1"],
        date: &[".date-source .date", "#pub_date"],
        mode: BodyMode::Paragraphs,
    },
    SiteRule {
        name: "netease",
        hosts: &["news.163.com", "www.163.com", "163.com"],
        body: &[".post_body", "#endText", "#content .post_text"],
        title: &[".post_title", "h1"],
        date: &[".post_info", ".post_time_source"],
        mode: BodyMode::Paragraphs,
    },
    SiteRule {
        name: "tencent",
        hosts: &["new.qq.com", "news.qq.com"],
        body: &[".content-article", ".rich_media_content", ".LEFT .content"],
        title: &[".LEFT h1", "h1"],
        date: &[".media-meta .time", ".article-time"],
        mode: BodyMode::Paragraphs,
    },
    SiteRule {
        name: "wechat",
        hosts: &["mp.weixin.qq.com"],
        body: &["#js_content", ".rich_media_content"],
        title: &["#activity-name", ".rich_media_title"],
        date: &["#publish_time"],
        mode: BodyMode::Text,
    },
    SiteRule {
        name: "thepaper",
        hosts: &["www.thepaper.cn", "m.thepaper.cn", "thepaper.cn"],
        body: &[".news_txt", "[class*=\"cententWrap\"]", ".index_cententWrap__Jv8jK"],
        title: &[".news_title", "h1"],
        date: &[".news_about p", "[class*=\"headerContent\"] span"],
        mode: BodyMode::Paragraphs,
    },
    SiteRule {
        name: "sohu",
        hosts: &["www.sohu.com", "m.sohu.com"],
        body: &["article.article", "#mp-editor", ".article"],
        title: &[".text-title h1", "h1"],
        date: &["#news-time", ".time"],
        mode: BodyMode::Paragraphs,
    },
    SiteRule {
        name: "xinhua",
        hosts: &["www.news.cn", "www.xinhuanet.com", "news.cn", "xinhuanet.com"],
        body: &["#detail", "#p-detail", ".main-aticle"],
        title: &[".head-line .title", "h1"],
        date: &[".header-time", ".h-time"],
        mode: BodyMode::Paragraphs,
    },
    SiteRule {
        name: "people",
        hosts: &["www.people.com.cn", "people.com.cn"],
        body: &[".rm_txt_con", "#rwb_zw", ".box_con"],
        title: &[".rm_txt h1", "h1"],
        date: &[".col-1-1", ".channel .fl"],
        mode: BodyMode::Paragraphs,
    },
    SiteRule {
        name: "csdn",
        hosts: &["blog.csdn.net"],
        body: &["#content_views", "#article_content"],
        title: &["#articleContentId", ".title-article"],
        date: &[".time", ".up-time"],
        mode: BodyMode::Text,
    },
    SiteRule {
        name: "zhihu",
        hosts: &["zhuanlan.zhihu.com", "www.zhihu.com"],
        body: &[".Post-RichText", ".RichText"],
        title: &[".Post-Title", ".QuestionHeader-title"],
        date: &[".ContentItem-time"],
        mode: BodyMode::Paragraphs,
    },
    SiteRule {
        name: "jianshu",
        hosts: &["www.jianshu.com"],
        body: &["article", ".show-content"],
        title: &["h1", ".title"],
        date: &["time", ".publish-time"],
        mode: BodyMode::Paragraphs,
    },
    SiteRule {
        name: "bbc",
        hosts: &["www.bbc.com", "www.bbc.co.uk", "bbc.com", "bbc.co.uk"],
        body: &["article", "#main-content"],
        title: &["#main-heading", "h1"],
        date: &["time[datetime]"],
        mode: BodyMode::Paragraphs,
    },
    SiteRule {
        name: "reuters",
        hosts: &["www.reuters.com", "reuters.com"],
        body: &["[data-testid=\"ArticleBody\"]", "article"],
        title: &["[data-testid=\"Heading\"]", "h1"],
        date: &["time[datetime]"],
        mode: BodyMode::Paragraphs,
    },
    SiteRule {
        name: "wikipedia",
        hosts: &["wikipedia.org"],
        body: &["#mw-content-text .mw-parser-output", "#mw-content-text"],
        title: &["#firstHeading"],
        date: &[],
        mode: BodyMode::Paragraphs,
    },
];
