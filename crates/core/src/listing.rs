//! Detection of index and listing pages.
//!
//! Search results often point at section fronts, tag pages or archives
//! rather than a single article. Those pages are recognised here, and the
//! most plausible article link on them is picked so the page pipeline can
//! follow it.

use std::collections::{HashMap, HashSet};

use url::Url;

use crate::parse::{Document, char_len};

/// Minimum number of links sharing a first path segment.
pub const MIN_PATTERN_LINKS: usize = 5;

/// Minimum share of counted links sharing a first path segment.
pub const MIN_PATTERN_SHARE: f64 = 0.2;

/// A page with more `li`-wrapped links than this is a listing.
pub const MAX_LIST_ITEM_LINKS: usize = 10;

/// Terms that mark section fronts, directories and recommendation blocks.
pub const LIST_KEYWORDS: &[&str] = &["目录", "索引", "列表", "分类", "最新文章", "相关阅读", "热门", "推荐"];

/// Link targets that never lead to an article.
pub const NON_ARTICLE_HREF_TERMS: &[&str] = &[
    "login", "register", "search", "category", "tag", "author", "about", "contact", "feed", "rss",
];

const MIN_ARTICLE_LINK_CHARS: usize = 15;
const MAX_ARTICLE_LINK_CHARS: usize = 100;

/// Whether the document looks like a listing rather than one article.
///
/// Either signal is sufficient: one first path segment dominating the
/// outbound links, or listing vocabulary and `li`-wrapped link density.
pub fn is_list_page(doc: &Document) -> bool {
    if dominant_link_pattern(doc).is_some() {
        tracing::debug!("list page: dominant link pattern");
        return true;
    }

    if has_list_keywords(&doc.body_text()) {
        tracing::debug!("list page: listing keywords");
        return true;
    }

    let li_links = doc.select("li a").map(|links| links.len()).unwrap_or(0);
    if li_links > MAX_LIST_ITEM_LINKS {
        tracing::debug!(li_links, "list page: list item links");
        return true;
    }

    false
}

/// The first path segment shared by at least [`MIN_PATTERN_LINKS`] links
/// and [`MIN_PATTERN_SHARE`] of all counted links, if any.
///
/// Fragment-only and `javascript:` links are not counted, nor are links
/// that fail to resolve. Links to a root path count toward the total but
/// have no segment of their own.
pub fn dominant_link_pattern(doc: &Document) -> Option<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut total = 0usize;

    for href in outbound_hrefs(doc) {
        let Some(url) = doc.resolve(&href) else {
            continue;
        };
        total += 1;

        if let Some(segment) = first_path_segment(&url) {
            *counts.entry(segment).or_default() += 1;
        }
    }

    if total == 0 {
        return None;
    }

    let (segment, count) = counts.into_iter().max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))?;
    let share = count as f64 / total as f64;

    (count >= MIN_PATTERN_LINKS && share >= MIN_PATTERN_SHARE).then_some(segment)
}

/// Whether the text contains any of [`LIST_KEYWORDS`].
pub fn has_list_keywords(text: &str) -> bool {
    LIST_KEYWORDS.iter().any(|keyword| text.contains(keyword))
}

/// Picks the first plausible article link on a listing page.
///
/// Candidates have anchor text strictly between 15 and 100 characters,
/// resolve to an http(s) URL and avoid account, search, taxonomy and feed
/// targets. Links are deduplicated by absolute URL.
pub fn find_article_link(doc: &Document) -> Option<Url> {
    article_links(doc).into_iter().next()
}

/// All plausible article links in document order, deduplicated.
pub fn article_links(doc: &Document) -> Vec<Url> {
    let Ok(anchors) = doc.select("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for anchor in anchors {
        let Some(href) = anchor.attr("href") else {
            continue;
        };
        if is_skipped_href(href) {
            continue;
        }

        let text_len = char_len(anchor.text().trim());
        if text_len <= MIN_ARTICLE_LINK_CHARS || text_len >= MAX_ARTICLE_LINK_CHARS {
            continue;
        }

        let lowered = href.to_lowercase();
        if NON_ARTICLE_HREF_TERMS.iter().any(|term| lowered.contains(term)) {
            continue;
        }

        let Some(url) = doc.resolve(href) else {
            continue;
        };
        if !matches!(url.scheme(), "http" | "https") {
            continue;
        }

        if seen.insert(url.as_str().to_string()) {
            links.push(url);
        }
    }

    links
}

fn outbound_hrefs(doc: &Document) -> Vec<String> {
    doc.select("a[href]")
        .map(|anchors| {
            anchors
                .iter()
                .filter_map(|a| a.attr("href"))
                .filter(|href| !is_skipped_href(href))
                .map(|href| href.trim().to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn is_skipped_href(href: &str) -> bool {
    let href = href.trim();
    href.is_empty() || href.starts_with('#') || href.to_lowercase().starts_with("javascript:")
}

fn first_path_segment(url: &Url) -> Option<String> {
    url.path_segments()?.find(|s| !s.is_empty()).map(str::to_string)
}
