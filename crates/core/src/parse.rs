//! HTML parsing and DOM querying.
//!
//! This module provides the [`Document`] and [`Element`] types for parsing
//! HTML and navigating the DOM tree using CSS selectors.
//!
//! # Example
//!
//! ```rust
//! use gleaner_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <nav>Home | About</nav>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse_cleaned(html, None);
//! let paragraphs = doc.select("p.content").unwrap();
//! assert_eq!(paragraphs.len(), 1);
//! assert!(!doc.body_text().contains("Home"));
//! ```

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::preprocess::strip_noise;
use crate::{GleanerError, Result};

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Collapse every whitespace run, newlines included, to a single space and
/// trim. The result never contains a line break.
pub fn normalize_text(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

/// Number of characters in `text`, the unit every length threshold uses.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Represents a parsed HTML document.
///
/// A Document wraps an HTML page and provides methods for querying elements
/// using CSS selectors and reading text, titles and meta tags. The optional
/// base URL is the page location, used to resolve relative links.
pub struct Document {
    html: Html,
    base_url: Option<Url>,
}

impl Document {
    /// Parses HTML from a string as-is.
    ///
    /// # Example
    ///
    /// ```rust
    /// use gleaner_core::parse::Document;
    ///
    /// let doc = Document::parse("<html><head><title>Test</title></head></html>");
    /// assert_eq!(doc.title(), Some("Test".to_string()));
    /// ```
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html), base_url: None }
    }

    /// Parses HTML after stripping the noise denylist.
    ///
    /// Scripts, styles, navigation, headers, footers, ads, comment threads,
    /// share widgets and asides are removed before the tree is built, so no
    /// extraction pass ever sees them.
    pub fn parse_cleaned(html: &str, base_url: Option<Url>) -> Self {
        let cleaned = strip_noise(html);
        Self { html: Html::parse_document(&cleaned), base_url }
    }

    /// Attaches the page URL used to resolve relative links.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Gets the base URL, if one was provided.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Selects elements using a CSS selector, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`GleanerError::HtmlParseError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use gleaner_core::parse::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html);
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Selects the first element matching a CSS selector.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).next().map(|el| Element { element: el }))
    }

    /// Selects matches that are not nested inside an earlier match.
    ///
    /// Broad class selectors such as `.content` often match a container and
    /// one of its descendants; keeping only the outermost match avoids
    /// counting the same text twice.
    pub fn select_outermost(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let mut kept: Vec<Element<'_>> = Vec::new();
        for element in self.select(selector)? {
            if !kept.iter().any(|outer| element.is_within(outer)) {
                kept.push(element);
            }
        }
        Ok(kept)
    }

    /// Gets the trimmed text of the `<title>` element.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    }

    /// Gets the `content` attribute of the first element matching `selector`.
    ///
    /// Intended for `meta` lookups such as
    /// `meta[property="article:published_time"]`. Empty values count as absent.
    pub fn meta_content(&self, selector: &str) -> Option<String> {
        self.select_first(selector)
            .ok()
            .flatten()
            .and_then(|el| el.attr("content").map(|v| v.trim().to_string()))
            .filter(|v| !v.is_empty())
    }

    /// Gets the normalized text of `<body>`, or of the whole document when
    /// there is no body.
    pub fn body_text(&self) -> String {
        match self.select_first("body") {
            Ok(Some(body)) => body.normalized_text(),
            _ => normalize_text(&self.text_content()),
        }
    }

    /// Gets all text content from the document, unnormalized.
    pub fn text_content(&self) -> String {
        self.html.root_element().text().collect()
    }

    /// Resolves `href` against the base URL.
    ///
    /// Absolute hrefs resolve without a base URL; relative ones need it.
    pub fn resolve(&self, href: &str) -> Option<Url> {
        match &self.base_url {
            Some(base) => base.join(href).ok(),
            None => Url::parse(href).ok(),
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| GleanerError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// A wrapper around scraper's ElementRef.
///
/// # Example
///
/// ```rust
/// use gleaner_core::parse::Document;
///
/// let html = r#"<a href="https://example.com">Link   text</a>"#;
/// let doc = Document::parse(html);
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.normalized_text(), "Link text");
/// assert_eq!(link.attr("href"), Some("https://example.com"));
/// ```
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: scraper::ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the concatenation of all text nodes within this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the text content with whitespace normalized.
    pub fn normalized_text(&self) -> String {
        normalize_text(&self.text())
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Whether this element is a descendant of `other`.
    pub fn is_within(&self, other: &Element<'_>) -> bool {
        let target = other.element.id();
        self.element.ancestors().any(|node| node.id() == target)
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`GleanerError::HtmlParseError`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).map(|el| Element { element: el }).collect())
    }
}
