use lol_html::{HtmlRewriter, Selector, Settings};

/// Structural and boilerplate elements removed before any extraction pass.
pub const NOISE_SELECTORS: &[&str] = &[
    "script",
    "style",
    "nav",
    "footer",
    "header",
    ".header",
    ".footer",
    ".nav",
    ".menu",
    ".sidebar",
    ".ad",
    ".advertisement",
    "iframe",
    ".comment",
    ".comments",
    ".social",
    ".share",
    ".related",
    "aside",
];

/// Remove every element matching [`NOISE_SELECTORS`], contents included.
///
/// Rewriting failures leave the input untouched.
pub fn strip_noise(html: &str) -> String {
    remove_matching(html, NOISE_SELECTORS)
}

/// Remove elements matching any of `selectors` from the HTML string.
///
/// Selectors lol_html cannot parse are skipped.
pub fn remove_matching(html: &str, selectors: &[&str]) -> String {
    let handlers: Vec<_> = selectors
        .iter()
        .filter(|raw| raw.parse::<Selector>().is_ok())
        .map(|raw| {
            lol_html::element!(*raw, |el| {
                el.remove();
                Ok(())
            })
        })
        .collect();

    if handlers.is_empty() {
        return html.to_string();
    }

    let mut output = String::new();
    let mut rewriter = HtmlRewriter::new(
        Settings { element_content_handlers: handlers, ..Default::default() },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    match rewriter.write(html.as_bytes()) {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    match rewriter.end() {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    if output.is_empty() { html.to_string() } else { output }
}
