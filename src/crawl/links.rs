// src/crawl/links.rs
// =============================================================================
// Pulls <a href> links out of an HTML page and makes them absolute.
//
// Example:
//   html = "<a href='/docs'>Docs</a>"
//   base = "https://example.com/page"
//   result = ["https://example.com/docs"]
// =============================================================================

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

// The selector is a constant, so parsing it can only fail on a typo here
static ANCHORS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid anchor selector"));

pub fn extract_links(html: &str, base: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);

    document
        .select(&ANCHORS)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(base, href))
        .collect()
}

// Resolves a possibly-relative href against the page URL.
// Returns None for anchors, non-web schemes and unparseable values.
fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
        || href.starts_with("data:")
    {
        return None;
    }

    let url = base.join(href).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/page/").unwrap()
    }

    #[test]
    fn test_absolute_and_relative_links() {
        let html = r#"
            <a href="https://www.rust-lang.org">Rust</a>
            <a href="/docs">Docs</a>
            <a href="../about">About</a>
            <a href="next">Next</a>
        "#;
        let links: Vec<String> = extract_links(html, &base())
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            links,
            vec![
                "https://www.rust-lang.org/",
                "https://example.com/docs",
                "https://example.com/about",
                "https://example.com/page/next",
            ]
        );
    }

    #[test]
    fn test_skips_non_web_links() {
        let html = r##"
            <a href="#section">Anchor</a>
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+123">Phone</a>
            <a href="javascript:void(0)">JS</a>
            <a href="ftp://files.example.com/x">FTP</a>
            <a>No href</a>
        "##;
        assert!(extract_links(html, &base()).is_empty());
    }
}
