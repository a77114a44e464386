// src/crawl/scope.rs
// =============================================================================
// Decides which discovered URLs belong to the crawl.
//
// A URL is in scope when:
// - it is http or https
// - it is on the crawl host (if filter_by_domain is on)
// - its path does not end in an excluded extension (.css, .png, ...)
//
// URLs are normalized before the check: the fragment is always removed and
// the querystring is removed when strip_querystring is on. This way
// /page#top and /page?utm=x count as the same page as /page.
// =============================================================================

use anyhow::{Context, Result};
use regex::Regex;
use url::Url;

use crate::config::CrawlerConfig;

#[derive(Debug, Clone)]
pub struct Scope {
    host: String,
    filter_by_domain: bool,
    strip_querystring: bool,
    excluded: Option<Regex>,
}

impl Scope {
    pub fn new(config: &CrawlerConfig, host: &str) -> Result<Self> {
        Ok(Self {
            host: host.to_ascii_lowercase(),
            filter_by_domain: config.filter_by_domain,
            strip_querystring: config.strip_querystring,
            excluded: excluded_pattern(&config.excluded_extensions)?,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    // Used when the root page redirects to another host
    pub fn set_host(&mut self, host: &str) {
        self.host = host.to_ascii_lowercase();
    }

    pub fn normalize(&self, mut url: Url) -> Url {
        url.set_fragment(None);
        if self.strip_querystring {
            url.set_query(None);
        }
        url
    }

    pub fn admits(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }
        if self.filter_by_domain && url.host_str() != Some(self.host.as_str()) {
            return false;
        }
        match &self.excluded {
            Some(pattern) => !pattern.is_match(url.path()),
            None => true,
        }
    }
}

// Builds `(?i)\.(css|jpg|...)$` from the configured extensions
fn excluded_pattern(extensions: &[String]) -> Result<Option<Regex>> {
    let alternatives: Vec<String> = extensions
        .iter()
        .map(|ext| ext.trim().trim_start_matches('.'))
        .filter(|ext| !ext.is_empty())
        .map(regex::escape)
        .collect();

    if alternatives.is_empty() {
        return Ok(None);
    }

    let pattern = format!(r"(?i)\.({})$", alternatives.join("|"));
    let regex = Regex::new(&pattern)
        .with_context(|| format!("building extension filter from {pattern}"))?;
    Ok(Some(regex))
}
