// src/crawl/mod.rs
// =============================================================================
// This module discovers the pages of a website.
//
// Features:
// - Breadth-first crawling starting from the root URL
// - Same-host restriction, querystring stripping, extension exclusions
// - robots.txt support
// - Concurrent page fetches with a configurable limit
//
// The pipeline only needs "give me the URLs", expressed by the `UrlSource`
// trait, so tests can hand it a fixed list instead of hitting the network.
// =============================================================================

mod links;
mod queue;
mod robots;
mod scope;

use anyhow::Result;
use async_trait::async_trait;
use url::Url;

pub use queue::Crawler;

/// Produces the list of URLs to audit for a root URL.
#[async_trait]
pub trait UrlSource: Send + Sync {
    async fn discover(&self, root: &Url) -> Result<Vec<Url>>;
}
