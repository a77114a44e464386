// src/crawl/queue.rs
// =============================================================================
// This module implements website crawling with a breadth-first approach.
//
// How it works:
// 1. Start with the root URL as the only page at depth 1
// 2. Fetch every page of the current depth (up to `concurrency` at once)
// 3. Extract links from the HTML pages, keep the in-scope ones we have not
//    seen yet, and queue them as the next depth
// 4. Repeat until nothing new is found, max_depth is reached or max_urls
//    URLs were discovered
//
// Politeness:
// - robots.txt is honoured (unless disabled)
// - a short delay after every fetched page
// - only the crawl host is visited (unless disabled)
// =============================================================================

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use super::links::extract_links;
use super::robots::RobotsRules;
use super::scope::Scope;
use super::UrlSource;
use crate::config::CrawlerConfig;

// A fetched page. `html` is None for anything that is not an HTML document,
// we never parse those for links.
#[derive(Debug)]
struct FetchedPage {
    /// URL after redirects
    final_url: Url,
    html: Option<String>,
}

pub struct Crawler {
    config: CrawlerConfig,
    client: Client,
}

impl Crawler {
    pub fn new(config: CrawlerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .context("building HTTP client")?;
        Ok(Self { config, client })
    }

    // Crawls the site under `root` and returns every in-scope URL found,
    // root first, then in discovery order.
    pub async fn crawl(&self, root: &Url) -> Result<Vec<Url>> {
        let host = root
            .host_str()
            .ok_or_else(|| anyhow!("URL has no host: {}", root))?;
        let mut scope = Scope::new(&self.config, host)?;
        let mut robots = self.robots_for(root).await;

        let root = scope.normalize(root.clone());
        let mut visited: HashSet<Url> = HashSet::new();
        visited.insert(root.clone());
        let mut discovered = vec![root.clone()];

        info!(host = scope.host(), "starting crawl");

        let mut frontier = vec![root];
        let mut depth = 1;

        while !frontier.is_empty() {
            debug!(depth, pages = frontier.len(), "fetching depth");

            let pages: Vec<(Url, Result<FetchedPage>)> = stream::iter(frontier)
                .map(move |url| async move {
                    let page = self.fetch_page(&url).await;
                    (url, page)
                })
                .buffer_unordered(self.config.concurrency.max(1))
                .collect()
                .await;

            let mut next = Vec::new();
            for (url, page) in pages {
                let page = match page {
                    Ok(page) => page,
                    Err(e) => {
                        warn!(%url, "failed to fetch: {:#}", e);
                        continue;
                    }
                };

                if depth == 1 && self.config.allow_initial_domain_change {
                    if let Some(new_host) = page.final_url.host_str() {
                        if new_host != scope.host() {
                            info!(from = scope.host(), to = new_host, "root redirected, following new host");
                            scope.set_host(new_host);
                            robots = self.robots_for(&page.final_url).await;
                        }
                    }
                }
                // A redirect target is the page we just fetched
                visited.insert(scope.normalize(page.final_url.clone()));

                let Some(html) = page.html else {
                    continue;
                };
                if self.config.max_depth != 0 && depth >= self.config.max_depth {
                    continue;
                }

                for link in extract_links(&html, &page.final_url) {
                    if self.limit_reached(discovered.len()) {
                        break;
                    }
                    let link = scope.normalize(link);
                    if !scope.admits(&link) || visited.contains(&link) {
                        continue;
                    }
                    if !robots.is_allowed(&link) {
                        debug!(url = %link, "disallowed by robots.txt");
                        continue;
                    }

                    visited.insert(link.clone());
                    info!(url = %link, "Pushed");
                    discovered.push(link.clone());
                    next.push(link);
                }
            }

            if self.limit_reached(discovered.len()) {
                info!(limit = ?self.config.max_urls, "max_urls reached, stopping crawl");
                break;
            }

            frontier = next;
            depth += 1;
        }

        info!(pages = discovered.len(), "crawl complete");
        Ok(discovered)
    }

    fn limit_reached(&self, count: usize) -> bool {
        self.config.max_urls.is_some_and(|max| count >= max)
    }

    async fn fetch_page(&self, url: &Url) -> Result<FetchedPage> {
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP {}", response.status()));
        }

        let final_url = response.url().clone();
        // No content type at all is treated as HTML, like most browsers do
        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map_or(true, |value| value.to_ascii_lowercase().contains("text/html"));

        let html = if is_html {
            Some(response.text().await?)
        } else {
            None
        };

        if self.config.politeness_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.politeness_delay_ms)).await;
        }

        Ok(FetchedPage { final_url, html })
    }

    // Loads robots.txt for the host of `url`. A missing or unreadable file
    // means everything is allowed.
    async fn robots_for(&self, url: &Url) -> RobotsRules {
        if !self.config.respect_robots_txt {
            return RobotsRules::allow_all();
        }

        let Ok(robots_url) = url.join("/robots.txt") else {
            return RobotsRules::allow_all();
        };

        let body = match self.client.get(robots_url.clone()).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(url = %robots_url, "could not read robots.txt: {}", e);
                    return RobotsRules::allow_all();
                }
            },
            Ok(response) => {
                debug!(url = %robots_url, status = %response.status(), "no robots.txt");
                return RobotsRules::allow_all();
            }
            Err(e) => {
                warn!(url = %robots_url, "could not fetch robots.txt: {}", e);
                return RobotsRules::allow_all();
            }
        };

        match RobotsRules::parse(&body, &self.config.user_agent) {
            Ok(rules) => {
                debug!(url = %robots_url, "loaded robots.txt");
                rules
            }
            Err(e) => {
                warn!(url = %robots_url, "ignoring robots.txt: {:#}", e);
                RobotsRules::allow_all()
            }
        }
    }
}

#[async_trait]
impl UrlSource for Crawler {
    async fn discover(&self, root: &Url) -> Result<Vec<Url>> {
        self.crawl(root).await
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why crawl one depth at a time?
//    - All pages of a depth are independent, so they can be fetched together
//    - buffer_unordered(n) keeps at most n requests in flight
//    - Results come back in completion order, which is fine: we only need
//      every page of this depth before moving on to the next one
//
// 2. Why HashSet<Url>?
//    - The same page is usually linked from many others
//    - Normalizing first (no fragment, maybe no querystring) and then
//      checking the set makes sure each page is visited once
//
// 3. What does `let Some(html) = page.html else { continue };` do?
//    - It is "let-else": bind the value if the pattern matches,
//      otherwise run the else block (which must leave the scope)
// -----------------------------------------------------------------------------
