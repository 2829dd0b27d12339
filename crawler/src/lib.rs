//! Breadth-first, same-site crawler producing [`Page`]s for the indexer.
//!
//! One fetch is in flight at a time, with an optional fixed delay between
//! fetches. URLs already present in an existing index are never fetched.

pub mod extract;
pub mod fetch;

use sitesearch_core::url::normalize;
use sitesearch_core::Page;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use tokio::time::sleep;

pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use reqwest::Url;

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub start_url: Url,
    /// Pause between successive fetches.
    pub delay: Duration,
    /// Stop after emitting this many pages.
    pub max_pages: Option<usize>,
}

impl CrawlConfig {
    pub fn new(start_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self { start_url: Url::parse(start_url)?, delay: Duration::ZERO, max_pages: None })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }
}

fn same_site(a: &Url, b: &Url) -> bool {
    a.host_str().is_some() && a.host_str() == b.host_str() && a.port() == b.port()
}

/// Crawl the site of `config.start_url`, skipping every URL in `existing_urls`.
///
/// Fetch failures are logged and skipped; the failed page's links are not
/// followed and the URL is not retried during this crawl.
pub async fn crawl<F>(fetcher: &F, config: &CrawlConfig, existing_urls: &HashSet<String>) -> Vec<Page>
where
    F: Fetcher + ?Sized,
{
    let start = &config.start_url;
    let mut visited: HashSet<String> = existing_urls.iter().map(|u| normalize(u)).collect();
    let mut queued: HashSet<String> = HashSet::from([normalize(start.as_str())]);
    let mut frontier: VecDeque<Url> = VecDeque::from([start.clone()]);
    let mut pages = Vec::new();
    let mut fetched = 0usize;
    let mut failed = 0usize;

    while let Some(url) = frontier.pop_front() {
        if config.max_pages.is_some_and(|max| pages.len() >= max) {
            break;
        }
        let key = normalize(url.as_str());
        if !visited.insert(key.clone()) {
            continue;
        }
        if fetched > 0 && !config.delay.is_zero() {
            sleep(config.delay).await;
        }
        fetched += 1;

        tracing::info!(%url, "crawling");
        let body = match fetcher.fetch(&url).await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(%url, error = %err, "failed to retrieve URL");
                failed += 1;
                continue;
            }
        };

        let extracted = extract::extract(&body, start);
        if !extracted.text.is_empty() {
            pages.push(Page { url: key, text: extracted.text });
        }
        for link in extracted.links {
            if !same_site(&link, start) {
                continue;
            }
            let link_key = normalize(link.as_str());
            if visited.contains(&link_key) || !queued.insert(link_key) {
                continue;
            }
            frontier.push_back(link);
        }
    }

    tracing::info!(pages = pages.len(), fetched, failed, pending = frontier.len(), "crawl finished");
    pages
}
