//! Browser-backed page fetcher with the polite-scrape floor.
//!
//! One fetcher wraps one browser session and is never shared across
//! workers; pages are rendered strictly sequentially.

use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use browserless_client::BrowserlessClient;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::parse::inner_text;
use crate::traits::{FetchedPage, PageSource};

pub struct PageFetcher {
    client: BrowserlessClient,
    /// Minimum spacing between successive page renders.
    delay: Duration,
    last_fetch: Mutex<Option<Instant>>,
}

impl PageFetcher {
    pub fn new(client: BrowserlessClient, delay_seconds: f64) -> Self {
        Self {
            client,
            delay: Duration::from_secs_f64(delay_seconds.max(0.0)),
            last_fetch: Mutex::new(None),
        }
    }

    /// Sleep long enough that two renders are at least `delay` apart.
    /// The lock is held across the sleep: the floor is also a serializer.
    async fn honor_floor(&self) -> tokio::sync::MutexGuard<'_, Option<Instant>> {
        let mut last = self.last_fetch.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.delay {
                tokio::time::sleep(self.delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
        last
    }
}

#[async_trait]
impl PageSource for PageFetcher {
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage> {
        let _guard = self.honor_floor().await;

        let page = match self.client.content(url).await {
            Ok(page) => page,
            Err(e) => {
                // Browser-side failures degrade to an empty page; the caller
                // skips the entity and the batch keeps going.
                warn!(url, error = %e, "Page render failed");
                return Ok(FetchedPage {
                    status: 0,
                    html: String::new(),
                    text: String::new(),
                });
            }
        };

        if page.is_not_found() {
            info!(url, "Page not found");
            return Ok(FetchedPage {
                status: 404,
                html: String::new(),
                text: String::new(),
            });
        }

        let text = inner_text(&page.html);
        info!(url, chars = text.len(), "Fetched page");

        Ok(FetchedPage {
            status: page.status,
            html: page.html,
            text,
        })
    }
}

/// Walk numbered pages of a listing, extracting items from each, until a
/// page comes back empty or `max_pages` is reached. Items are produced in
/// page order.
pub async fn fetch_paged<S, T, F>(
    source: &S,
    url_for_page: impl Fn(u32) -> String,
    max_pages: u32,
    extract: F,
) -> Vec<T>
where
    S: PageSource + ?Sized,
    F: Fn(&FetchedPage) -> Vec<T>,
{
    let mut items = Vec::new();

    for page_no in 1..=max_pages {
        let url = url_for_page(page_no);
        let page = match source.fetch_page(&url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(url, error = %e, "Listing page fetch failed");
                break;
            }
        };

        if page.is_not_found() || page.html.is_empty() {
            break;
        }

        let page_items = extract(&page);
        if page_items.is_empty() {
            break;
        }
        items.extend(page_items);
    }

    items
}
