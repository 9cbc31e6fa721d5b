// Trait seam for page acquisition.
//
// PageSource stands in front of the rendered-browser service so the ingest
// workflows can be tested deterministically: no browser, no network.

use anyhow::Result;
use async_trait::async_trait;

/// A fetched page: its HTTP status, raw HTML, and the flattened inner text
/// of the main content region.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub html: String,
    pub text: String,
}

impl FetchedPage {
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

#[async_trait]
pub trait PageSource: Send + Sync {
    /// Render one page. A missing page is a `FetchedPage` with status 404,
    /// not an error.
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage>;
}
