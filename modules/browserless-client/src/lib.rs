pub mod error;

pub use error::{BrowserlessError, Result};

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

/// Hard ceiling on a single page navigation.
const NAVIGATION_TIMEOUT_MS: u64 = 30_000;
/// Extra settle time after network idle, for late client-side hydration.
const HYDRATION_WAIT_MS: u64 = 2_000;

/// The outcome of rendering one page. A 404 from the target site is a value,
/// not an error; callers use it to record that a page is gone.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub status: u16,
    pub html: String,
}

impl RenderedPage {
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GotoOptions {
    wait_until: &'static str,
    timeout: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentRequest<'a> {
    url: &'a str,
    goto_options: GotoOptions,
    wait_for_timeout: u64,
    /// Return whatever rendered instead of failing when a sub-resource hangs.
    best_attempt: bool,
}

pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    headless: bool,
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            // Navigation timeout plus headroom for the service round-trip.
            .timeout(Duration::from_secs(45))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
            headless: true,
        }
    }

    /// Run the browser headful. Local debugging only.
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Render a URL and return its final HTML via the `/content` endpoint.
    ///
    /// Navigation waits for network idle (30 s budget) and then an extra
    /// ~2 s for late hydration, mirroring how the site builds its DOM.
    pub async fn content(&self, url: &str) -> Result<RenderedPage> {
        let endpoint = self.endpoint("/content");

        let body = ContentRequest {
            url,
            goto_options: GotoOptions {
                wait_until: "networkidle2",
                timeout: NAVIGATION_TIMEOUT_MS,
            },
            wait_for_timeout: HYDRATION_WAIT_MS,
            best_attempt: true,
        };

        debug!(url, "Rendering page");

        let resp = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();

        // Browserless forwards the page's own status code; a missing page
        // comes back as 404 with whatever error body the site produced.
        if status.as_u16() == 404 {
            return Ok(RenderedPage {
                status: 404,
                html: String::new(),
            });
        }

        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let html = resp.text().await?;
        debug!(url, bytes = html.len(), "Rendered page");

        Ok(RenderedPage {
            status: status.as_u16(),
            html,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        let mut endpoint = format!("{}{}", self.base_url, path);
        let mut params: Vec<String> = Vec::new();
        if let Some(ref token) = self.token {
            params.push(format!("token={token}"));
        }
        if !self.headless {
            params.push("headless=false".to_string());
        }
        if !params.is_empty() {
            endpoint.push('?');
            endpoint.push_str(&params.join("&"));
        }
        endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_without_token() {
        let client = BrowserlessClient::new("http://localhost:3000/", None);
        assert_eq!(client.endpoint("/content"), "http://localhost:3000/content");
    }

    #[test]
    fn endpoint_with_token_and_headful() {
        let client =
            BrowserlessClient::new("http://localhost:3000", Some("secret")).with_headless(false);
        assert_eq!(
            client.endpoint("/content"),
            "http://localhost:3000/content?token=secret&headless=false"
        );
    }

    #[test]
    fn content_request_serializes_goto_options() {
        let body = ContentRequest {
            url: "https://example.com",
            goto_options: GotoOptions {
                wait_until: "networkidle2",
                timeout: NAVIGATION_TIMEOUT_MS,
            },
            wait_for_timeout: HYDRATION_WAIT_MS,
            best_attempt: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["gotoOptions"]["waitUntil"], "networkidle2");
        assert_eq!(json["gotoOptions"]["timeout"], 30_000);
        assert_eq!(json["waitForTimeout"], 2_000);
        assert_eq!(json["bestAttempt"], true);
    }

    #[test]
    fn not_found_page_is_a_value() {
        let page = RenderedPage {
            status: 404,
            html: String::new(),
        };
        assert!(page.is_not_found());
    }
}
