pub mod error;
pub mod types;

pub use error::{KaggleError, Result};
pub use types::CompetitionInfo;

use tracing::warn;

const BASE_URL: &str = "https://www.kaggle.com/api/v1";

pub struct KaggleClient {
    client: reqwest::Client,
    base_url: String,
    username: String,
    key: String,
}

impl KaggleClient {
    pub fn new(username: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
            username: username.into(),
            key: key.into(),
        }
    }

    /// Point at a different API root. Used by tests.
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// One page of the competition listing, optionally filtered by a search
    /// term and a category (`featured`, `research`, `playground`, ...).
    pub async fn list_competitions(
        &self,
        page: u32,
        search: &str,
        category: Option<&str>,
    ) -> Result<Vec<CompetitionInfo>> {
        let url = format!("{}/competitions/list", self.base_url);

        let mut query: Vec<(&str, String)> = vec![("page", page.to_string())];
        if !search.is_empty() {
            query.push(("search", search.to_string()));
        }
        if let Some(category) = category {
            query.push(("category", category.to_string()));
        }

        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.key))
            .query(&query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(KaggleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| KaggleError::Decode(e.to_string()))
    }

    /// Look up a single competition by slug. The listing endpoint is the only
    /// read surface the API offers, so this searches and exact-matches.
    pub async fn competition_detail(&self, slug: &str) -> Result<Option<CompetitionInfo>> {
        let candidates = self.list_competitions(1, slug, None).await?;
        Ok(candidates.into_iter().find(|c| c.slug() == slug))
    }

    /// Cheap credential check: one listing call.
    pub async fn test_connection(&self) -> bool {
        match self.list_competitions(1, "", None).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Kaggle API connection test failed");
                false
            }
        }
    }
}
