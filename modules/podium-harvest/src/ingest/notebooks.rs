//! Notebook-list ingestion and on-demand notebook summaries.

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::info;

use podium_cache::keys;
use podium_common::{Solution, SolutionKind};

use crate::fetcher::fetch_paged;
use crate::parse::detail::parse_detail;
use crate::parse::list::parse_list_items;

use super::{Harvester, IngestCounters};

#[derive(Debug, Clone, Serialize)]
pub struct NotebookSummaryReport {
    pub summary: serde_json::Value,
    /// True when the stored summary was served without an LLM call.
    pub cached: bool,
}

impl Harvester {
    /// Ingest a competition's notebook list. Notebooks are stored as
    /// solutions with `kind = notebook`, no medal and no rank.
    ///
    /// Returns `None` when the competition is not in the catalog.
    pub async fn ingest_notebooks(
        &self,
        comp_id: &str,
        pages: u32,
    ) -> Result<Option<IngestCounters>> {
        if self.catalog.competitions().get(comp_id).await?.is_none() {
            return Ok(None);
        }

        let items = fetch_paged(
            self.source.as_ref(),
            |page| Self::notebook_list_url(comp_id, page),
            pages,
            |page| parse_list_items(&page.html),
        )
        .await;

        let mut counters = IngestCounters::default();

        for item in &items {
            if self.cancelled() {
                info!(comp_id, "Notebook ingestion cancelled");
                break;
            }

            let notebook = Solution {
                id: 0,
                competition_id: comp_id.to_string(),
                title: item.title.clone(),
                url: item.url.clone(),
                author: item.author.clone(),
                author_tier: item.author_tier,
                tier_color: item.tier_color.clone(),
                kind: SolutionKind::Notebook,
                medal: None,
                rank: None,
                vote_count: item.vote_count,
                comment_count: item.comment_count,
                summary: None,
                techniques: None,
                created_at: None,
                updated_at: None,
            };

            let (_, outcome) = self.catalog.solutions().upsert_by_url(&notebook).await?;
            counters.record(outcome);
        }

        info!(
            comp_id,
            saved = counters.saved,
            updated = counters.updated,
            "Notebook ingestion complete"
        );

        Ok(Some(counters))
    }

    /// Generate (or serve the stored) didactic summary for one notebook.
    /// Summaries are produced per-notebook on demand, never in bulk.
    ///
    /// Returns `None` when no notebook with this id exists.
    pub async fn summarize_notebook(
        &self,
        notebook_id: i64,
    ) -> Result<Option<NotebookSummaryReport>> {
        let Some(notebook) = self.catalog.solutions().get_notebook(notebook_id).await? else {
            return Ok(None);
        };

        if let Some(stored) = notebook.summary.as_deref() {
            if let Ok(summary) = serde_json::from_str(stored) {
                return Ok(Some(NotebookSummaryReport {
                    summary,
                    cached: true,
                }));
            }
            // Unparseable stored summary: fall through and regenerate.
        }

        let page = self.source.fetch_page(&notebook.url).await?;
        if page.is_not_found() || page.html.is_empty() {
            bail!("Failed to fetch notebook {notebook_id}");
        }

        let detail = parse_detail(&page.html);
        if detail.content.is_empty() {
            bail!("Empty body for notebook {notebook_id}");
        }

        self.cache
            .set(
                &keys::solution_content(notebook_id),
                &detail.content,
                self.content_ttl(),
            )
            .await;

        let summary_json = self
            .enricher
            .summarize_notebook(&detail.content, &notebook.title)
            .await;
        if summary_json.is_empty() {
            bail!("Failed to summarize notebook {notebook_id}");
        }

        self.catalog
            .solutions()
            .set_enrichment(notebook_id, Some(&summary_json), None)
            .await?;

        let summary = serde_json::from_str(&summary_json)?;
        Ok(Some(NotebookSummaryReport {
            summary,
            cached: false,
        }))
    }
}
