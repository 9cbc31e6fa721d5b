//! Solution ingestion and per-solution detail enrichment.

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::info;

use podium_cache::keys;
use podium_common::Solution;

use crate::classify::classify_item;
use crate::parse::detail::{parse_detail, LinkInventory};

use super::{Harvester, IngestCounters};

const SUMMARY_MIN_CHARS: usize = 200;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SolutionIngestReport {
    pub saved: i64,
    pub updated: i64,
    pub total: i64,
    pub ai_analyzed: i64,
}

impl Harvester {
    /// Scrape both list tabs and store every item that classifies as a
    /// solution. With `enable_ai`, each stored solution that still lacks
    /// enrichment gets its body fetched, summarized and mined for
    /// techniques.
    ///
    /// Returns `None` when the competition is not in the catalog.
    pub async fn ingest_solutions(
        &self,
        comp_id: &str,
        pages: u32,
        enable_ai: bool,
    ) -> Result<Option<SolutionIngestReport>> {
        if self.catalog.competitions().get(comp_id).await?.is_none() {
            return Ok(None);
        }

        let items = self.scrape_discussion_items(comp_id, pages).await;
        if items.is_empty() {
            bail!("Failed to fetch discussions for {comp_id}");
        }

        let mut counters = IngestCounters::default();
        let mut ai_analyzed = 0;

        for item in &items {
            if self.cancelled() {
                info!(comp_id, "Solution ingestion cancelled");
                break;
            }

            let Some(candidate) = classify_item(item) else {
                continue;
            };

            let solution = Solution {
                id: 0,
                competition_id: comp_id.to_string(),
                title: item.title.clone(),
                url: item.url.clone(),
                author: item.author.clone(),
                author_tier: item.author_tier,
                tier_color: item.tier_color.clone(),
                kind: candidate.kind,
                medal: candidate.medal,
                rank: candidate.rank,
                vote_count: item.vote_count,
                comment_count: item.comment_count,
                summary: None,
                techniques: None,
                created_at: None,
                updated_at: None,
            };

            let (id, outcome) = self.catalog.solutions().upsert_by_url(&solution).await?;
            counters.record(outcome);

            if enable_ai {
                let stored = self.catalog.solutions().get(id).await?;
                let already_enriched = stored
                    .as_ref()
                    .map(|s| s.summary.is_some() && s.techniques.is_some())
                    .unwrap_or(false);
                if already_enriched {
                    continue;
                }
                if matches!(self.fetch_solution_detail(id).await, Ok(Some(_))) {
                    ai_analyzed += 1;
                }
            }
        }

        info!(
            comp_id,
            saved = counters.saved,
            updated = counters.updated,
            ai_analyzed,
            "Solution ingestion complete"
        );

        Ok(Some(SolutionIngestReport {
            saved: counters.saved,
            updated: counters.updated,
            total: counters.total,
            ai_analyzed,
        }))
    }

    /// Generate (or serve the stored) structured summary for one solution.
    /// Prefers the cached body; falls back to a fresh fetch.
    ///
    /// Returns `(summary JSON, served_from_store)`, or `None` when no such
    /// solution exists.
    pub async fn summarize_solution(
        &self,
        solution_id: i64,
    ) -> Result<Option<(serde_json::Value, bool)>> {
        let Some(solution) = self.catalog.solutions().get(solution_id).await? else {
            return Ok(None);
        };

        if let Some(stored) = solution.summary.as_deref() {
            if let Ok(summary) = serde_json::from_str(stored) {
                return Ok(Some((summary, true)));
            }
        }

        let content = match self.cache.get(&keys::solution_content(solution_id)).await {
            Some(content) => content,
            None => {
                let page = self.source.fetch_page(&solution.url).await?;
                if page.is_not_found() || page.html.is_empty() {
                    bail!("Failed to fetch solution {solution_id}");
                }
                let detail = parse_detail(&page.html);
                if detail.content.is_empty() {
                    bail!("Empty body for solution {solution_id}");
                }
                self.cache
                    .set(
                        &keys::solution_content(solution_id),
                        &detail.content,
                        self.content_ttl(),
                    )
                    .await;
                detail.content
            }
        };

        let summary_json = self
            .enricher
            .summarize_solution_structured(&content, &solution.title)
            .await;
        if summary_json.is_empty() {
            bail!("Failed to summarize solution {solution_id}");
        }

        self.catalog
            .solutions()
            .set_enrichment(solution_id, Some(&summary_json), None)
            .await?;

        let summary = serde_json::from_str(&summary_json)?;
        Ok(Some((summary, false)))
    }

    /// Fetch one solution's body: cache it, store a structured summary and
    /// the extracted technique list, and cache a translation. Mirrors the
    /// discussion flow plus the techniques pass.
    pub async fn fetch_solution_detail(
        &self,
        solution_id: i64,
    ) -> Result<Option<(Solution, LinkInventory)>> {
        let Some(solution) = self.catalog.solutions().get(solution_id).await? else {
            return Ok(None);
        };

        let page = self.source.fetch_page(&solution.url).await?;
        if page.is_not_found() || page.html.is_empty() {
            bail!("Failed to fetch solution {solution_id}");
        }

        let detail = parse_detail(&page.html);
        if detail.content.is_empty() {
            bail!("Empty body for solution {solution_id}");
        }

        self.cache
            .set(
                &keys::solution_content(solution_id),
                &detail.content,
                self.content_ttl(),
            )
            .await;

        let mut summary = None;
        if detail.content.chars().count() > SUMMARY_MIN_CHARS {
            let generated = self
                .enricher
                .summarize_solution_structured(&detail.content, &solution.title)
                .await;
            if !generated.is_empty() {
                summary = Some(generated);
            }

            let translated = self.enricher.translate_and_organize(&detail.content).await;
            if !translated.is_empty() {
                self.cache
                    .set(
                        &keys::solution_translated(solution_id),
                        &translated,
                        self.content_ttl(),
                    )
                    .await;
            }
        }

        let techniques = self
            .enricher
            .extract_techniques(&detail.content, &solution.title)
            .await;
        let techniques = (!techniques.is_empty()).then_some(techniques);

        if summary.is_some() || techniques.is_some() {
            self.catalog
                .solutions()
                .set_enrichment(solution_id, summary.as_deref(), techniques.as_deref())
                .await?;
        }

        let refreshed = self
            .catalog
            .solutions()
            .get(solution_id)
            .await?
            .unwrap_or(solution);

        Ok(Some((refreshed, detail.links)))
    }
}

