//! Discussion-list ingestion and per-discussion detail enrichment.

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::{info, warn};

use podium_cache::keys;
use podium_common::{Discussion, DiscussionCategory, Solution};

use crate::classify::classify_item;
use crate::fetcher::fetch_paged;
use crate::parse::detail::{parse_detail, LinkInventory};
use crate::parse::list::{parse_list_items, ListItem};

use super::{Harvester, IngestCounters};

/// Minimum body length before the LLM passes run. Shorter bodies are cached
/// but not summarized or translated.
const SUMMARY_MIN_CHARS: usize = 200;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscussionIngestReport {
    pub discussions: IngestCounters,
    pub solutions: IngestCounters,
    pub writeups_count: usize,
    pub total_items: usize,
}

impl Harvester {
    /// Ingest the discussion and writeup tabs of a competition, upserting
    /// discussions and promoting qualifying items into solutions.
    ///
    /// Returns `None` when the competition is not in the catalog.
    pub async fn ingest_discussions(
        &self,
        comp_id: &str,
        pages: u32,
    ) -> Result<Option<DiscussionIngestReport>> {
        if self.catalog.competitions().get(comp_id).await?.is_none() {
            return Ok(None);
        }

        let items = self.scrape_discussion_items(comp_id, pages).await;
        if items.is_empty() {
            bail!("Failed to fetch discussions for {comp_id}");
        }

        let mut report = DiscussionIngestReport {
            total_items: items.len(),
            ..Default::default()
        };

        for item in &items {
            if self.cancelled() {
                info!(comp_id, "Discussion ingestion cancelled");
                break;
            }

            if item.category == DiscussionCategory::Writeup {
                report.writeups_count += 1;
            }

            let discussion = item_to_discussion(comp_id, item);
            let (_, outcome) = self.catalog.discussions().upsert_by_url(&discussion).await?;
            report.discussions.record(outcome);

            if let Some(candidate) = classify_item(item) {
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
                let (_, outcome) = self.catalog.solutions().upsert_by_url(&solution).await?;
                report.solutions.record(outcome);
            }
        }

        // Keep the denormalized count in step with what is actually stored.
        if let Some(mut comp) = self.catalog.competitions().get(comp_id).await? {
            comp.discussion_count = self
                .catalog
                .discussions()
                .count_by_competition(comp_id)
                .await?;
            self.catalog.competitions().update(&comp).await?;
        }

        info!(
            comp_id,
            discussions = report.discussions.total,
            solutions = report.solutions.total,
            writeups = report.writeups_count,
            "Discussion ingestion complete"
        );

        Ok(Some(report))
    }

    /// Scrape both tabs, drop pinned items, deduplicate by URL across tabs,
    /// and order by votes descending.
    pub(crate) async fn scrape_discussion_items(&self, comp_id: &str, pages: u32) -> Vec<ListItem> {
        let discussions = fetch_paged(
            self.source.as_ref(),
            |page| Self::discussion_list_url(comp_id, page),
            pages,
            |page| parse_list_items(&page.html),
        )
        .await;

        let writeups = fetch_paged(
            self.source.as_ref(),
            |page| Self::writeup_list_url(comp_id, page),
            pages,
            |page| parse_list_items(&page.html),
        )
        .await;

        let mut seen = std::collections::HashSet::new();
        let mut items: Vec<ListItem> = discussions
            .into_iter()
            .chain(writeups)
            .filter(|item| !item.is_pinned)
            .filter(|item| seen.insert(item.url.clone()))
            .collect();

        items.sort_by(|a, b| b.vote_count.cmp(&a.vote_count));
        items
    }

    /// Fetch one discussion's body: cache it for three days, and when it is
    /// substantial, store a structured summary and cache a translation.
    /// The body itself is never persisted to the catalog.
    ///
    /// Returns `None` when the discussion is unknown.
    pub async fn fetch_discussion_detail(
        &self,
        discussion_id: i64,
    ) -> Result<Option<(Discussion, LinkInventory)>> {
        let Some(mut discussion) = self.catalog.discussions().get(discussion_id).await? else {
            return Ok(None);
        };

        let page = self.source.fetch_page(&discussion.url).await?;
        if page.is_not_found() || page.html.is_empty() {
            bail!("Failed to fetch discussion {discussion_id}");
        }

        let detail = parse_detail(&page.html);
        if detail.content.is_empty() {
            bail!("Empty body for discussion {discussion_id}");
        }

        self.cache
            .set(
                &keys::discussion_content(discussion_id),
                &detail.content,
                self.content_ttl(),
            )
            .await;

        if detail.content.chars().count() > SUMMARY_MIN_CHARS {
            let summary = self
                .enricher
                .summarize_discussion_structured(&detail.content, &discussion.title)
                .await;
            if !summary.is_empty() {
                discussion.summary = Some(summary);
                self.catalog.discussions().update(&discussion).await?;
            } else {
                warn!(discussion_id, "Summary generation produced nothing");
            }

            let translated = self.enricher.translate_and_organize(&detail.content).await;
            if !translated.is_empty() {
                self.cache
                    .set(
                        &keys::discussion_translated(discussion_id),
                        &translated,
                        self.content_ttl(),
                    )
                    .await;
            }
        }

        Ok(Some((discussion, detail.links)))
    }
}

fn item_to_discussion(comp_id: &str, item: &ListItem) -> Discussion {
    Discussion {
        id: 0,
        competition_id: comp_id.to_string(),
        title: item.title.clone(),
        url: item.url.clone(),
        author: item.author.clone(),
        author_tier: item.author_tier,
        tier_color: item.tier_color.clone(),
        vote_count: item.vote_count,
        comment_count: item.comment_count,
        category: item.category,
        is_pinned: item.is_pinned,
        summary: None,
        created_at: None,
        updated_at: None,
    }
}
