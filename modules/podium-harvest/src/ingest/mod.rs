//! The enrichment orchestrator: per-entity workflows composing the fetcher,
//! cache, parsers, classifier, LLM façade and catalog.
//!
//! Every operation is idempotent and safe to re-run. Acquisition failures
//! skip the entity and keep the batch going; catalog failures propagate;
//! LLM failures leave target fields unchanged.

mod competitions;
mod discussions;
mod notebooks;
mod refresh;
mod solutions;

pub use competitions::{DiscoveryReport, MetadataOutcome};
pub use discussions::DiscussionIngestReport;
pub use notebooks::NotebookSummaryReport;
pub use refresh::RefreshReport;
pub use solutions::SolutionIngestReport;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use kaggle_client::KaggleClient;
use podium_cache::Cache;
use podium_catalog::{Catalog, UpsertOutcome};
use podium_common::config::CONTENT_TTL_DAYS;
use serde::Serialize;

use crate::enrich::Enricher;
use crate::traits::PageSource;

const BASE_URL: &str = "https://www.kaggle.com";

/// Saved/updated/total counters for one ingested collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestCounters {
    pub saved: i64,
    pub updated: i64,
    pub total: i64,
}

impl IngestCounters {
    pub fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Created => self.saved += 1,
            UpsertOutcome::Updated => self.updated += 1,
        }
        self.total += 1;
    }
}

pub struct Harvester {
    pub(crate) source: Arc<dyn PageSource>,
    pub(crate) cache: Cache,
    pub(crate) catalog: Catalog,
    pub(crate) enricher: Enricher,
    pub(crate) kaggle: Option<KaggleClient>,
    /// TTL for scraped-page envelopes, from `CACHE_TTL_DAYS`.
    pub(crate) page_ttl: std::time::Duration,
    cancel: Arc<AtomicBool>,
}

impl Harvester {
    pub fn new(
        source: Arc<dyn PageSource>,
        cache: Cache,
        catalog: Catalog,
        enricher: Enricher,
        kaggle: Option<KaggleClient>,
    ) -> Self {
        Self {
            source,
            cache,
            catalog,
            enricher,
            kaggle,
            page_ttl: days(1),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_page_ttl_days(mut self, ttl_days: u64) -> Self {
        self.page_ttl = days(ttl_days);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Cooperative cancellation: batch loops check this between items.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    pub(crate) fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    pub(crate) fn content_ttl(&self) -> std::time::Duration {
        days(CONTENT_TTL_DAYS)
    }

    // --- Platform URLs -----------------------------------------------------

    pub(crate) fn competition_url(comp_id: &str) -> String {
        format!("{BASE_URL}/competitions/{comp_id}")
    }

    pub(crate) fn data_tab_url(comp_id: &str) -> String {
        format!("{BASE_URL}/competitions/{comp_id}/data")
    }

    pub(crate) fn discussion_list_url(comp_id: &str, page: u32) -> String {
        format!("{BASE_URL}/competitions/{comp_id}/discussion?sort=votes&page={page}")
    }

    pub(crate) fn writeup_list_url(comp_id: &str, page: u32) -> String {
        format!("{BASE_URL}/competitions/{comp_id}/writeups?sort=votes&page={page}")
    }

    pub(crate) fn notebook_list_url(comp_id: &str, page: u32) -> String {
        format!("{BASE_URL}/competitions/{comp_id}/code?sortBy=voteCount&page={page}")
    }

    pub(crate) fn listing_url(page: u32) -> String {
        format!("{BASE_URL}/competitions?prestigeFilter=medals&participationFilter=open&page={page}")
    }
}

pub(crate) fn days(n: u64) -> std::time::Duration {
    std::time::Duration::from_secs(n * 24 * 60 * 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_track_outcomes() {
        let mut counters = IngestCounters::default();
        counters.record(UpsertOutcome::Created);
        counters.record(UpsertOutcome::Updated);
        counters.record(UpsertOutcome::Updated);
        assert_eq!(counters.saved, 1);
        assert_eq!(counters.updated, 2);
        assert_eq!(counters.total, 3);
    }

    #[test]
    fn urls_are_rooted_at_the_platform() {
        assert_eq!(
            Harvester::competition_url("titanic"),
            "https://www.kaggle.com/competitions/titanic"
        );
        assert!(Harvester::discussion_list_url("titanic", 2).contains("sort=votes&page=2"));
        assert!(Harvester::writeup_list_url("titanic", 1).contains("/writeups"));
        assert!(Harvester::notebook_list_url("titanic", 1).contains("/code"));
    }
}
