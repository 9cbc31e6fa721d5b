//! Batch refresh: re-scrape and re-enrich every active competition.
//!
//! One worker, strictly sequential; the polite-scrape floor lives in the
//! page fetcher. A failure on one competition is logged and the batch moves
//! on.

use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

use podium_catalog::CompetitionFilter;
use podium_common::CompetitionStatus;

use super::Harvester;

#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshReport {
    pub competitions: usize,
    pub refreshed: usize,
    pub enriched: usize,
    pub failed: usize,
}

impl Harvester {
    /// Refresh all active competitions: metadata scrape, LLM enrichment and
    /// a discussion pass for each.
    pub async fn refresh_active(&self, discussion_pages: u32) -> Result<RefreshReport> {
        let active = self
            .catalog
            .competitions()
            .list(
                &CompetitionFilter::status(CompetitionStatus::Active),
                "end_date",
                "asc",
                1_000,
                0,
            )
            .await?;

        let mut report = RefreshReport {
            competitions: active.len(),
            ..Default::default()
        };

        for comp in &active {
            if self.cancelled() {
                info!("Refresh cancelled");
                break;
            }

            match self.refresh_one(&comp.id, discussion_pages).await {
                Ok(enriched) => {
                    report.refreshed += 1;
                    if enriched {
                        report.enriched += 1;
                    }
                }
                Err(e) => {
                    warn!(comp_id = comp.id.as_str(), error = %e, "Refresh failed");
                    report.failed += 1;
                }
            }
        }

        info!(
            competitions = report.competitions,
            refreshed = report.refreshed,
            enriched = report.enriched,
            failed = report.failed,
            "Refresh run complete"
        );

        Ok(report)
    }

    async fn refresh_one(&self, comp_id: &str, discussion_pages: u32) -> Result<bool> {
        self.ingest_competition(comp_id).await?;
        let enriched = self.enrich_competition(comp_id).await?;

        // A missing row here means the scrape recorded an absence; the
        // discussion pass has nothing to attach to.
        if let Err(e) = self.ingest_discussions(comp_id, discussion_pages).await {
            warn!(comp_id, error = %e, "Discussion pass failed during refresh");
        }

        Ok(enriched)
    }
}
