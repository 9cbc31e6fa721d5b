//! Competition metadata ingestion, discovery, and LLM enrichment.

use anyhow::{anyhow, bail, Result};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use podium_cache::keys;
use podium_common::{Competition, CompetitionStatus, TagCategory};

use crate::fetcher::fetch_paged;
use crate::parse::listing::extract_competition_slugs;
use crate::parse::meta::parse_competition_meta;

use super::{Harvester, IngestCounters};

/// What `ingest_competition` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataOutcome {
    /// Fresh-enough metadata already cached; nothing fetched.
    Cached,
    /// The competition page scraped and the row upserted.
    Scraped,
    /// The platform has no such competition.
    NotFound,
}

/// Outcome of a discovery run over the listing pages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveryReport {
    pub discovered: usize,
    pub skipped: usize,
    pub competitions: IngestCounters,
}

/// Scraped-page envelope stored under `meta:{comp}`.
#[derive(Serialize, Deserialize)]
struct MetaEnvelope {
    comp_id: String,
    url: String,
    scraped_at: String,
    not_found: bool,
    full_text: String,
}

impl Harvester {
    /// Scrape a competition's overview page into the catalog.
    ///
    /// The scrape is skipped entirely while the `meta:{comp}` envelope is
    /// still cached. A 404 records the absence (so the batch does not keep
    /// re-probing dead slugs) and stops.
    pub async fn ingest_competition(&self, comp_id: &str) -> Result<MetadataOutcome> {
        let meta_key = keys::meta(comp_id);
        if self.cache.get(&meta_key).await.is_some() {
            info!(comp_id, "Competition metadata cached, skipping scrape");
            return Ok(MetadataOutcome::Cached);
        }

        let url = Self::competition_url(comp_id);
        let page = self.source.fetch_page(&url).await?;

        if page.is_not_found() {
            let envelope = MetaEnvelope {
                comp_id: comp_id.to_string(),
                url,
                scraped_at: Utc::now().to_rfc3339(),
                not_found: true,
                full_text: String::new(),
            };
            self.cache
                .set(&meta_key, &serde_json::to_string(&envelope)?, self.page_ttl)
                .await;
            return Ok(MetadataOutcome::NotFound);
        }

        if page.text.is_empty() {
            bail!("Empty page for competition {comp_id}");
        }

        let meta = parse_competition_meta(&page.text);

        let mut fresh = Competition::new(
            comp_id,
            meta.title.unwrap_or_else(|| comp_id.to_string()),
            url.clone(),
        );
        fresh.start_date = meta.start_date;
        fresh.end_date = meta.end_date;
        fresh.description = Some(page.text.clone());
        fresh.metric = meta.metric_candidate;
        fresh.last_scraped_at = Some(Utc::now());

        self.upsert_competition(fresh).await?;

        let envelope = MetaEnvelope {
            comp_id: comp_id.to_string(),
            url,
            scraped_at: Utc::now().to_rfc3339(),
            not_found: false,
            full_text: page.text,
        };
        self.cache
            .set(&meta_key, &serde_json::to_string(&envelope)?, self.page_ttl)
            .await;

        Ok(MetadataOutcome::Scraped)
    }

    /// Walk the competition listing pages, resolve details through the
    /// platform API, and upsert everything ending in `year_from` or later.
    pub async fn discover_competitions(
        &self,
        max_pages: u32,
        year_from: i32,
    ) -> Result<DiscoveryReport> {
        let kaggle = self
            .kaggle
            .as_ref()
            .ok_or_else(|| anyhow!("Discovery requires Kaggle API credentials"))?;

        let slugs = fetch_paged(
            self.source.as_ref(),
            Self::listing_url,
            max_pages,
            |page| extract_competition_slugs(&page.html),
        )
        .await;

        // fetch_paged preserves page order; discovery wants one sorted,
        // deduplicated set.
        let mut slugs: Vec<String> = {
            let mut seen = std::collections::HashSet::new();
            slugs.into_iter().filter(|s| seen.insert(s.clone())).collect()
        };
        slugs.sort();

        let mut report = DiscoveryReport {
            discovered: slugs.len(),
            ..Default::default()
        };

        let today = Utc::now().date_naive();

        for slug in &slugs {
            if self.cancelled() {
                info!("Discovery cancelled");
                break;
            }

            let info = match kaggle.competition_detail(slug).await {
                Ok(Some(info)) => info,
                Ok(None) => {
                    report.skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!(slug = slug.as_str(), error = %e, "Platform API lookup failed");
                    report.skipped += 1;
                    continue;
                }
            };

            let end_date = info.deadline.map(|d| d.date_naive());
            let start_date = info.enabled_date.map(|d| d.date_naive());

            let in_range = end_date
                .or(start_date)
                .map(|d| d.year() >= year_from)
                .unwrap_or(false);
            if !in_range {
                report.skipped += 1;
                continue;
            }

            let mut comp = Competition::new(
                slug.clone(),
                info.title.clone(),
                Self::competition_url(slug),
            );
            comp.start_date = start_date;
            comp.end_date = end_date;
            comp.description = (!info.description.is_empty()).then(|| info.description.clone());
            comp.metric = info.evaluation_metric.clone().filter(|m| !m.is_empty());
            comp.status =
                CompetitionStatus::from_end_date(end_date, today, CompetitionStatus::Completed);

            let outcome = self.upsert_competition(comp).await?;
            report.competitions.record(outcome);
        }

        info!(
            discovered = report.discovered,
            saved = report.competitions.saved,
            updated = report.competitions.updated,
            skipped = report.skipped,
            "Discovery run complete"
        );

        Ok(report)
    }

    /// LLM enrichment for one competition. Runs only when a description
    /// exists; each derived field is generated only if still empty, and one
    /// UPDATE writes the result.
    ///
    /// Returns whether anything changed.
    pub async fn enrich_competition(&self, comp_id: &str) -> Result<bool> {
        let Some(mut comp) = self.catalog.competitions().get(comp_id).await? else {
            bail!("Competition {comp_id} not found");
        };

        let description = match &comp.description {
            Some(d) if !d.is_empty() => d.clone(),
            _ => return Ok(false),
        };

        let mut changed = false;

        if comp.summary.as_deref().unwrap_or_default().is_empty() {
            let summary = self
                .enricher
                .generate_summary(&description, &comp.title, comp.metric.as_deref().unwrap_or(""))
                .await;
            if !summary.is_empty() {
                comp.summary = Some(summary);
                changed = true;
            }
        }

        if comp.metric.as_deref().unwrap_or_default().is_empty() {
            let metric = self.enricher.extract_metric(&description, &comp.title).await;
            if !metric.is_empty() {
                comp.metric = Some(metric);
                changed = true;
            }
        }

        if comp.metric_description.as_deref().unwrap_or_default().is_empty() {
            if let Some(metric) = comp.metric.clone() {
                let explanation = self
                    .enricher
                    .describe_metric(&metric, &description, &comp.title)
                    .await;
                if !explanation.is_empty() {
                    comp.metric_description = Some(explanation);
                    changed = true;
                }
            }
        }

        if comp.tags.is_empty() || comp.data_types.is_empty() {
            let taxonomy = self.catalog.tags().taxonomy_for_prompt().await?;
            let selection = self
                .enricher
                .generate_tags(
                    &description,
                    &comp.title,
                    comp.metric.as_deref().unwrap_or(""),
                    &taxonomy,
                )
                .await;

            let (task_types, features, plain_tags) = self.split_by_category(&selection.tags).await?;

            if comp.data_types.is_empty() && !selection.data_types.is_empty() {
                comp.data_types = selection.data_types;
                changed = true;
            }
            if comp.tags.is_empty() && !plain_tags.is_empty() {
                comp.tags = plain_tags;
                changed = true;
            }
            if comp.task_types.is_empty() && !task_types.is_empty() {
                comp.task_types = task_types;
                changed = true;
            }
            if comp.competition_features.is_empty() && !features.is_empty() {
                comp.competition_features = features;
                changed = true;
            }
            if comp.domain.as_deref().unwrap_or_default().is_empty() && !selection.domain.is_empty()
            {
                comp.domain = Some(selection.domain);
                changed = true;
            }
        }

        if comp.dataset_info.as_deref().unwrap_or_default().is_empty() {
            if let Some(data_text) = self.fetch_data_tab(comp_id).await? {
                let info = self.enricher.extract_dataset_info(&data_text, &comp.title).await;
                if !info.files.is_empty() || !info.description.is_empty() {
                    comp.dataset_info = serde_json::to_string(&info).ok();
                    changed = true;
                }
            }
        }

        if changed {
            self.catalog.competitions().update(&comp).await?;
            info!(comp_id, "Competition enriched");
        }

        Ok(changed)
    }

    /// Generate and store the structured summary for one competition,
    /// regardless of what is already stored. The caller decides whether a
    /// stored summary short-circuits this.
    ///
    /// Returns the summary JSON text, or `None` when generation failed.
    pub async fn generate_competition_summary(&self, comp_id: &str) -> Result<Option<String>> {
        let Some(mut comp) = self.catalog.competitions().get(comp_id).await? else {
            bail!("Competition {comp_id} not found");
        };

        let description = match &comp.description {
            Some(d) if !d.is_empty() => d.clone(),
            _ => return Ok(None),
        };

        let summary = self
            .enricher
            .generate_summary(&description, &comp.title, comp.metric.as_deref().unwrap_or(""))
            .await;
        if summary.is_empty() {
            return Ok(None);
        }

        comp.summary = Some(summary.clone());
        self.catalog.competitions().update(&comp).await?;
        Ok(Some(summary))
    }

    /// Fetch the data tab and extract the dataset schema into the catalog.
    /// Used by the explicit `data/fetch` trigger, which regenerates even if
    /// `dataset_info` already exists.
    pub async fn fetch_dataset_info(&self, comp_id: &str) -> Result<Option<String>> {
        let Some(comp) = self.catalog.competitions().get(comp_id).await? else {
            return Ok(None);
        };

        let data_text = self
            .fetch_data_tab(comp_id)
            .await?
            .ok_or_else(|| anyhow!("Failed to scrape data tab for {comp_id}"))?;

        let info = self.enricher.extract_dataset_info(&data_text, &comp.title).await;
        let encoded = serde_json::to_string(&info)?;

        let mut comp = comp;
        comp.dataset_info = Some(encoded.clone());
        self.catalog.competitions().update(&comp).await?;

        Ok(Some(encoded))
    }

    /// Rendered text of the data tab, via the page cache.
    async fn fetch_data_tab(&self, comp_id: &str) -> Result<Option<String>> {
        let key = keys::page(comp_id, "data");
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(Some(cached));
        }

        let page = self.source.fetch_page(&Self::data_tab_url(comp_id)).await?;
        if page.is_not_found() || page.text.is_empty() {
            return Ok(None);
        }

        self.cache.set(&key, &page.text, self.page_ttl).await;
        Ok(Some(page.text))
    }

    /// Upsert preserving previously-enriched fields: scraped values never
    /// overwrite a populated field with emptiness, and status is recomputed
    /// from the deadline on every pass.
    pub(crate) async fn upsert_competition(
        &self,
        fresh: Competition,
    ) -> Result<podium_catalog::UpsertOutcome> {
        let today = Utc::now().date_naive();
        let repo = self.catalog.competitions();

        match repo.get(&fresh.id).await? {
            Some(mut existing) => {
                existing.title = fresh.title;
                existing.url = fresh.url;
                existing.start_date = fresh.start_date.or(existing.start_date);
                existing.end_date = fresh.end_date.or(existing.end_date);
                if existing.description.as_deref().unwrap_or_default().is_empty() {
                    existing.description = fresh.description;
                }
                if existing.metric.as_deref().unwrap_or_default().is_empty() {
                    existing.metric = fresh.metric;
                }
                existing.last_scraped_at = fresh.last_scraped_at.or(existing.last_scraped_at);
                existing.status = CompetitionStatus::from_end_date(
                    existing.end_date,
                    today,
                    upcoming_or(existing.start_date, today, existing.status),
                );
                repo.update(&existing).await?;
                Ok(podium_catalog::UpsertOutcome::Updated)
            }
            None => {
                let mut fresh = fresh;
                fresh.status = CompetitionStatus::from_end_date(
                    fresh.end_date,
                    today,
                    upcoming_or(fresh.start_date, today, fresh.status),
                );
                repo.create(&fresh).await?;
                Ok(podium_catalog::UpsertOutcome::Created)
            }
        }
    }

    /// Sort selected tag names into task types, competition features, and
    /// plain tags, by their taxonomy category.
    async fn split_by_category(
        &self,
        names: &[String],
    ) -> Result<(Vec<String>, Vec<String>, Vec<String>)> {
        let all = self.catalog.tags().list(None).await?;

        let mut task_types = Vec::new();
        let mut features = Vec::new();
        let mut plain = Vec::new();

        for name in names {
            let category = all.iter().find(|t| &t.name == name).map(|t| t.category);
            match category {
                Some(TagCategory::TaskType) => task_types.push(name.clone()),
                Some(TagCategory::CompetitionFeature) => features.push(name.clone()),
                _ => plain.push(name.clone()),
            }
        }

        Ok((task_types, features, plain))
    }
}

/// Fallback status when there is no deadline: a future start date means
/// upcoming, otherwise keep what the record already says.
fn upcoming_or(
    start_date: Option<chrono::NaiveDate>,
    today: chrono::NaiveDate,
    current: CompetitionStatus,
) -> CompetitionStatus {
    match start_date {
        Some(start) if start > today => CompetitionStatus::Upcoming,
        _ => current,
    }
}
