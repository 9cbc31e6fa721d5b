use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ai_client::OpenAi;
use browserless_client::BrowserlessClient;
use kaggle_client::KaggleClient;
use podium_cache::Cache;
use podium_catalog::Catalog;
use podium_common::Config;
use podium_harvest::enrich::Enricher;
use podium_harvest::{Harvester, PageFetcher};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("podium_harvest=info".parse()?))
        .init();

    info!("Podium harvester starting...");

    let config = Config::harvest_from_env();
    config.log_redacted();

    let catalog = Catalog::connect(&config.database_path).await?;
    let cache = Cache::open(&config.cache_database_path).await;

    let browser = BrowserlessClient::new(
        &config.browserless_url,
        config.browserless_token.as_deref(),
    )
    .with_headless(config.scraper_headless);
    let fetcher = PageFetcher::new(browser, config.scraper_delay_seconds);

    let enricher = Enricher::new(
        OpenAi::new(&config.openai_api_key, &config.llm_model),
        config.llm_max_retries,
        Duration::from_secs(config.llm_retry_delay_secs),
    );

    let kaggle = KaggleClient::new(&config.kaggle_username, &config.kaggle_key);

    let harvester = Harvester::new(
        Arc::new(fetcher),
        cache,
        catalog,
        enricher,
        Some(kaggle),
    )
    .with_page_ttl_days(config.cache_ttl_days);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("discover") => {
            let max_pages = arg_value(&args, "--max-pages").unwrap_or(10);
            let year_from = arg_value(&args, "--year-from").unwrap_or(2020);
            let report = harvester
                .discover_competitions(max_pages as u32, year_from as i32)
                .await?;
            info!(
                discovered = report.discovered,
                saved = report.competitions.saved,
                updated = report.competitions.updated,
                skipped = report.skipped,
                "Discovery complete"
            );
        }
        Some("ingest") => {
            let comp_id = comp_arg(&args)?;
            let outcome = harvester.ingest_competition(&comp_id).await?;
            info!(comp_id = comp_id.as_str(), ?outcome, "Metadata ingestion complete");
        }
        Some("enrich") => {
            let comp_id = comp_arg(&args)?;
            let changed = harvester.enrich_competition(&comp_id).await?;
            info!(comp_id = comp_id.as_str(), changed, "Enrichment complete");
        }
        Some("discussions") => {
            let comp_id = comp_arg(&args)?;
            match harvester.ingest_discussions(&comp_id, 3).await? {
                Some(report) => info!(
                    comp_id = comp_id.as_str(),
                    discussions = report.discussions.total,
                    solutions = report.solutions.total,
                    "Discussion ingestion complete"
                ),
                None => bail!("Competition {comp_id} is not in the catalog"),
            }
        }
        Some("refresh") => {
            let report = harvester.refresh_active(3).await?;
            info!(
                competitions = report.competitions,
                refreshed = report.refreshed,
                enriched = report.enriched,
                failed = report.failed,
                "Refresh complete"
            );
        }
        Some("notebooks") => {
            let comp_id = comp_arg(&args)?;
            match harvester.ingest_notebooks(&comp_id, 3).await? {
                Some(counters) => {
                    info!(comp_id = comp_id.as_str(), total = counters.total, "Notebook ingestion complete")
                }
                None => bail!("Competition {comp_id} is not in the catalog"),
            }
        }
        _ => {
            eprintln!(
                "Usage: podium-harvest <command>\n\n\
                 Commands:\n\
                 \x20 discover [--max-pages N] [--year-from YYYY]   discover competitions\n\
                 \x20 ingest <comp_id>                              scrape competition metadata\n\
                 \x20 enrich <comp_id>                              run LLM enrichment\n\
                 \x20 discussions <comp_id>                         ingest discussions + solutions\n\
                 \x20 notebooks <comp_id>                           ingest notebooks\n\
                 \x20 refresh                                       refresh every active competition"
            );
        }
    }

    Ok(())
}

fn comp_arg(args: &[String]) -> Result<String> {
    match args.get(1) {
        Some(comp_id) if !comp_id.starts_with("--") => Ok(comp_id.clone()),
        _ => bail!("Expected a competition id"),
    }
}

fn arg_value(args: &[String], flag: &str) -> Option<i64> {
    let idx = args.iter().position(|a| a == flag)?;
    args.get(idx + 1)?.parse().ok()
}
