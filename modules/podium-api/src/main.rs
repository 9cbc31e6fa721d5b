use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ai_client::OpenAi;
use browserless_client::BrowserlessClient;
use podium_api::{build_router, AppState};
use podium_cache::Cache;
use podium_catalog::Catalog;
use podium_common::Config;
use podium_harvest::enrich::Enricher;
use podium_harvest::{Harvester, PageFetcher};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("podium_api=info".parse()?))
        .init();

    let config = Config::api_from_env();
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

    let kaggle = (!config.kaggle_username.is_empty()).then(|| {
        kaggle_client::KaggleClient::new(&config.kaggle_username, &config.kaggle_key)
    });

    let harvester = Harvester::new(
        Arc::new(fetcher),
        cache.clone(),
        catalog.clone(),
        enricher,
        kaggle,
    )
    .with_page_ttl_days(config.cache_ttl_days);

    let state = Arc::new(AppState {
        catalog,
        cache,
        harvester,
    });

    let app = build_router(state);

    let addr = format!("{}:{}", config.api_host, config.api_port);
    info!(addr = addr.as_str(), "Podium API listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
