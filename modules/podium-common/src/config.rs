use std::env;

/// Number of days rendered article bodies stay in the cache. Not configurable.
pub const CONTENT_TTL_DAYS: u64 = 3;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Storage
    pub database_path: String,
    pub cache_database_path: String,

    // Credentials
    pub openai_api_key: String,
    pub kaggle_username: String,
    pub kaggle_key: String,

    // Rendered-page service
    pub browserless_url: String,
    pub browserless_token: Option<String>,

    // LLM
    pub llm_model: String,
    pub llm_max_retries: u32,
    pub llm_retry_delay_secs: u64,

    // Scraper
    pub scraper_headless: bool,
    pub scraper_delay_seconds: f64,
    pub cache_ttl_days: u64,

    // Web server
    pub api_host: String,
    pub api_port: u16,

    // Diagnostics
    pub debug: bool,
    pub log_level: String,
}

impl Config {
    /// Load config for the API server. Enrichment credentials are required
    /// because the server exposes the fetch/enrich trigger endpoints.
    pub fn api_from_env() -> Self {
        Self {
            openai_api_key: required_env("OPENAI_API_KEY"),
            ..Self::base_from_env()
        }
    }

    /// Load config for the harvest binary (discovery + batch ingestion).
    pub fn harvest_from_env() -> Self {
        Self {
            openai_api_key: required_env("OPENAI_API_KEY"),
            kaggle_username: required_env("KAGGLE_USERNAME"),
            kaggle_key: required_env("KAGGLE_KEY"),
            ..Self::base_from_env()
        }
    }

    /// Everything with a sensible default. Credentials stay empty here;
    /// the per-binary constructors promote the ones they need to required.
    fn base_from_env() -> Self {
        Self {
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./data/podium.db".to_string()),
            cache_database_path: env::var("CACHE_DATABASE_PATH")
                .unwrap_or_else(|_| "./data/podium-cache.db".to_string()),
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            kaggle_username: env::var("KAGGLE_USERNAME").unwrap_or_default(),
            kaggle_key: env::var("KAGGLE_KEY").unwrap_or_default(),
            browserless_url: env::var("BROWSERLESS_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            browserless_token: env::var("BROWSERLESS_TOKEN").ok(),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            llm_max_retries: parsed_env("LLM_MAX_RETRIES", 3),
            llm_retry_delay_secs: parsed_env("LLM_RETRY_DELAY", 2),
            scraper_headless: bool_env("SCRAPER_HEADLESS", true),
            scraper_delay_seconds: parsed_env("SCRAPER_DELAY_SECONDS", 2.0),
            cache_ttl_days: parsed_env("CACHE_TTL_DAYS", 1),
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: parsed_env("API_PORT", 8000),
            debug: bool_env("DEBUG", false),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Log which credentials are present without leaking their values.
    pub fn log_redacted(&self) {
        let vars = [
            ("OPENAI_API_KEY", &self.openai_api_key),
            ("KAGGLE_USERNAME", &self.kaggle_username),
            ("KAGGLE_KEY", &self.kaggle_key),
        ];
        for (name, value) in vars {
            if value.is_empty() {
                tracing::info!("{name} = (empty)");
            } else {
                tracing::info!("{name} = ({} chars)", value.len());
            }
        }
        tracing::info!("DATABASE_PATH = {}", self.database_path);
        tracing::info!("BROWSERLESS_URL = {}", self.browserless_url);
        tracing::info!("LLM_MODEL = {}", self.llm_model);
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn bool_env(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => matches!(raw.to_lowercase().as_str(), "true" | "1" | "yes"),
        Err(_) => default,
    }
}

fn parsed_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(v) => v,
            Err(_) => panic!("{key} must be a valid {}", std::any::type_name::<T>()),
        },
        Err(_) => default,
    }
}
