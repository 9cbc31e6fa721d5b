use thiserror::Error;

#[derive(Error, Debug)]
pub enum PodiumError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("Enrichment error: {0}")]
    Enrichment(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
