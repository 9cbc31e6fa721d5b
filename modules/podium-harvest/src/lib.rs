//! Ingestion and enrichment pipeline: rendered-page fetching, list/detail
//! parsing, solution classification, LLM enrichment and catalog upserts.

pub mod classify;
pub mod enrich;
pub mod fetcher;
pub mod ingest;
pub mod parse;
pub mod traits;

pub use fetcher::PageFetcher;
pub use ingest::Harvester;
pub use traits::PageSource;
