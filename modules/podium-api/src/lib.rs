//! Read API over the catalog, plus the ingestion trigger endpoints.

pub mod rest;

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use podium_cache::Cache;
use podium_catalog::Catalog;
use podium_harvest::Harvester;

pub struct AppState {
    pub catalog: Catalog,
    pub cache: Cache,
    pub harvester: Harvester,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // Competitions
        .route("/api/competitions", get(rest::list_competitions))
        .route("/api/competitions/new", get(rest::new_competitions))
        .route("/api/competitions/{id}", get(rest::get_competition))
        .route("/api/competitions/{id}/favorite", patch(rest::toggle_favorite))
        .route("/api/competitions/{id}/discussions", get(rest::competition_discussions))
        .route("/api/competitions/{id}/solutions", get(rest::competition_solutions))
        .route("/api/competitions/{id}/notebooks", get(rest::competition_notebooks))
        .route(
            "/api/competitions/{id}/discussions/fetch",
            post(rest::fetch_discussions),
        )
        .route(
            "/api/competitions/{id}/solutions/fetch",
            post(rest::fetch_solutions),
        )
        .route(
            "/api/competitions/{id}/notebooks/fetch",
            post(rest::fetch_notebooks),
        )
        .route("/api/competitions/{id}/data/fetch", post(rest::fetch_dataset_info))
        .route(
            "/api/competitions/{id}/summary/generate",
            post(rest::generate_summary),
        )
        // Discussions
        .route("/api/discussions/{id}", get(rest::get_discussion))
        .route("/api/discussions/{id}/content", get(rest::discussion_content))
        .route("/api/discussions/{id}/fetch", post(rest::fetch_discussion_detail))
        // Solutions & notebooks
        .route("/api/solutions/{id}/content", get(rest::solution_content))
        .route("/api/solutions/{id}/fetch", post(rest::fetch_solution_detail))
        .route("/api/solutions/{id}/summarize", post(rest::summarize_solution))
        .route("/api/notebooks/{id}/summarize", post(rest::summarize_notebook))
        // Tags
        .route("/api/tags", get(rest::list_tags))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
