//! REST handlers: a read-mostly catalog API plus the ingestion triggers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use podium_cache::keys;
use podium_common::{Competition, CompetitionStatus, TagCategory};

use crate::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

// ---------------------------------------------------------------------------
// Response plumbing
// ---------------------------------------------------------------------------

fn not_found(detail: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": detail }))).into_response()
}

fn bad_request(detail: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
}

fn internal(context: &str, error: impl std::fmt::Display) -> Response {
    warn!(context, error = %error, "Request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": format!("{context} failed") })),
    )
        .into_response()
}

/// A competition as served over the API: the stored record plus the derived
/// deadline countdown.
#[derive(Serialize)]
struct CompetitionDto {
    #[serde(flatten)]
    competition: Competition,
    days_until_deadline: Option<i64>,
}

impl From<Competition> for CompetitionDto {
    fn from(competition: Competition) -> Self {
        let today = chrono::Utc::now().date_naive();
        let days_until_deadline = competition.days_until_deadline(today);
        Self {
            competition,
            days_until_deadline,
        }
    }
}

/// Comma-separated multi-value query parameter.
fn split_csv(raw: &Option<String>) -> Vec<String> {
    raw.as_deref()
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Competitions
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CompetitionsQuery {
    page: Option<i64>,
    limit: Option<i64>,
    status: Option<String>,
    domain: Option<String>,
    metrics: Option<String>,
    data_types: Option<String>,
    task_types: Option<String>,
    tags: Option<String>,
    is_favorite: Option<bool>,
    search: Option<String>,
    sort_by: Option<String>,
    order: Option<String>,
}

pub async fn list_competitions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CompetitionsQuery>,
) -> Response {
    let page = params.page.unwrap_or(1);
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if page < 1 {
        return bad_request("page must be >= 1");
    }
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return bad_request("limit must be between 1 and 100");
    }

    let status = match params.status.as_deref() {
        None => None,
        Some(raw) => match raw.parse::<CompetitionStatus>() {
            Ok(status) => Some(status),
            Err(_) => return bad_request("unknown status"),
        },
    };

    let filter = podium_catalog::CompetitionFilter {
        status,
        domain: params.domain.clone(),
        is_favorite: params.is_favorite,
        metrics: split_csv(&params.metrics),
        data_types: split_csv(&params.data_types),
        task_types: split_csv(&params.task_types),
        tags: split_csv(&params.tags),
        search: params.search.clone(),
    };

    let sort_by = params.sort_by.as_deref().unwrap_or("created_at");
    let order = params.order.as_deref().unwrap_or("desc");
    let offset = (page - 1) * limit;

    let repo = state.catalog.competitions();

    let items = match repo.list(&filter, sort_by, order, limit, offset).await {
        Ok(items) => items,
        Err(e) => return internal("Competition listing", e),
    };
    let total = match repo.count(&filter).await {
        Ok(total) => total,
        Err(e) => return internal("Competition count", e),
    };

    let active_count = repo
        .count(&podium_catalog::CompetitionFilter::status(CompetitionStatus::Active))
        .await
        .unwrap_or(0);
    let completed_count = repo
        .count(&podium_catalog::CompetitionFilter::status(CompetitionStatus::Completed))
        .await
        .unwrap_or(0);

    let total_pages = if total > 0 {
        (total + limit - 1) / limit
    } else {
        0
    };

    let items: Vec<CompetitionDto> = items.into_iter().map(CompetitionDto::from).collect();

    Json(json!({
        "items": items,
        "total": total,
        "active_count": active_count,
        "completed_count": completed_count,
        "page": page,
        "limit": limit,
        "total_pages": total_pages,
    }))
    .into_response()
}

#[derive(Deserialize)]
pub struct NewCompetitionsQuery {
    days: Option<i64>,
    limit: Option<i64>,
}

pub async fn new_competitions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NewCompetitionsQuery>,
) -> Response {
    let days = params.days.unwrap_or(30);
    if days < 1 {
        return bad_request("days must be >= 1");
    }

    match state.catalog.competitions().list_new(days, params.limit).await {
        Ok(items) => {
            let items: Vec<CompetitionDto> = items.into_iter().map(CompetitionDto::from).collect();
            Json(items).into_response()
        }
        Err(e) => internal("New-competition listing", e),
    }
}

pub async fn get_competition(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.catalog.competitions().get(&id).await {
        Ok(Some(comp)) => Json(CompetitionDto::from(comp)).into_response(),
        Ok(None) => not_found("Competition not found"),
        Err(e) => internal("Competition lookup", e),
    }
}

pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.catalog.toggle_favorite(&id).await {
        Ok(Some(toggle)) => Json(toggle).into_response(),
        Ok(None) => not_found("Competition not found"),
        Err(e) => internal("Favorite toggle", e),
    }
}

// ---------------------------------------------------------------------------
// Child listings
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct ChildListQuery {
    sort_by: Option<String>,
    order: Option<String>,
    limit: Option<i64>,
}

pub async fn competition_discussions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<ChildListQuery>,
) -> Response {
    let sort_by = params.sort_by.as_deref().unwrap_or("vote_count");
    let order = params.order.as_deref().unwrap_or("desc");

    match state
        .catalog
        .discussions()
        .list_by_competition(&id, sort_by, order, params.limit)
        .await
    {
        Ok(items) => Json(items).into_response(),
        Err(e) => internal("Discussion listing", e),
    }
}

pub async fn competition_solutions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<ChildListQuery>,
) -> Response {
    let sort_by = params.sort_by.as_deref().unwrap_or("rank");
    let order = params.order.as_deref().unwrap_or("asc");

    match state
        .catalog
        .solutions()
        .list_by_competition(&id, sort_by, order, params.limit)
        .await
    {
        Ok(items) => Json(items).into_response(),
        Err(e) => internal("Solution listing", e),
    }
}

pub async fn competition_notebooks(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<ChildListQuery>,
) -> Response {
    let sort_by = params.sort_by.as_deref().unwrap_or("vote_count");
    let order = params.order.as_deref().unwrap_or("desc");

    match state
        .catalog
        .solutions()
        .list_notebooks(&id, sort_by, order, params.limit)
        .await
    {
        Ok(items) => Json(items).into_response(),
        Err(e) => internal("Notebook listing", e),
    }
}

// ---------------------------------------------------------------------------
// Ingestion triggers
// ---------------------------------------------------------------------------

pub async fn fetch_discussions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.harvester.ingest_discussions(&id, 3).await {
        Ok(Some(report)) => Json(json!({
            "success": true,
            "discussions": report.discussions,
            "solutions": report.solutions,
            "writeups_count": report.writeups_count,
            "total_items": report.total_items,
        }))
        .into_response(),
        Ok(None) => not_found("Competition not found"),
        Err(e) => internal("Discussion fetch", e),
    }
}

#[derive(Deserialize)]
pub struct FetchSolutionsQuery {
    enable_ai: Option<bool>,
}

pub async fn fetch_solutions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<FetchSolutionsQuery>,
) -> Response {
    let enable_ai = params.enable_ai.unwrap_or(false);

    match state.harvester.ingest_solutions(&id, 3, enable_ai).await {
        Ok(Some(report)) => {
            let mut body = serde_json::to_value(&report).unwrap_or_default();
            body["success"] = json!(true);
            Json(body).into_response()
        }
        Ok(None) => not_found("Competition not found"),
        Err(e) => internal("Solution fetch", e),
    }
}

pub async fn fetch_notebooks(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.harvester.ingest_notebooks(&id, 3).await {
        Ok(Some(counters)) => {
            let message = if counters.total == 0 {
                "ノートブックが見つかりませんでした".to_string()
            } else {
                format!("{}件のノートブックを保存しました", counters.total)
            };
            Json(json!({
                "saved": counters.saved,
                "updated": counters.updated,
                "total": counters.total,
                "message": message,
            }))
            .into_response()
        }
        Ok(None) => not_found("Competition not found"),
        Err(e) => internal("Notebook fetch", e),
    }
}

pub async fn fetch_dataset_info(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.harvester.fetch_dataset_info(&id).await {
        Ok(Some(encoded)) => {
            let dataset_info: serde_json::Value =
                serde_json::from_str(&encoded).unwrap_or_default();
            Json(json!({ "success": true, "dataset_info": dataset_info })).into_response()
        }
        Ok(None) => not_found("Competition not found"),
        Err(e) => internal("Dataset fetch", e),
    }
}

pub async fn generate_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let comp = match state.catalog.competitions().get(&id).await {
        Ok(Some(comp)) => comp,
        Ok(None) => return not_found("Competition not found"),
        Err(e) => return internal("Competition lookup", e),
    };

    // A stored, parseable summary is served as-is.
    if let Some(stored) = comp.summary.as_deref() {
        if let Ok(summary) = serde_json::from_str::<serde_json::Value>(stored) {
            return Json(json!({ "success": true, "summary": summary, "cached": true }))
                .into_response();
        }
    }

    if comp.description.as_deref().unwrap_or_default().is_empty() {
        return bad_request("Competition has no description");
    }

    match state.harvester.generate_competition_summary(&id).await {
        Ok(Some(encoded)) => {
            let summary: serde_json::Value = serde_json::from_str(&encoded).unwrap_or_default();
            Json(json!({ "success": true, "summary": summary, "cached": false })).into_response()
        }
        Ok(None) => internal("Summary generation", "empty result"),
        Err(e) => internal("Summary generation", e),
    }
}

// ---------------------------------------------------------------------------
// Discussions
// ---------------------------------------------------------------------------

pub async fn get_discussion(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    match state.catalog.discussions().get(id).await {
        Ok(Some(discussion)) => Json(discussion).into_response(),
        Ok(None) => not_found("Discussion not found"),
        Err(e) => internal("Discussion lookup", e),
    }
}

pub async fn discussion_content(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Response {
    let content = state.cache.get(&keys::discussion_content(id)).await;
    let translated = state.cache.get(&keys::discussion_translated(id)).await;
    let ttl_seconds = state.cache.ttl(&keys::discussion_content(id)).await;

    content_response(content, translated, ttl_seconds)
}

pub async fn fetch_discussion_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Response {
    match state.harvester.fetch_discussion_detail(id).await {
        Ok(Some((discussion, links))) => Json(json!({
            "success": true,
            "discussion": discussion,
            "links": links,
            "content_cached": true,
            "cache_ttl_days": podium_common::config::CONTENT_TTL_DAYS,
        }))
        .into_response(),
        Ok(None) => not_found("Discussion not found"),
        Err(e) => internal("Discussion detail fetch", e),
    }
}

// ---------------------------------------------------------------------------
// Solutions & notebooks
// ---------------------------------------------------------------------------

pub async fn solution_content(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Response {
    let content = state.cache.get(&keys::solution_content(id)).await;
    let translated = state.cache.get(&keys::solution_translated(id)).await;
    let ttl_seconds = state.cache.ttl(&keys::solution_content(id)).await;

    content_response(content, translated, ttl_seconds)
}

pub async fn fetch_solution_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Response {
    match state.harvester.fetch_solution_detail(id).await {
        Ok(Some((solution, links))) => Json(json!({
            "success": true,
            "solution": solution,
            "links": links,
            "content_cached": true,
            "cache_ttl_days": podium_common::config::CONTENT_TTL_DAYS,
        }))
        .into_response(),
        Ok(None) => not_found("Solution not found"),
        Err(e) => internal("Solution detail fetch", e),
    }
}

pub async fn summarize_solution(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Response {
    match state.harvester.summarize_solution(id).await {
        Ok(Some((summary, cached))) => Json(json!({
            "success": true,
            "summary": summary,
            "cached": cached,
        }))
        .into_response(),
        Ok(None) => not_found("Solution not found"),
        Err(e) => internal("Solution summary", e),
    }
}

pub async fn summarize_notebook(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Response {
    match state.harvester.summarize_notebook(id).await {
        Ok(Some(report)) => Json(json!({
            "success": true,
            "summary": report.summary,
            "cached": report.cached,
        }))
        .into_response(),
        Ok(None) => not_found("Notebook not found"),
        Err(e) => internal("Notebook summary", e),
    }
}

/// Cached body + translation + remaining TTL; 404 when neither exists.
fn content_response(
    content: Option<String>,
    translated: Option<String>,
    ttl_seconds: Option<i64>,
) -> Response {
    if content.is_none() && translated.is_none() {
        return not_found("Content not found in cache. Fetch the detail first.");
    }

    let ttl_days = ttl_seconds.map(|s| (s as f64 / 86_400.0 * 10.0).round() / 10.0);

    Json(json!({
        "content": content,
        "translated_content": translated,
        "ttl_seconds": ttl_seconds,
        "ttl_days": ttl_days,
    }))
    .into_response()
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct TagsQuery {
    category: Option<String>,
    group_by_category: Option<bool>,
}

pub async fn list_tags(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TagsQuery>,
) -> Response {
    let category = match params.category.as_deref() {
        None => None,
        Some(raw) => match raw.parse::<TagCategory>() {
            Ok(category) => Some(category),
            Err(_) => return bad_request("unknown tag category"),
        },
    };

    if params.group_by_category.unwrap_or(false) {
        return match state.catalog.tags().grouped().await {
            Ok(grouped) => Json(grouped).into_response(),
            Err(e) => internal("Tag listing", e),
        };
    }

    match state.catalog.tags().list(category).await {
        Ok(tags) => Json(tags).into_response(),
        Err(e) => internal("Tag listing", e),
    }
}
