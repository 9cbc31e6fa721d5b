//! HTTP-level tests over the full router, with an in-memory catalog and a
//! page source that serves nothing.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use tower::ServiceExt;

use ai_client::OpenAi;
use podium_api::{build_router, AppState};
use podium_cache::{keys, Cache};
use podium_catalog::Catalog;
use podium_common::{
    AuthorTier, Competition, CompetitionStatus, Discussion, DiscussionCategory,
};
use podium_harvest::enrich::Enricher;
use podium_harvest::traits::{FetchedPage, PageSource};
use podium_harvest::Harvester;

/// Every page is a 404: these tests exercise the catalog-backed surface.
struct NoPages;

#[async_trait]
impl PageSource for NoPages {
    async fn fetch_page(&self, _url: &str) -> Result<FetchedPage> {
        Ok(FetchedPage {
            status: 404,
            html: String::new(),
            text: String::new(),
        })
    }
}

struct TestApp {
    router: Router,
    catalog: Catalog,
    cache: Cache,
}

async fn test_app() -> TestApp {
    let catalog = Catalog::connect("sqlite::memory:").await.unwrap();
    let cache = Cache::open("sqlite::memory:").await;

    let enricher = Enricher::new(
        OpenAi::new("test-key", "test-model").with_base_url("http://127.0.0.1:1"),
        0,
        Duration::from_secs(0),
    );
    let harvester = Harvester::new(
        Arc::new(NoPages),
        cache.clone(),
        catalog.clone(),
        enricher,
        None,
    );

    let state = Arc::new(AppState {
        catalog: catalog.clone(),
        cache: cache.clone(),
        harvester,
    });

    TestApp {
        router: build_router(state),
        catalog,
        cache,
    }
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    request_json(router, "GET", uri).await
}

async fn request_json(router: &Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn competition(id: &str, end_offset_days: i64) -> Competition {
    let today = Utc::now().date_naive();
    let mut comp = Competition::new(
        id,
        format!("Competition {id}"),
        format!("https://www.kaggle.com/competitions/{id}"),
    );
    comp.end_date = Some(today + chrono::Duration::days(end_offset_days));
    comp.status =
        CompetitionStatus::from_end_date(comp.end_date, today, CompetitionStatus::Completed);
    comp
}

fn discussion(comp_id: &str, n: i64) -> Discussion {
    Discussion {
        id: 0,
        competition_id: comp_id.to_string(),
        title: format!("Thread {n}"),
        url: format!("https://www.kaggle.com/competitions/{comp_id}/discussion/{n}"),
        author: "someone".to_string(),
        author_tier: Some(AuthorTier::Contributor),
        tier_color: None,
        vote_count: n,
        comment_count: 0,
        category: DiscussionCategory::Discussion,
        is_pinned: false,
        summary: None,
        created_at: None,
        updated_at: None,
    }
}

// =========================================================================
// Listing & filters
// =========================================================================

#[tokio::test]
async fn health_check_responds() {
    let app = test_app().await;
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn active_filter_returns_deadlines() {
    let app = test_app().await;
    for (id, offset) in [("old", -60), ("soon", 15), ("later", 25), ("done", -5)] {
        app.catalog.competitions().create(&competition(id, offset)).await.unwrap();
    }

    let (status, body) = get_json(&app.router, "/api/competitions?status=active").await;
    assert_eq!(status, StatusCode::OK);

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);

    let mut days: Vec<i64> = items
        .iter()
        .map(|i| i["days_until_deadline"].as_i64().unwrap())
        .collect();
    days.sort();
    assert_eq!(days, vec![15, 25]);

    assert_eq!(body["total"], 2);
    assert_eq!(body["active_count"], 2);
    assert_eq!(body["completed_count"], 2);
    assert_eq!(body["page"], 1);
    assert_eq!(body["total_pages"], 1);
}

#[tokio::test]
async fn completed_competitions_have_no_deadline_countdown() {
    let app = test_app().await;
    app.catalog.competitions().create(&competition("done", -5)).await.unwrap();

    let (_, body) = get_json(&app.router, "/api/competitions/done").await;
    assert_eq!(body["status"], "completed");
    assert!(body["days_until_deadline"].is_null());
}

#[tokio::test]
async fn pagination_envelope_counts_pages() {
    let app = test_app().await;
    for i in 0..5 {
        app.catalog
            .competitions()
            .create(&competition(&format!("comp-{i}"), -10))
            .await
            .unwrap();
    }

    let (_, body) = get_json(&app.router, "/api/competitions?page=1&limit=2").await;
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["total"], 5);
    assert_eq!(body["total_pages"], 3);
}

#[tokio::test]
async fn search_filters_by_title() {
    let app = test_app().await;
    let mut named = competition("titanic", -10);
    named.title = "Titanic - Machine Learning from Disaster".to_string();
    app.catalog.competitions().create(&named).await.unwrap();
    app.catalog.competitions().create(&competition("other", -10)).await.unwrap();

    let (_, body) = get_json(&app.router, "/api/competitions?search=titanic").await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "titanic");
}

#[tokio::test]
async fn malformed_parameters_are_rejected() {
    let app = test_app().await;

    let (status, _) = get_json(&app.router, "/api/competitions?page=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(&app.router, "/api/competitions?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(&app.router, "/api/competitions?limit=500").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(&app.router, "/api/competitions?status=bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_competition_is_404() {
    let app = test_app().await;
    let (status, _) = get_json(&app.router, "/api/competitions/ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =========================================================================
// Favorite cascade
// =========================================================================

#[tokio::test]
async fn unfavorite_reports_deleted_discussions() {
    let app = test_app().await;

    let mut comp = competition("foo", -10);
    comp.is_favorite = true;
    app.catalog.competitions().create(&comp).await.unwrap();
    for n in 0..7 {
        app.catalog.discussions().upsert_by_url(&discussion("foo", n)).await.unwrap();
    }

    let (status, body) = request_json(&app.router, "PATCH", "/api/competitions/foo/favorite").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_favorite"], false);
    assert_eq!(body["deleted_discussions"], 7);

    let (_, listed) = get_json(&app.router, "/api/competitions/foo/discussions").await;
    assert_eq!(listed.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn favorite_toggle_on_missing_competition_is_404() {
    let app = test_app().await;
    let (status, _) = request_json(&app.router, "PATCH", "/api/competitions/nope/favorite").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =========================================================================
// Cached content
// =========================================================================

#[tokio::test]
async fn discussion_content_served_from_cache_with_ttl() {
    let app = test_app().await;

    app.cache
        .set(&keys::discussion_content(42), "the body", Duration::from_secs(86_400 * 3))
        .await;
    app.cache
        .set(
            &keys::discussion_translated(42),
            "翻訳済み",
            Duration::from_secs(86_400 * 3),
        )
        .await;

    let (status, body) = get_json(&app.router, "/api/discussions/42/content").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "the body");
    assert_eq!(body["translated_content"], "翻訳済み");
    assert!(body["ttl_seconds"].as_i64().unwrap() > 0);
    assert_eq!(body["ttl_days"].as_f64().unwrap(), 3.0);
}

#[tokio::test]
async fn uncached_content_is_404() {
    let app = test_app().await;
    let (status, _) = get_json(&app.router, "/api/discussions/42/content").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_json(&app.router, "/api/solutions/42/content").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =========================================================================
// Tags
// =========================================================================

#[tokio::test]
async fn tags_list_and_grouping() {
    let app = test_app().await;

    let (status, body) = get_json(&app.router, "/api/tags").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.as_array().unwrap().is_empty());

    let (_, grouped) = get_json(&app.router, "/api/tags?group_by_category=true").await;
    assert!(grouped.get("data_type").is_some());
    assert!(grouped.get("domain").is_some());

    let (_, domains) = get_json(&app.router, "/api/tags?category=domain").await;
    assert!(domains
        .as_array()
        .unwrap()
        .iter()
        .all(|t| t["category"] == "domain"));

    let (status, _) = get_json(&app.router, "/api/tags?category=bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =========================================================================
// Triggers against a dead page source
// =========================================================================

#[tokio::test]
async fn fetch_triggers_404_for_unknown_competition() {
    let app = test_app().await;
    let (status, _) =
        request_json(&app.router, "POST", "/api/competitions/ghost/discussions/fetch").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn fetch_discussions_is_500_when_acquisition_fails() {
    let app = test_app().await;
    app.catalog.competitions().create(&competition("dead", -10)).await.unwrap();

    let (status, _) =
        request_json(&app.router, "POST", "/api/competitions/dead/discussions/fetch").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn summary_generation_requires_description() {
    let app = test_app().await;
    app.catalog.competitions().create(&competition("bare", -10)).await.unwrap();

    let (status, _) =
        request_json(&app.router, "POST", "/api/competitions/bare/summary/generate").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stored_summary_is_served_cached() {
    let app = test_app().await;
    let mut comp = competition("summed", -10);
    comp.summary = Some(r#"{"overview":"stored"}"#.to_string());
    app.catalog.competitions().create(&comp).await.unwrap();

    let (status, body) =
        request_json(&app.router, "POST", "/api/competitions/summed/summary/generate").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cached"], true);
    assert_eq!(body["summary"]["overview"], "stored");
}
