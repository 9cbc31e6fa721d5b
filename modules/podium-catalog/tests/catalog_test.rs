//! Integration tests for the catalog repositories, on in-memory SQLite.

use chrono::{Duration, NaiveDate, Utc};
use podium_catalog::{Catalog, CompetitionFilter, UpsertOutcome};
use podium_common::{
    AuthorTier, Competition, CompetitionStatus, Discussion, DiscussionCategory, Medal, Solution,
    SolutionKind,
};

async fn catalog() -> Catalog {
    Catalog::connect("sqlite::memory:").await.unwrap()
}

fn competition(id: &str) -> Competition {
    Competition::new(
        id,
        format!("Competition {id}"),
        format!("https://www.kaggle.com/competitions/{id}"),
    )
}

fn discussion(comp_id: &str, url_suffix: &str) -> Discussion {
    Discussion {
        id: 0,
        competition_id: comp_id.to_string(),
        title: "Great EDA thread".to_string(),
        url: format!("https://www.kaggle.com/competitions/{comp_id}/discussion/{url_suffix}"),
        author: "aqsa".to_string(),
        author_tier: Some(AuthorTier::Expert),
        tier_color: Some("rgb(149, 69, 186)".to_string()),
        vote_count: 12,
        comment_count: 3,
        category: DiscussionCategory::Discussion,
        is_pinned: false,
        summary: None,
        created_at: None,
        updated_at: None,
    }
}

fn solution(comp_id: &str, url_suffix: &str, rank: Option<i64>) -> Solution {
    Solution {
        id: 0,
        competition_id: comp_id.to_string(),
        title: "1st Place Solution".to_string(),
        url: format!("https://www.kaggle.com/competitions/{comp_id}/discussion/{url_suffix}"),
        author: "winner".to_string(),
        author_tier: Some(AuthorTier::Grandmaster),
        tier_color: None,
        kind: SolutionKind::Discussion,
        medal: rank.and_then(|r| match r {
            1 => Some(Medal::Gold),
            2 => Some(Medal::Silver),
            3 => Some(Medal::Bronze),
            _ => None,
        }),
        rank,
        vote_count: 50,
        comment_count: 10,
        summary: None,
        techniques: None,
        created_at: None,
        updated_at: None,
    }
}

// =========================================================================
// Upsert-by-URL
// =========================================================================

#[tokio::test]
async fn discussion_upsert_is_idempotent() {
    let catalog = catalog().await;
    catalog.competitions().create(&competition("titanic")).await.unwrap();

    let disc = discussion("titanic", "1001");

    let (id1, first) = catalog.discussions().upsert_by_url(&disc).await.unwrap();
    let (id2, second) = catalog.discussions().upsert_by_url(&disc).await.unwrap();

    assert_eq!(first, UpsertOutcome::Created);
    assert_eq!(second, UpsertOutcome::Updated);
    assert_eq!(id1, id2);

    let all = catalog
        .discussions()
        .list_by_competition("titanic", "vote_count", "desc", None)
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn discussion_refresh_keeps_summary() {
    let catalog = catalog().await;
    catalog.competitions().create(&competition("titanic")).await.unwrap();

    let mut disc = discussion("titanic", "1001");
    disc.summary = Some(r#"{"overview":"x"}"#.to_string());
    let (id, _) = catalog.discussions().upsert_by_url(&disc).await.unwrap();

    // Re-scrape arrives without a summary.
    disc.summary = None;
    disc.vote_count = 99;
    catalog.discussions().upsert_by_url(&disc).await.unwrap();

    let stored = catalog.discussions().get(id).await.unwrap().unwrap();
    assert_eq!(stored.vote_count, 99);
    assert_eq!(stored.summary.as_deref(), Some(r#"{"overview":"x"}"#));
}

#[tokio::test]
async fn solution_upsert_counts_and_preserves_enrichment() {
    let catalog = catalog().await;
    catalog.competitions().create(&competition("titanic")).await.unwrap();

    let sol = solution("titanic", "2002", Some(1));
    let (id, first) = catalog.solutions().upsert_by_url(&sol).await.unwrap();
    assert_eq!(first, UpsertOutcome::Created);

    catalog
        .solutions()
        .set_enrichment(id, Some(r#"{"overview":"o"}"#), Some(r#"[{"name":"GBDT"}]"#))
        .await
        .unwrap();

    let (_, second) = catalog.solutions().upsert_by_url(&sol).await.unwrap();
    assert_eq!(second, UpsertOutcome::Updated);

    let stored = catalog.solutions().get(id).await.unwrap().unwrap();
    assert_eq!(stored.summary.as_deref(), Some(r#"{"overview":"o"}"#));
    assert_eq!(stored.techniques.as_deref(), Some(r#"[{"name":"GBDT"}]"#));
    assert_eq!(stored.medal, Some(Medal::Gold));
}

// =========================================================================
// Sorting
// =========================================================================

#[tokio::test]
async fn rank_sort_puts_null_ranks_last() {
    let catalog = catalog().await;
    catalog.competitions().create(&competition("titanic")).await.unwrap();

    for (suffix, rank) in [("a", None), ("b", Some(2)), ("c", Some(1)), ("d", None)] {
        catalog
            .solutions()
            .upsert_by_url(&solution("titanic", suffix, rank))
            .await
            .unwrap();
    }

    let asc = catalog
        .solutions()
        .list_by_competition("titanic", "rank", "asc", None)
        .await
        .unwrap();
    let ranks: Vec<Option<i64>> = asc.iter().map(|s| s.rank).collect();
    assert_eq!(ranks, vec![Some(1), Some(2), None, None]);

    let desc = catalog
        .solutions()
        .list_by_competition("titanic", "rank", "desc", None)
        .await
        .unwrap();
    let ranks: Vec<Option<i64>> = desc.iter().map(|s| s.rank).collect();
    assert_eq!(ranks, vec![Some(2), Some(1), None, None]);
}

#[tokio::test]
async fn pinned_discussions_sort_first() {
    let catalog = catalog().await;
    catalog.competitions().create(&competition("titanic")).await.unwrap();

    let mut low_votes_pinned = discussion("titanic", "p");
    low_votes_pinned.vote_count = 1;
    low_votes_pinned.is_pinned = true;

    let mut high_votes = discussion("titanic", "h");
    high_votes.vote_count = 500;

    catalog.discussions().upsert_by_url(&high_votes).await.unwrap();
    catalog.discussions().upsert_by_url(&low_votes_pinned).await.unwrap();

    let listed = catalog
        .discussions()
        .list_by_competition("titanic", "vote_count", "desc", None)
        .await
        .unwrap();
    assert!(listed[0].is_pinned);
    assert_eq!(listed[1].vote_count, 500);
}

// =========================================================================
// Competition filters
// =========================================================================

#[tokio::test]
async fn status_filter_and_days_until_deadline() {
    let catalog = catalog().await;
    let today = Utc::now().date_naive();

    for (id, offset) in [("old", -60), ("soon", 15), ("later", 25), ("done", -5)] {
        let mut comp = competition(id);
        comp.end_date = Some(today + Duration::days(offset));
        comp.status = CompetitionStatus::from_end_date(
            comp.end_date,
            today,
            CompetitionStatus::Completed,
        );
        catalog.competitions().create(&comp).await.unwrap();
    }

    let active = catalog
        .competitions()
        .list(
            &CompetitionFilter::status(CompetitionStatus::Active),
            "created_at",
            "desc",
            100,
            0,
        )
        .await
        .unwrap();

    assert_eq!(active.len(), 2);
    let mut days: Vec<i64> = active
        .iter()
        .filter_map(|c| c.days_until_deadline(today))
        .collect();
    days.sort();
    assert_eq!(days, vec![15, 25]);
}

#[tokio::test]
async fn list_filters_on_json_fields_with_or_semantics() {
    let catalog = catalog().await;

    let mut vision = competition("vision");
    vision.data_types = vec!["画像".to_string()];
    vision.tags = vec!["セグメンテーション".to_string()];
    catalog.competitions().create(&vision).await.unwrap();

    let mut tabular = competition("tabular");
    tabular.data_types = vec!["テーブル".to_string()];
    catalog.competitions().create(&tabular).await.unwrap();

    let filter = CompetitionFilter {
        data_types: vec!["画像".to_string(), "音声".to_string()],
        ..Default::default()
    };
    let matched = catalog
        .competitions()
        .list(&filter, "created_at", "desc", 100, 0)
        .await
        .unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].id, "vision");
    assert_eq!(catalog.competitions().count(&filter).await.unwrap(), 1);
}

#[tokio::test]
async fn search_matches_title_case_insensitively() {
    let catalog = catalog().await;

    let mut comp = competition("titanic");
    comp.title = "Titanic - Machine Learning from Disaster".to_string();
    catalog.competitions().create(&comp).await.unwrap();
    catalog.competitions().create(&competition("other")).await.unwrap();

    let filter = CompetitionFilter {
        search: Some("machine learning".to_string()),
        ..Default::default()
    };
    let matched = catalog
        .competitions()
        .list(&filter, "created_at", "desc", 100, 0)
        .await
        .unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].id, "titanic");
}

#[tokio::test]
async fn list_new_respects_cutoff() {
    let catalog = catalog().await;

    let mut fresh = competition("fresh");
    fresh.created_at = Some(Utc::now() - Duration::days(2));
    catalog.competitions().create(&fresh).await.unwrap();

    let mut stale = competition("stale");
    stale.created_at = Some(Utc::now() - Duration::days(90));
    catalog.competitions().create(&stale).await.unwrap();

    let new = catalog.competitions().list_new(30, None).await.unwrap();
    assert_eq!(new.len(), 1);
    assert_eq!(new[0].id, "fresh");
}

// =========================================================================
// Favorite cascade
// =========================================================================

#[tokio::test]
async fn unfavorite_deletes_discussions() {
    let catalog = catalog().await;

    let mut comp = competition("titanic");
    comp.is_favorite = true;
    catalog.competitions().create(&comp).await.unwrap();

    for i in 0..7 {
        catalog
            .discussions()
            .upsert_by_url(&discussion("titanic", &i.to_string()))
            .await
            .unwrap();
    }

    let toggle = catalog.toggle_favorite("titanic").await.unwrap().unwrap();
    assert!(!toggle.is_favorite);
    assert_eq!(toggle.deleted_discussions, 7);

    let remaining = catalog
        .discussions()
        .list_by_competition("titanic", "vote_count", "desc", None)
        .await
        .unwrap();
    assert!(remaining.is_empty());

    // Favoriting again does not resurrect anything.
    let toggle = catalog.toggle_favorite("titanic").await.unwrap().unwrap();
    assert!(toggle.is_favorite);
    assert_eq!(toggle.deleted_discussions, 0);
    let remaining = catalog
        .discussions()
        .list_by_competition("titanic", "vote_count", "desc", None)
        .await
        .unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn toggle_favorite_on_missing_competition_is_none() {
    let catalog = catalog().await;
    assert!(catalog.toggle_favorite("nope").await.unwrap().is_none());
}

// =========================================================================
// Tags
// =========================================================================

#[tokio::test]
async fn tag_seed_is_idempotent_and_grouped() {
    let catalog = catalog().await;

    let all = catalog.tags().list(None).await.unwrap();
    assert!(!all.is_empty());

    let grouped = catalog.tags().grouped().await.unwrap();
    assert!(grouped.contains_key("data_type"));
    assert!(grouped.contains_key("domain"));

    let taxonomy = catalog.tags().taxonomy_for_prompt().await.unwrap();
    assert!(!taxonomy.contains_key("model_type"));
    assert!(taxonomy["data_type"].iter().any(|t| t == "画像"));
}

#[tokio::test]
async fn notebooks_listing_filters_by_kind() {
    let catalog = catalog().await;
    catalog.competitions().create(&competition("titanic")).await.unwrap();

    let mut nb = solution("titanic", "nb", None);
    nb.kind = SolutionKind::Notebook;
    nb.title = "EDA walkthrough".to_string();
    catalog.solutions().upsert_by_url(&nb).await.unwrap();
    catalog
        .solutions()
        .upsert_by_url(&solution("titanic", "disc", Some(1)))
        .await
        .unwrap();

    let notebooks = catalog
        .solutions()
        .list_notebooks("titanic", "vote_count", "desc", None)
        .await
        .unwrap();
    assert_eq!(notebooks.len(), 1);
    assert_eq!(notebooks[0].kind, SolutionKind::Notebook);
}

#[tokio::test]
async fn dates_round_trip_through_text_columns() {
    let catalog = catalog().await;

    let mut comp = competition("dated");
    comp.start_date = NaiveDate::from_ymd_opt(2025, 3, 1);
    comp.end_date = NaiveDate::from_ymd_opt(2025, 6, 1);
    comp.status = CompetitionStatus::Active;
    catalog.competitions().create(&comp).await.unwrap();

    let stored = catalog.competitions().get("dated").await.unwrap().unwrap();
    assert_eq!(stored.start_date, NaiveDate::from_ymd_opt(2025, 3, 1));
    assert_eq!(stored.end_date, NaiveDate::from_ymd_opt(2025, 6, 1));
    assert_eq!(stored.status, CompetitionStatus::Active);
}
