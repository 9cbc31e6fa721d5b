//! Row structs and edge conversions between SQLite text/integer columns and
//! the typed records in podium-common.

use chrono::{DateTime, NaiveDate, Utc};
use podium_common::{
    AuthorTier, Competition, CompetitionStatus, Discussion, DiscussionCategory, Medal, Solution,
    SolutionKind,
};

pub(crate) fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

/// JSON text → list. Unparseable stored text degrades to an empty list.
pub(crate) fn parse_list(raw: Option<&str>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

/// List → JSON text. Empty lists are stored as NULL.
pub(crate) fn encode_list(list: &[String]) -> Option<String> {
    if list.is_empty() {
        None
    } else {
        serde_json::to_string(list).ok()
    }
}

pub(crate) fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?;
    // Dates may have been stored bare or as a full timestamp.
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|ts| ts.date_naive()))
}

pub(crate) fn parse_datetime(raw: Option<&str>) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw?)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

pub(crate) fn encode_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

pub(crate) fn encode_datetime(ts: Option<DateTime<Utc>>) -> Option<String> {
    ts.map(|t| t.to_rfc3339())
}

// ---------------------------------------------------------------------------
// competitions
// ---------------------------------------------------------------------------

#[derive(sqlx::FromRow)]
pub(crate) struct CompetitionRow {
    pub id: String,
    pub title: String,
    pub url: String,
    pub status: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub metric: Option<String>,
    pub metric_description: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub tags: Option<String>,
    pub data_types: Option<String>,
    pub task_types: Option<String>,
    pub competition_features: Option<String>,
    pub domain: Option<String>,
    pub dataset_info: Option<String>,
    pub discussion_count: i64,
    pub solution_status: String,
    pub is_favorite: i64,
    pub created_at: Option<String>,
    pub last_scraped_at: Option<String>,
}

impl CompetitionRow {
    pub fn into_competition(self) -> Competition {
        Competition {
            status: self
                .status
                .parse()
                .unwrap_or(CompetitionStatus::Completed),
            start_date: parse_date(self.start_date.as_deref()),
            end_date: parse_date(self.end_date.as_deref()),
            tags: parse_list(self.tags.as_deref()),
            data_types: parse_list(self.data_types.as_deref()),
            task_types: parse_list(self.task_types.as_deref()),
            competition_features: parse_list(self.competition_features.as_deref()),
            is_favorite: self.is_favorite != 0,
            created_at: parse_datetime(self.created_at.as_deref()),
            last_scraped_at: parse_datetime(self.last_scraped_at.as_deref()),
            id: self.id,
            title: self.title,
            url: self.url,
            metric: self.metric,
            metric_description: self.metric_description,
            description: self.description,
            summary: self.summary,
            domain: self.domain,
            dataset_info: self.dataset_info,
            discussion_count: self.discussion_count,
            solution_status: self.solution_status,
        }
    }
}

// ---------------------------------------------------------------------------
// discussions
// ---------------------------------------------------------------------------

#[derive(sqlx::FromRow)]
pub(crate) struct DiscussionRow {
    pub id: i64,
    pub competition_id: String,
    pub title: String,
    pub url: String,
    pub author: String,
    pub author_tier: Option<String>,
    pub tier_color: Option<String>,
    pub vote_count: i64,
    pub comment_count: i64,
    pub category: String,
    pub is_pinned: i64,
    pub summary: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl DiscussionRow {
    pub fn into_discussion(self) -> Discussion {
        Discussion {
            author_tier: self.author_tier.as_deref().and_then(|t| t.parse().ok()),
            category: self
                .category
                .parse()
                .unwrap_or(DiscussionCategory::Discussion),
            is_pinned: self.is_pinned != 0,
            created_at: parse_datetime(self.created_at.as_deref()),
            updated_at: parse_datetime(self.updated_at.as_deref()),
            id: self.id,
            competition_id: self.competition_id,
            title: self.title,
            url: self.url,
            author: self.author,
            tier_color: self.tier_color,
            vote_count: self.vote_count,
            comment_count: self.comment_count,
            summary: self.summary,
        }
    }
}

// ---------------------------------------------------------------------------
// solutions
// ---------------------------------------------------------------------------

#[derive(sqlx::FromRow)]
pub(crate) struct SolutionRow {
    pub id: i64,
    pub competition_id: String,
    pub title: String,
    pub url: String,
    pub author: String,
    pub author_tier: Option<String>,
    pub tier_color: Option<String>,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub medal: Option<String>,
    pub rank: Option<i64>,
    pub vote_count: i64,
    pub comment_count: i64,
    pub summary: Option<String>,
    pub techniques: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl SolutionRow {
    pub fn into_solution(self) -> Solution {
        Solution {
            author_tier: self.author_tier.as_deref().and_then(|t| t.parse().ok()),
            kind: self.kind.parse().unwrap_or(SolutionKind::Discussion),
            medal: self.medal.as_deref().and_then(|m| m.parse().ok()),
            created_at: parse_datetime(self.created_at.as_deref()),
            updated_at: parse_datetime(self.updated_at.as_deref()),
            id: self.id,
            competition_id: self.competition_id,
            title: self.title,
            url: self.url,
            author: self.author,
            tier_color: self.tier_color,
            rank: self.rank,
            vote_count: self.vote_count,
            comment_count: self.comment_count,
            summary: self.summary,
            techniques: self.techniques,
        }
    }
}

pub(crate) fn tier_to_string(tier: Option<AuthorTier>) -> Option<String> {
    tier.map(|t| t.to_string())
}

pub(crate) fn medal_to_string(medal: Option<Medal>) -> Option<String> {
    medal.map(|m| m.to_string())
}
