//! Core domain records shared across the workspace.
//!
//! Enum fields cross the SQLite boundary as their lowercase string form;
//! list-valued fields cross it as JSON text. Both conversions live in the
//! catalog crate; in memory these are plain typed records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompetitionStatus {
    Active,
    Completed,
    Upcoming,
}

impl std::fmt::Display for CompetitionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompetitionStatus::Active => write!(f, "active"),
            CompetitionStatus::Completed => write!(f, "completed"),
            CompetitionStatus::Upcoming => write!(f, "upcoming"),
        }
    }
}

impl std::str::FromStr for CompetitionStatus {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "upcoming" => Ok(Self::Upcoming),
            other => Err(format!("unknown CompetitionStatus: {other}")),
        }
    }
}

impl CompetitionStatus {
    /// The authoritative status rule: a competition with a deadline in the
    /// past is completed, one with a deadline today or later is active.
    /// Without a deadline the status cannot be improved on `fallback`.
    pub fn from_end_date(end_date: Option<NaiveDate>, today: NaiveDate, fallback: Self) -> Self {
        match end_date {
            Some(end) if end < today => Self::Completed,
            Some(_) => Self::Active,
            None => fallback,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscussionCategory {
    Discussion,
    Writeup,
}

impl std::fmt::Display for DiscussionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscussionCategory::Discussion => write!(f, "discussion"),
            DiscussionCategory::Writeup => write!(f, "writeup"),
        }
    }
}

impl std::str::FromStr for DiscussionCategory {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "discussion" => Ok(Self::Discussion),
            "writeup" => Ok(Self::Writeup),
            other => Err(format!("unknown DiscussionCategory: {other}")),
        }
    }
}

/// What a stored solution record originated from. Writeup-tab items are
/// folded into `Discussion` at persistence time, so the solutions table keeps
/// a single canonical pair of origins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolutionKind {
    Discussion,
    Notebook,
}

impl std::fmt::Display for SolutionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolutionKind::Discussion => write!(f, "discussion"),
            SolutionKind::Notebook => write!(f, "notebook"),
        }
    }
}

impl std::str::FromStr for SolutionKind {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "discussion" => Ok(Self::Discussion),
            "notebook" => Ok(Self::Notebook),
            other => Err(format!("unknown SolutionKind: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl std::fmt::Display for Medal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Medal::Gold => write!(f, "gold"),
            Medal::Silver => write!(f, "silver"),
            Medal::Bronze => write!(f, "bronze"),
        }
    }
}

impl std::str::FromStr for Medal {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "gold" => Ok(Self::Gold),
            "silver" => Ok(Self::Silver),
            "bronze" => Ok(Self::Bronze),
            other => Err(format!("unknown Medal: {other}")),
        }
    }
}

/// Author rank on the platform, ordered lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AuthorTier {
    Novice,
    Contributor,
    Expert,
    Master,
    Grandmaster,
}

impl AuthorTier {
    /// All tiers, longest name first, so substring scans never report
    /// "Master" for a Grandmaster badge.
    pub const LONGEST_FIRST: [AuthorTier; 5] = [
        AuthorTier::Grandmaster,
        AuthorTier::Contributor,
        AuthorTier::Master,
        AuthorTier::Novice,
        AuthorTier::Expert,
    ];
}

impl std::fmt::Display for AuthorTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthorTier::Novice => write!(f, "Novice"),
            AuthorTier::Contributor => write!(f, "Contributor"),
            AuthorTier::Expert => write!(f, "Expert"),
            AuthorTier::Master => write!(f, "Master"),
            AuthorTier::Grandmaster => write!(f, "Grandmaster"),
        }
    }
}

impl std::str::FromStr for AuthorTier {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Novice" => Ok(Self::Novice),
            "Contributor" => Ok(Self::Contributor),
            "Expert" => Ok(Self::Expert),
            "Master" => Ok(Self::Master),
            "Grandmaster" => Ok(Self::Grandmaster),
            other => Err(format!("unknown AuthorTier: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagCategory {
    DataType,
    TaskType,
    ModelType,
    SolutionMethod,
    CompetitionFeature,
    Domain,
}

impl std::fmt::Display for TagCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagCategory::DataType => write!(f, "data_type"),
            TagCategory::TaskType => write!(f, "task_type"),
            TagCategory::ModelType => write!(f, "model_type"),
            TagCategory::SolutionMethod => write!(f, "solution_method"),
            TagCategory::CompetitionFeature => write!(f, "competition_feature"),
            TagCategory::Domain => write!(f, "domain"),
        }
    }
}

impl std::str::FromStr for TagCategory {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "data_type" => Ok(Self::DataType),
            "task_type" => Ok(Self::TaskType),
            "model_type" => Ok(Self::ModelType),
            "solution_method" => Ok(Self::SolutionMethod),
            "competition_feature" => Ok(Self::CompetitionFeature),
            "domain" => Ok(Self::Domain),
            other => Err(format!("unknown TagCategory: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A contest on the platform, keyed by its slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competition {
    pub id: String,
    pub title: String,
    pub url: String,
    pub status: CompetitionStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub metric: Option<String>,
    pub metric_description: Option<String>,
    pub description: Option<String>,
    /// Structured overview as JSON text (see the enrichment schemas).
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub data_types: Vec<String>,
    pub task_types: Vec<String>,
    pub competition_features: Vec<String>,
    pub domain: Option<String>,
    /// Dataset schema as JSON text.
    pub dataset_info: Option<String>,
    pub discussion_count: i64,
    pub solution_status: String,
    pub is_favorite: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub last_scraped_at: Option<DateTime<Utc>>,
}

impl Competition {
    pub fn new(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            status: CompetitionStatus::Completed,
            start_date: None,
            end_date: None,
            metric: None,
            metric_description: None,
            description: None,
            summary: None,
            tags: Vec::new(),
            data_types: Vec::new(),
            task_types: Vec::new(),
            competition_features: Vec::new(),
            domain: None,
            dataset_info: None,
            discussion_count: 0,
            solution_status: "未着手".to_string(),
            is_favorite: false,
            created_at: None,
            last_scraped_at: None,
        }
    }

    /// Whole days until the deadline. Defined only for active competitions
    /// whose deadline is today or later.
    pub fn days_until_deadline(&self, today: NaiveDate) -> Option<i64> {
        match (self.status, self.end_date) {
            (CompetitionStatus::Active, Some(end)) if end >= today => {
                Some((end - today).num_days())
            }
            _ => None,
        }
    }
}

/// A forum thread attached to a competition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discussion {
    pub id: i64,
    pub competition_id: String,
    pub title: String,
    pub url: String,
    pub author: String,
    pub author_tier: Option<AuthorTier>,
    pub tier_color: Option<String>,
    pub vote_count: i64,
    pub comment_count: i64,
    pub category: DiscussionCategory,
    pub is_pinned: bool,
    /// Structured study notes as JSON text.
    pub summary: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A competitive approach: a promoted discussion or a notebook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    pub id: i64,
    pub competition_id: String,
    pub title: String,
    pub url: String,
    pub author: String,
    pub author_tier: Option<AuthorTier>,
    pub tier_color: Option<String>,
    pub kind: SolutionKind,
    pub medal: Option<Medal>,
    pub rank: Option<i64>,
    pub vote_count: i64,
    pub comment_count: i64,
    /// Structured summary as JSON text.
    pub summary: Option<String>,
    /// Ranked technique list as JSON text.
    pub techniques: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One label in the closed classification taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub category: TagCategory,
    pub display_order: i64,
}
