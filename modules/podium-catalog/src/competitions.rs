use anyhow::Result;
use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use podium_common::{Competition, CompetitionStatus};

use crate::row::{
    encode_date, encode_datetime, encode_list, now_iso, CompetitionRow,
};

/// Candidate ceiling for the in-memory filtering path. Set-valued fields are
/// JSON text, so containment cannot be pushed into SQL portably.
const IN_MEMORY_FILTER_CAP: i64 = 10_000;

const SORT_KEYS: &[&str] = &["created_at", "end_date", "start_date", "title", "discussion_count"];

/// Filter for competition listings. Scalar fields filter in SQL; set-valued
/// fields and title search filter in memory with OR semantics within a field
/// and AND semantics across fields.
#[derive(Debug, Clone, Default)]
pub struct CompetitionFilter {
    pub status: Option<CompetitionStatus>,
    pub domain: Option<String>,
    pub is_favorite: Option<bool>,
    pub metrics: Vec<String>,
    pub data_types: Vec<String>,
    pub task_types: Vec<String>,
    pub tags: Vec<String>,
    pub search: Option<String>,
}

impl CompetitionFilter {
    pub fn status(status: CompetitionStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    fn needs_in_memory_pass(&self) -> bool {
        !self.metrics.is_empty()
            || !self.data_types.is_empty()
            || !self.task_types.is_empty()
            || !self.tags.is_empty()
            || self.search.is_some()
    }

    fn matches_in_memory(&self, comp: &Competition) -> bool {
        if !self.metrics.is_empty() {
            let Some(metric) = &comp.metric else {
                return false;
            };
            if !self.metrics.iter().any(|m| m == metric) {
                return false;
            }
        }
        if !self.data_types.is_empty() && !overlaps(&self.data_types, &comp.data_types) {
            return false;
        }
        if !self.task_types.is_empty() && !overlaps(&self.task_types, &comp.task_types) {
            return false;
        }
        if !self.tags.is_empty() && !overlaps(&self.tags, &comp.tags) {
            return false;
        }
        if let Some(search) = &self.search {
            if !comp.title.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

fn overlaps(wanted: &[String], present: &[String]) -> bool {
    wanted.iter().any(|w| present.iter().any(|p| p == w))
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct FavoriteToggle {
    pub is_favorite: bool,
    pub deleted_discussions: i64,
}

pub struct CompetitionRepo {
    pool: SqlitePool,
}

impl CompetitionRepo {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, comp: &Competition) -> Result<()> {
        let now = now_iso();
        sqlx::query(
            r#"
            INSERT INTO competitions (
                id, title, url, status, start_date, end_date,
                metric, metric_description, description, summary,
                tags, data_types, task_types, competition_features,
                domain, dataset_info, discussion_count, solution_status,
                is_favorite, created_at, last_scraped_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&comp.id)
        .bind(&comp.title)
        .bind(&comp.url)
        .bind(comp.status.to_string())
        .bind(encode_date(comp.start_date))
        .bind(encode_date(comp.end_date))
        .bind(&comp.metric)
        .bind(&comp.metric_description)
        .bind(&comp.description)
        .bind(&comp.summary)
        .bind(encode_list(&comp.tags))
        .bind(encode_list(&comp.data_types))
        .bind(encode_list(&comp.task_types))
        .bind(encode_list(&comp.competition_features))
        .bind(&comp.domain)
        .bind(&comp.dataset_info)
        .bind(comp.discussion_count)
        .bind(&comp.solution_status)
        .bind(comp.is_favorite as i64)
        .bind(encode_datetime(comp.created_at).unwrap_or(now))
        .bind(encode_datetime(comp.last_scraped_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, comp_id: &str) -> Result<Option<Competition>> {
        let row = sqlx::query_as::<_, CompetitionRow>(
            "SELECT * FROM competitions WHERE id = ?",
        )
        .bind(comp_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CompetitionRow::into_competition))
    }

    pub async fn update(&self, comp: &Competition) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE competitions SET
                title = ?, url = ?, status = ?, start_date = ?, end_date = ?,
                metric = ?, metric_description = ?, description = ?, summary = ?,
                tags = ?, data_types = ?, task_types = ?, competition_features = ?,
                domain = ?, dataset_info = ?, discussion_count = ?,
                solution_status = ?, is_favorite = ?, last_scraped_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&comp.title)
        .bind(&comp.url)
        .bind(comp.status.to_string())
        .bind(encode_date(comp.start_date))
        .bind(encode_date(comp.end_date))
        .bind(&comp.metric)
        .bind(&comp.metric_description)
        .bind(&comp.description)
        .bind(&comp.summary)
        .bind(encode_list(&comp.tags))
        .bind(encode_list(&comp.data_types))
        .bind(encode_list(&comp.task_types))
        .bind(encode_list(&comp.competition_features))
        .bind(&comp.domain)
        .bind(&comp.dataset_info)
        .bind(comp.discussion_count)
        .bind(&comp.solution_status)
        .bind(comp.is_favorite as i64)
        .bind(encode_datetime(comp.last_scraped_at))
        .bind(&comp.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete(&self, comp_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM competitions WHERE id = ?")
            .bind(comp_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_favorite(&self, comp_id: &str, is_favorite: bool) -> Result<()> {
        sqlx::query("UPDATE competitions SET is_favorite = ? WHERE id = ?")
            .bind(is_favorite as i64)
            .bind(comp_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list(
        &self,
        filter: &CompetitionFilter,
        sort_by: &str,
        order: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Competition>> {
        let sort_by = if SORT_KEYS.contains(&sort_by) {
            sort_by
        } else {
            "created_at"
        };
        let order_sql = if order.eq_ignore_ascii_case("asc") {
            "ASC"
        } else {
            "DESC"
        };

        let (where_sql, binds) = sql_filter(filter);

        if filter.needs_in_memory_pass() {
            let query = format!(
                "SELECT * FROM competitions {where_sql} ORDER BY {sort_by} {order_sql} LIMIT ?"
            );
            let mut q = sqlx::query_as::<_, CompetitionRow>(&query);
            for bind in &binds {
                q = q.bind(bind);
            }
            let rows = q.bind(IN_MEMORY_FILTER_CAP).fetch_all(&self.pool).await?;

            let matched: Vec<Competition> = rows
                .into_iter()
                .map(CompetitionRow::into_competition)
                .filter(|c| filter.matches_in_memory(c))
                .collect();

            return Ok(matched
                .into_iter()
                .skip(offset.max(0) as usize)
                .take(limit.max(0) as usize)
                .collect());
        }

        let query = format!(
            "SELECT * FROM competitions {where_sql} ORDER BY {sort_by} {order_sql} LIMIT ? OFFSET ?"
        );
        let mut q = sqlx::query_as::<_, CompetitionRow>(&query);
        for bind in &binds {
            q = q.bind(bind);
        }
        let rows = q.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(CompetitionRow::into_competition).collect())
    }

    pub async fn count(&self, filter: &CompetitionFilter) -> Result<i64> {
        let (where_sql, binds) = sql_filter(filter);

        if filter.needs_in_memory_pass() {
            let query = format!("SELECT * FROM competitions {where_sql} LIMIT ?");
            let mut q = sqlx::query_as::<_, CompetitionRow>(&query);
            for bind in &binds {
                q = q.bind(bind);
            }
            let rows = q.bind(IN_MEMORY_FILTER_CAP).fetch_all(&self.pool).await?;
            let count = rows
                .into_iter()
                .map(CompetitionRow::into_competition)
                .filter(|c| filter.matches_in_memory(c))
                .count();
            return Ok(count as i64);
        }

        let query = format!("SELECT COUNT(*) FROM competitions {where_sql}");
        let mut q = sqlx::query_as::<_, (i64,)>(&query);
        for bind in &binds {
            q = q.bind(bind);
        }
        let (count,) = q.fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Competitions first seen within the last `days` days.
    pub async fn list_new(&self, days: i64, limit: Option<i64>) -> Result<Vec<Competition>> {
        let cutoff = (Utc::now() - Duration::days(days)).to_rfc3339();

        let query = match limit {
            Some(_) => {
                "SELECT * FROM competitions WHERE created_at >= ? ORDER BY created_at DESC LIMIT ?"
            }
            None => "SELECT * FROM competitions WHERE created_at >= ? ORDER BY created_at DESC",
        };

        let mut q = sqlx::query_as::<_, CompetitionRow>(query).bind(&cutoff);
        if let Some(limit) = limit {
            q = q.bind(limit);
        }
        let rows = q.fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(CompetitionRow::into_competition).collect())
    }
}

/// Build the SQL-level WHERE clause for the scalar filters.
fn sql_filter(filter: &CompetitionFilter) -> (String, Vec<String>) {
    let mut clauses: Vec<&str> = Vec::new();
    let mut binds: Vec<String> = Vec::new();

    if let Some(status) = filter.status {
        clauses.push("status = ?");
        binds.push(status.to_string());
    }
    if let Some(domain) = &filter.domain {
        clauses.push("domain = ?");
        binds.push(domain.clone());
    }
    if let Some(is_favorite) = filter.is_favorite {
        clauses.push("is_favorite = ?");
        binds.push(if is_favorite { "1" } else { "0" }.to_string());
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    (where_sql, binds)
}
