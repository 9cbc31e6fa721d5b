use anyhow::Result;
use sqlx::SqlitePool;

use podium_common::{Solution, SolutionKind};

use crate::row::{medal_to_string, now_iso, tier_to_string, SolutionRow};
use crate::UpsertOutcome;

const SORT_KEYS: &[&str] = &["rank", "vote_count", "comment_count", "created_at", "title"];

pub struct SolutionRepo {
    pool: SqlitePool,
}

impl SolutionRepo {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: i64) -> Result<Option<Solution>> {
        let row = sqlx::query_as::<_, SolutionRow>("SELECT * FROM solutions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(SolutionRow::into_solution))
    }

    pub async fn get_notebook(&self, id: i64) -> Result<Option<Solution>> {
        let row = sqlx::query_as::<_, SolutionRow>(
            "SELECT * FROM solutions WHERE id = ? AND type = 'notebook'",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(SolutionRow::into_solution))
    }

    /// Insert-or-update keyed on `(competition_id, url)`.
    ///
    /// Enrichment fields (`summary`, `techniques`) and the classifier fields
    /// (`medal`, `rank`) only move forward: a refresh with an empty value
    /// keeps what a previous run stored.
    pub async fn upsert_by_url(&self, sol: &Solution) -> Result<(i64, UpsertOutcome)> {
        let existing: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM solutions WHERE competition_id = ? AND url = ?",
        )
        .bind(&sol.competition_id)
        .bind(&sol.url)
        .fetch_optional(&self.pool)
        .await?;

        let now = now_iso();

        match existing {
            Some((id,)) => {
                sqlx::query(
                    r#"
                    UPDATE solutions SET
                        title = ?, author = ?, author_tier = ?, tier_color = ?,
                        type = ?, medal = COALESCE(?, medal), rank = COALESCE(?, rank),
                        vote_count = ?, comment_count = ?,
                        summary = COALESCE(?, summary),
                        techniques = COALESCE(?, techniques),
                        updated_at = ?
                    WHERE id = ?
                    "#,
                )
                .bind(&sol.title)
                .bind(&sol.author)
                .bind(tier_to_string(sol.author_tier))
                .bind(&sol.tier_color)
                .bind(sol.kind.to_string())
                .bind(medal_to_string(sol.medal))
                .bind(sol.rank)
                .bind(sol.vote_count)
                .bind(sol.comment_count)
                .bind(&sol.summary)
                .bind(&sol.techniques)
                .bind(&now)
                .bind(id)
                .execute(&self.pool)
                .await?;
                Ok((id, UpsertOutcome::Updated))
            }
            None => {
                let row: (i64,) = sqlx::query_as(
                    r#"
                    INSERT INTO solutions (
                        competition_id, title, url, author, author_tier, tier_color,
                        type, medal, rank, vote_count, comment_count,
                        summary, techniques, created_at, updated_at
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    RETURNING id
                    "#,
                )
                .bind(&sol.competition_id)
                .bind(&sol.title)
                .bind(&sol.url)
                .bind(&sol.author)
                .bind(tier_to_string(sol.author_tier))
                .bind(&sol.tier_color)
                .bind(sol.kind.to_string())
                .bind(medal_to_string(sol.medal))
                .bind(sol.rank)
                .bind(sol.vote_count)
                .bind(sol.comment_count)
                .bind(&sol.summary)
                .bind(&sol.techniques)
                .bind(&now)
                .bind(&now)
                .fetch_one(&self.pool)
                .await?;
                Ok((row.0, UpsertOutcome::Created))
            }
        }
    }

    /// Store enrichment results. `None` values leave the column untouched.
    pub async fn set_enrichment(
        &self,
        id: i64,
        summary: Option<&str>,
        techniques: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE solutions SET
                summary = COALESCE(?, summary),
                techniques = COALESCE(?, techniques),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(summary)
        .bind(techniques)
        .bind(now_iso())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Solutions for a competition. Sorting by rank keeps NULL ranks strictly
    /// after ranked rows whatever the direction, with votes as tiebreak.
    pub async fn list_by_competition(
        &self,
        competition_id: &str,
        sort_by: &str,
        order: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Solution>> {
        self.list_filtered(competition_id, None, sort_by, order, limit).await
    }

    /// Notebook-kind solutions only.
    pub async fn list_notebooks(
        &self,
        competition_id: &str,
        sort_by: &str,
        order: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Solution>> {
        self.list_filtered(competition_id, Some(SolutionKind::Notebook), sort_by, order, limit)
            .await
    }

    async fn list_filtered(
        &self,
        competition_id: &str,
        kind: Option<SolutionKind>,
        sort_by: &str,
        order: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Solution>> {
        let sort_by = if SORT_KEYS.contains(&sort_by) {
            sort_by
        } else {
            "rank"
        };
        let order_sql = if order.eq_ignore_ascii_case("asc") {
            "ASC"
        } else {
            "DESC"
        };

        let kind_sql = match kind {
            Some(_) => " AND type = ?",
            None => "",
        };

        let order_clause = if sort_by == "rank" {
            format!(
                "ORDER BY CASE WHEN rank IS NULL THEN 1 ELSE 0 END, rank {order_sql}, vote_count DESC"
            )
        } else {
            format!("ORDER BY {sort_by} {order_sql}")
        };

        let mut query = format!(
            "SELECT * FROM solutions WHERE competition_id = ?{kind_sql} {order_clause}"
        );
        if limit.is_some() {
            query.push_str(" LIMIT ?");
        }

        let mut q = sqlx::query_as::<_, SolutionRow>(&query).bind(competition_id);
        if let Some(kind) = kind {
            q = q.bind(kind.to_string());
        }
        if let Some(limit) = limit {
            q = q.bind(limit);
        }
        let rows = q.fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(SolutionRow::into_solution).collect())
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM solutions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
