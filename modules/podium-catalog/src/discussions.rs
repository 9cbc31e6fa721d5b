use anyhow::Result;
use sqlx::SqlitePool;

use podium_common::Discussion;

use crate::row::{encode_datetime, now_iso, tier_to_string, DiscussionRow};
use crate::UpsertOutcome;

const SORT_KEYS: &[&str] = &["vote_count", "comment_count", "created_at"];

pub struct DiscussionRepo {
    pool: SqlitePool,
}

impl DiscussionRepo {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: i64) -> Result<Option<Discussion>> {
        let row = sqlx::query_as::<_, DiscussionRow>("SELECT * FROM discussions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(DiscussionRow::into_discussion))
    }

    /// Insert-or-update keyed on `(competition_id, url)`.
    ///
    /// A refresh never clears the stored summary: scrape-sourced records
    /// arrive with `summary = None` and the enriched value must survive.
    pub async fn upsert_by_url(&self, disc: &Discussion) -> Result<(i64, UpsertOutcome)> {
        let existing: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM discussions WHERE competition_id = ? AND url = ?",
        )
        .bind(&disc.competition_id)
        .bind(&disc.url)
        .fetch_optional(&self.pool)
        .await?;

        let now = now_iso();

        match existing {
            Some((id,)) => {
                sqlx::query(
                    r#"
                    UPDATE discussions SET
                        title = ?, author = ?, author_tier = ?, tier_color = ?,
                        vote_count = ?, comment_count = ?, category = ?, is_pinned = ?,
                        summary = COALESCE(?, summary), updated_at = ?
                    WHERE id = ?
                    "#,
                )
                .bind(&disc.title)
                .bind(&disc.author)
                .bind(tier_to_string(disc.author_tier))
                .bind(&disc.tier_color)
                .bind(disc.vote_count)
                .bind(disc.comment_count)
                .bind(disc.category.to_string())
                .bind(disc.is_pinned as i64)
                .bind(&disc.summary)
                .bind(&now)
                .bind(id)
                .execute(&self.pool)
                .await?;
                Ok((id, UpsertOutcome::Updated))
            }
            None => {
                let row: (i64,) = sqlx::query_as(
                    r#"
                    INSERT INTO discussions (
                        competition_id, title, url, author, author_tier, tier_color,
                        vote_count, comment_count, category, is_pinned, summary,
                        created_at, updated_at
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    RETURNING id
                    "#,
                )
                .bind(&disc.competition_id)
                .bind(&disc.title)
                .bind(&disc.url)
                .bind(&disc.author)
                .bind(tier_to_string(disc.author_tier))
                .bind(&disc.tier_color)
                .bind(disc.vote_count)
                .bind(disc.comment_count)
                .bind(disc.category.to_string())
                .bind(disc.is_pinned as i64)
                .bind(&disc.summary)
                .bind(&now)
                .bind(&now)
                .fetch_one(&self.pool)
                .await?;
                Ok((row.0, UpsertOutcome::Created))
            }
        }
    }

    pub async fn update(&self, disc: &Discussion) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE discussions SET
                title = ?, author = ?, author_tier = ?, tier_color = ?,
                vote_count = ?, comment_count = ?, category = ?, is_pinned = ?,
                summary = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&disc.title)
        .bind(&disc.author)
        .bind(tier_to_string(disc.author_tier))
        .bind(&disc.tier_color)
        .bind(disc.vote_count)
        .bind(disc.comment_count)
        .bind(disc.category.to_string())
        .bind(disc.is_pinned as i64)
        .bind(&disc.summary)
        .bind(encode_datetime(Some(chrono::Utc::now())))
        .bind(disc.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Discussions for a competition. Pinned rows sort first regardless of
    /// the requested key.
    pub async fn list_by_competition(
        &self,
        competition_id: &str,
        sort_by: &str,
        order: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Discussion>> {
        let sort_by = if SORT_KEYS.contains(&sort_by) {
            sort_by
        } else {
            "vote_count"
        };
        let order_sql = if order.eq_ignore_ascii_case("asc") {
            "ASC"
        } else {
            "DESC"
        };

        let mut query = format!(
            "SELECT * FROM discussions WHERE competition_id = ? \
             ORDER BY is_pinned DESC, {sort_by} {order_sql}"
        );
        if limit.is_some() {
            query.push_str(" LIMIT ?");
        }

        let mut q = sqlx::query_as::<_, DiscussionRow>(&query).bind(competition_id);
        if let Some(limit) = limit {
            q = q.bind(limit);
        }
        let rows = q.fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(DiscussionRow::into_discussion).collect())
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM discussions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove every discussion of a competition. Returns the number deleted.
    pub async fn delete_by_competition(&self, competition_id: &str) -> Result<i64> {
        let result = sqlx::query("DELETE FROM discussions WHERE competition_id = ?")
            .bind(competition_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() as i64)
    }

    pub async fn count_by_competition(&self, competition_id: &str) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM discussions WHERE competition_id = ?")
                .bind(competition_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
