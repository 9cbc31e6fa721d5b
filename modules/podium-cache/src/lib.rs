//! TTL key-value cache for scraped pages and rendered article bodies.
//!
//! Every method is total: when the backing store is unavailable the cache
//! degrades to a no-op: `get` misses, `set`/`delete` succeed silently.
//! Callers never branch on cache errors.
//!
//! Values are opaque UTF-8 strings; structured payloads are serialized by
//! the caller.

pub mod keys;

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct Cache {
    pool: Option<SqlitePool>,
}

/// Cache health snapshot for logs.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub enabled: bool,
    pub entries: i64,
}

impl Cache {
    /// Open (or create) the cache database at `path`. On any failure the
    /// cache comes up disabled rather than failing the process.
    pub async fn open(path: &str) -> Self {
        let options = match path.parse::<SqliteConnectOptions>() {
            Ok(options) => options.create_if_missing(true),
            Err(e) => {
                warn!(path, error = %e, "Invalid cache database path, running without cache");
                return Self { pool: None };
            }
        };

        // Single connection: SQLite is single-writer anyway, and a pool of
        // one keeps in-memory databases coherent under test.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await;

        let pool = match pool {
            Ok(pool) => pool,
            Err(e) => {
                warn!(path, error = %e, "Cache database unavailable, running without cache");
                return Self { pool: None };
            }
        };

        let schema = r#"
            CREATE TABLE IF NOT EXISTS cache_entries (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                expires_at TEXT NOT NULL
            )
        "#;
        if let Err(e) = sqlx::query(schema).execute(&pool).await {
            warn!(error = %e, "Failed to initialize cache schema, running without cache");
            return Self { pool: None };
        }

        Self { pool: Some(pool) }
    }

    /// A cache that never stores anything. Used in tests and no-cache
    /// deployments.
    pub fn disabled() -> Self {
        Self { pool: None }
    }

    /// Fetch an unexpired value. Expired rows are removed on the way out.
    pub async fn get(&self, key: &str) -> Option<String> {
        let pool = self.pool.as_ref()?;

        let row: (String, String) = sqlx::query_as(
            "SELECT value, expires_at FROM cache_entries WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(pool)
        .await
        .unwrap_or_else(|e| {
            warn!(key, error = %e, "Cache read failed");
            None
        })?;

        let (value, expires_at) = row;
        if is_expired(&expires_at) {
            let _ = sqlx::query("DELETE FROM cache_entries WHERE key = ?")
                .bind(key)
                .execute(pool)
                .await;
            debug!(key, "Cache entry expired");
            return None;
        }

        debug!(key, "Cache hit");
        Some(value)
    }

    /// Store a value with a time-to-live. Overwrites any existing entry.
    pub async fn set(&self, key: &str, value: &str, ttl: Duration) {
        let Some(pool) = self.pool.as_ref() else {
            return;
        };

        let expires_at = (Utc::now()
            + chrono::Duration::seconds(ttl.as_secs() as i64))
        .to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO cache_entries (key, value, expires_at)
            VALUES (?, ?, ?)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(&expires_at)
        .execute(pool)
        .await;

        if let Err(e) = result {
            warn!(key, error = %e, "Cache write failed");
        }
    }

    pub async fn delete(&self, key: &str) {
        let Some(pool) = self.pool.as_ref() else {
            return;
        };

        if let Err(e) = sqlx::query("DELETE FROM cache_entries WHERE key = ?")
            .bind(key)
            .execute(pool)
            .await
        {
            warn!(key, error = %e, "Cache delete failed");
        }
    }

    /// Remaining lifetime of a key in whole seconds, or `None` if the key is
    /// absent or already expired.
    pub async fn ttl(&self, key: &str) -> Option<i64> {
        let pool = self.pool.as_ref()?;

        let row: (String,) =
            sqlx::query_as("SELECT expires_at FROM cache_entries WHERE key = ?")
                .bind(key)
                .fetch_optional(pool)
                .await
                .unwrap_or_else(|e| {
                    warn!(key, error = %e, "Cache TTL read failed");
                    None
                })?;

        let expires_at = DateTime::parse_from_rfc3339(&row.0).ok()?;
        let remaining = (expires_at.with_timezone(&Utc) - Utc::now()).num_seconds();
        (remaining > 0).then_some(remaining)
    }

    /// All unexpired keys under a prefix.
    pub async fn list(&self, prefix: &str) -> Vec<String> {
        let Some(pool) = self.pool.as_ref() else {
            return Vec::new();
        };

        let pattern = format!("{}%", prefix.replace('%', "\\%").replace('_', "\\_"));
        let now = Utc::now().to_rfc3339();

        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT key FROM cache_entries
            WHERE key LIKE ? ESCAPE '\' AND expires_at > ?
            ORDER BY key
            "#,
        )
        .bind(&pattern)
        .bind(&now)
        .fetch_all(pool)
        .await
        .unwrap_or_else(|e| {
            warn!(prefix, error = %e, "Cache list failed");
            Vec::new()
        });

        rows.into_iter().map(|(key,)| key).collect()
    }

    /// Drop every entry under a prefix. Returns how many were removed.
    pub async fn clear_prefix(&self, prefix: &str) -> i64 {
        let Some(pool) = self.pool.as_ref() else {
            return 0;
        };

        let pattern = format!("{}%", prefix.replace('%', "\\%").replace('_', "\\_"));
        match sqlx::query(r#"DELETE FROM cache_entries WHERE key LIKE ? ESCAPE '\'"#)
            .bind(&pattern)
            .execute(pool)
            .await
        {
            Ok(result) => result.rows_affected() as i64,
            Err(e) => {
                warn!(prefix, error = %e, "Cache clear failed");
                0
            }
        }
    }

    pub async fn stats(&self) -> CacheStats {
        let Some(pool) = self.pool.as_ref() else {
            return CacheStats {
                enabled: false,
                entries: 0,
            };
        };

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cache_entries")
            .fetch_one(pool)
            .await
            .unwrap_or((0,));

        CacheStats {
            enabled: true,
            entries: count.0,
        }
    }
}

fn is_expired(expires_at: &str) -> bool {
    match DateTime::parse_from_rfc3339(expires_at) {
        Ok(ts) => ts.with_timezone(&Utc) <= Utc::now(),
        // Unparseable expiry means the row is garbage; treat as expired.
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_cache() -> Cache {
        Cache::open("sqlite::memory:").await
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let cache = memory_cache().await;
        cache
            .set("page:titanic:overview", "hello", Duration::from_secs(60))
            .await;
        assert_eq!(
            cache.get("page:titanic:overview").await.as_deref(),
            Some("hello")
        );
    }

    #[tokio::test]
    async fn expired_entry_misses() {
        let cache = memory_cache().await;
        cache.set("k", "v", Duration::from_secs(0)).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn set_overwrites() {
        let cache = memory_cache().await;
        cache.set("k", "one", Duration::from_secs(60)).await;
        cache.set("k", "two", Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let cache = memory_cache().await;
        cache.set("k", "v", Duration::from_secs(60)).await;
        cache.delete("k").await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn ttl_reports_remaining_seconds() {
        let cache = memory_cache().await;
        cache.set("k", "v", Duration::from_secs(3600)).await;
        let ttl = cache.ttl("k").await.unwrap();
        assert!(ttl > 3500 && ttl <= 3600);
    }

    #[tokio::test]
    async fn ttl_of_missing_key_is_none() {
        let cache = memory_cache().await;
        assert_eq!(cache.ttl("missing").await, None);
    }

    #[tokio::test]
    async fn list_filters_by_prefix() {
        let cache = memory_cache().await;
        cache.set("page:a:overview", "1", Duration::from_secs(60)).await;
        cache.set("page:b:overview", "2", Duration::from_secs(60)).await;
        cache.set("content:discussion:1", "3", Duration::from_secs(60)).await;

        let keys = cache.list("page:").await;
        assert_eq!(keys, vec!["page:a:overview", "page:b:overview"]);
    }

    #[tokio::test]
    async fn clear_prefix_removes_only_that_namespace() {
        let cache = memory_cache().await;
        cache.set("page:a:overview", "1", Duration::from_secs(60)).await;
        cache.set("page:b:data", "2", Duration::from_secs(60)).await;
        cache.set("content:discussion:1", "3", Duration::from_secs(60)).await;

        assert_eq!(cache.clear_prefix("page:").await, 2);
        assert_eq!(cache.get("page:a:overview").await, None);
        assert_eq!(cache.get("content:discussion:1").await.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn disabled_cache_is_total() {
        let cache = Cache::disabled();
        cache.set("k", "v", Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, None);
        cache.delete("k").await;
        assert_eq!(cache.ttl("k").await, None);
        assert!(cache.list("").await.is_empty());
        assert!(!cache.stats().await.enabled);
    }
}
