//! SQLite persistence for the competition catalog.
//!
//! Single-writer: all mutation goes through the repositories here, one
//! transaction per operation. List-valued fields are JSON text in the
//! database and `Vec<String>` in memory; booleans are 0/1 integers.

pub mod competitions;
pub mod discussions;
pub mod migrate;
pub mod solutions;
pub mod tags;

mod row;

pub use competitions::{CompetitionFilter, CompetitionRepo, FavoriteToggle};
pub use discussions::DiscussionRepo;
pub use solutions::SolutionRepo;
pub use tags::TagRepo;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

/// Whether an upsert created a fresh row or refreshed an existing one.
/// Ingestion counters are derived from these outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

#[derive(Clone)]
pub struct Catalog {
    pool: SqlitePool,
}

impl Catalog {
    /// Open (or create) the catalog database and bring its schema up to date.
    pub async fn connect(path: &str) -> Result<Self> {
        let options = path
            .parse::<SqliteConnectOptions>()?
            .create_if_missing(true)
            .foreign_keys(true);

        // One connection keeps SQLite writes serialized and makes
        // `sqlite::memory:` behave in tests.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let catalog = Self { pool };
        catalog.migrate().await?;
        Ok(catalog)
    }

    async fn migrate(&self) -> Result<()> {
        migrate::run(&self.pool).await?;
        info!("Catalog schema up to date");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn competitions(&self) -> CompetitionRepo {
        CompetitionRepo::new(self.pool.clone())
    }

    pub fn discussions(&self) -> DiscussionRepo {
        DiscussionRepo::new(self.pool.clone())
    }

    pub fn solutions(&self) -> SolutionRepo {
        SolutionRepo::new(self.pool.clone())
    }

    pub fn tags(&self) -> TagRepo {
        TagRepo::new(self.pool.clone())
    }

    /// Flip a competition's favorite flag. Turning a favorite off deletes its
    /// discussions (favorites gate deep ingestion storage); turning it back
    /// on does not resurrect them.
    ///
    /// Returns `None` when the competition does not exist.
    pub async fn toggle_favorite(&self, comp_id: &str) -> Result<Option<FavoriteToggle>> {
        let Some(competition) = self.competitions().get(comp_id).await? else {
            return Ok(None);
        };

        let mut deleted_discussions = 0;
        if competition.is_favorite {
            deleted_discussions = self.discussions().delete_by_competition(comp_id).await?;
        }

        let next = !competition.is_favorite;
        self.competitions().set_favorite(comp_id, next).await?;

        Ok(Some(FavoriteToggle {
            is_favorite: next,
            deleted_discussions,
        }))
    }
}
