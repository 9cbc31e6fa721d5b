use std::collections::BTreeMap;

use anyhow::Result;
use sqlx::SqlitePool;

use podium_common::{Tag, TagCategory};

pub struct TagRepo {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct TagRow {
    name: String,
    category: String,
    display_order: i64,
}

impl TagRow {
    fn into_tag(self) -> Option<Tag> {
        Some(Tag {
            category: self.category.parse().ok()?,
            name: self.name,
            display_order: self.display_order,
        })
    }
}

impl TagRepo {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All tags, optionally narrowed to one category, in display order.
    pub async fn list(&self, category: Option<TagCategory>) -> Result<Vec<Tag>> {
        let rows = match category {
            Some(category) => {
                sqlx::query_as::<_, TagRow>(
                    "SELECT * FROM tags WHERE category = ? ORDER BY display_order",
                )
                .bind(category.to_string())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, TagRow>(
                    "SELECT * FROM tags ORDER BY category, display_order",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().filter_map(TagRow::into_tag).collect())
    }

    /// Tags grouped by category name.
    pub async fn grouped(&self) -> Result<BTreeMap<String, Vec<Tag>>> {
        let mut grouped: BTreeMap<String, Vec<Tag>> = BTreeMap::new();
        for tag in self.list(None).await? {
            grouped.entry(tag.category.to_string()).or_default().push(tag);
        }
        Ok(grouped)
    }

    /// The taxonomy as plain name lists per category, for the tag-generation
    /// prompt. Model types are excluded: the model would pick them on
    /// vibes, and they come from solution analysis instead.
    pub async fn taxonomy_for_prompt(&self) -> Result<BTreeMap<String, Vec<String>>> {
        let mut taxonomy: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for tag in self.list(None).await? {
            if tag.category == TagCategory::ModelType {
                continue;
            }
            taxonomy
                .entry(tag.category.to_string())
                .or_default()
                .push(tag.name);
        }
        Ok(taxonomy)
    }

    /// Every known tag name, across all categories. Used to enforce taxonomy
    /// closure on LLM output.
    pub async fn all_names(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT name FROM tags")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}
