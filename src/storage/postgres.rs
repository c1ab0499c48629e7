//! PgStore - PostgreSQL implementation of the engine's store traits
//!
//! Badge inserts rely on the unique (user_id, name) index with
//! `ON CONFLICT DO NOTHING`; rank-score writes are single additive
//! updates so concurrent deltas never clobber each other.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::Row;
use tracing::debug;

use crate::engine::badges::{BadgeCategory, BadgeRecord};
use crate::engine::stats::{ClassTag, UserStats};
use crate::engine::{ActivityCounts, ReputationStore, StoreError};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReputationStore for PgStore {
    async fn fetch_user(&self, user_id: &str) -> Result<Option<UserStats>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, books_read, rank_score, class_tag, created_at
            FROM users
            WHERE id = $1
        "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let class_tag: Option<String> = row.get("class_tag");
                let created_at: DateTime<Utc> = row.get("created_at");

                Ok(Some(UserStats {
                    user_id: row.get("id"),
                    books_read: row.get("books_read"),
                    rank_score: row.get("rank_score"),
                    class_tag: class_tag.as_deref().and_then(ClassTag::parse),
                    created_at,
                }))
            }
            None => Ok(None),
        }
    }

    async fn badge_exists(&self, user_id: &str, name: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM badges WHERE user_id = $1 AND name = $2)")
            .bind(user_id)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<bool, _>(0))
    }

    async fn insert_badge(&self, record: &BadgeRecord) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO badges (user_id, name, category, description, granted_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, name) DO NOTHING
        "#,
        )
        .bind(&record.user_id)
        .bind(&record.name)
        .bind(record.category.as_str())
        .bind(&record.description)
        .bind(record.granted_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn badges_for_user(&self, user_id: &str) -> Result<Vec<BadgeRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, name, category, description, granted_at
            FROM badges
            WHERE user_id = $1
            ORDER BY granted_at
        "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let category_str: String = row.get("category");
            let Some(category) = BadgeCategory::parse(&category_str) else {
                debug!(category = %category_str, "skipping badge with unknown category");
                continue;
            };

            records.push(BadgeRecord {
                user_id: row.get("user_id"),
                name: row.get("name"),
                category,
                description: row.get("description"),
                granted_at: row.get("granted_at"),
            });
        }

        Ok(records)
    }

    async fn set_class_tag(&self, user_id: &str, tag: ClassTag) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET class_tag = $2 WHERE id = $1")
            .bind(user_id)
            .bind(tag.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn increment_rank_score(&self, user_id: &str, delta: i64) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET rank_score = rank_score + $2 WHERE id = $1")
            .bind(user_id)
            .bind(delta)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            debug!(user_id = %user_id, delta, "rank score update matched no user");
        }

        Ok(())
    }
}

#[async_trait]
impl ActivityCounts for PgStore {
    async fn reviews_with_min_upvotes(
        &self,
        user_id: &str,
        min_upvotes: i64,
    ) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) FROM reviews WHERE user_id = $1 AND upvotes >= $2")
            .bind(user_id)
            .bind(min_upvotes)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>(0))
    }

    async fn progress_with_min_streak(
        &self,
        user_id: &str,
        min_days: i64,
    ) -> Result<i64, StoreError> {
        let row = sqlx::query(
            "SELECT COUNT(*) FROM reading_progress WHERE user_id = $1 AND streak_days >= $2",
        )
        .bind(user_id)
        .bind(min_days)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get::<i64, _>(0))
    }

    async fn progress_updated_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let row = sqlx::query(
            "SELECT COUNT(*) FROM reading_progress WHERE user_id = $1 AND last_updated >= $2",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get::<i64, _>(0))
    }

    async fn quotes_total(&self, user_id: &str) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) FROM quotes WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>(0))
    }

    async fn quotes_with_min_upvotes(
        &self,
        user_id: &str,
        min_upvotes: i64,
    ) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) FROM quotes WHERE user_id = $1 AND upvotes >= $2")
            .bind(user_id)
            .bind(min_upvotes)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>(0))
    }
}
