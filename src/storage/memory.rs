//! MemoryStore - In-Memory Store Implementation
//!
//! Backs the `postgres_enabled = false` fallback and the test suite.
//! Mirrors the PostgreSQL semantics the engine depends on: (user, name)
//! badge uniqueness and atomic rank-score increments (the write lock is
//! held across the read-modify-write).

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::engine::badges::BadgeRecord;
use crate::engine::stats::{ClassTag, UserStats};
use crate::engine::{ActivityCounts, ReputationStore, StoreError};

#[derive(Debug, Clone)]
struct ReviewRow {
    user_id: String,
    upvotes: i64,
}

#[derive(Debug, Clone)]
struct ProgressRow {
    user_id: String,
    streak_days: i64,
    last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct QuoteRow {
    user_id: String,
    upvotes: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserStats>>,
    badges: RwLock<Vec<BadgeRecord>>,
    reviews: RwLock<Vec<ReviewRow>>,
    progress: RwLock<Vec<ProgressRow>>,
    quotes: RwLock<Vec<QuoteRow>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Seeding and inspection helpers for callers and tests

    pub async fn seed_user(&self, user_id: &str, books_read: i64, created_at: DateTime<Utc>) {
        let mut stats = UserStats::new(user_id.to_string(), created_at);
        stats.books_read = books_read;
        self.users.write().await.insert(user_id.to_string(), stats);
    }

    pub async fn set_books_read(&self, user_id: &str, books_read: i64) {
        if let Some(stats) = self.users.write().await.get_mut(user_id) {
            stats.books_read = books_read;
        }
    }

    pub async fn add_review(&self, user_id: &str, upvotes: i64) {
        self.reviews.write().await.push(ReviewRow {
            user_id: user_id.to_string(),
            upvotes,
        });
    }

    pub async fn add_progress(&self, user_id: &str, streak_days: i64, last_updated: DateTime<Utc>) {
        self.progress.write().await.push(ProgressRow {
            user_id: user_id.to_string(),
            streak_days,
            last_updated,
        });
    }

    pub async fn add_quote(&self, user_id: &str, upvotes: i64) {
        self.quotes.write().await.push(QuoteRow {
            user_id: user_id.to_string(),
            upvotes,
        });
    }

    pub async fn rank_score(&self, user_id: &str) -> Option<i64> {
        self.users.read().await.get(user_id).map(|s| s.rank_score)
    }

    pub async fn class_tag(&self, user_id: &str) -> Option<ClassTag> {
        self.users.read().await.get(user_id).and_then(|s| s.class_tag)
    }

    pub async fn badges_for(&self, user_id: &str) -> Vec<BadgeRecord> {
        self.badges
            .read()
            .await
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ReputationStore for MemoryStore {
    async fn fetch_user(&self, user_id: &str) -> Result<Option<UserStats>, StoreError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn badge_exists(&self, user_id: &str, name: &str) -> Result<bool, StoreError> {
        Ok(self
            .badges
            .read()
            .await
            .iter()
            .any(|b| b.user_id == user_id && b.name == name))
    }

    async fn insert_badge(&self, record: &BadgeRecord) -> Result<bool, StoreError> {
        let mut badges = self.badges.write().await;

        // Uniqueness check under the write lock, like the unique index
        if badges
            .iter()
            .any(|b| b.user_id == record.user_id && b.name == record.name)
        {
            return Ok(false);
        }

        badges.push(record.clone());
        Ok(true)
    }

    async fn badges_for_user(&self, user_id: &str) -> Result<Vec<BadgeRecord>, StoreError> {
        Ok(self.badges_for(user_id).await)
    }

    async fn set_class_tag(&self, user_id: &str, tag: ClassTag) -> Result<(), StoreError> {
        if let Some(stats) = self.users.write().await.get_mut(user_id) {
            stats.class_tag = Some(tag);
        }
        Ok(())
    }

    async fn increment_rank_score(&self, user_id: &str, delta: i64) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        match users.get_mut(user_id) {
            Some(stats) => stats.rank_score += delta,
            None => debug!(user_id = %user_id, delta, "rank score update matched no user"),
        }
        Ok(())
    }
}

#[async_trait]
impl ActivityCounts for MemoryStore {
    async fn reviews_with_min_upvotes(
        &self,
        user_id: &str,
        min_upvotes: i64,
    ) -> Result<i64, StoreError> {
        Ok(self
            .reviews
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id && r.upvotes >= min_upvotes)
            .count() as i64)
    }

    async fn progress_with_min_streak(
        &self,
        user_id: &str,
        min_days: i64,
    ) -> Result<i64, StoreError> {
        Ok(self
            .progress
            .read()
            .await
            .iter()
            .filter(|p| p.user_id == user_id && p.streak_days >= min_days)
            .count() as i64)
    }

    async fn progress_updated_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        Ok(self
            .progress
            .read()
            .await
            .iter()
            .filter(|p| p.user_id == user_id && p.last_updated >= since)
            .count() as i64)
    }

    async fn quotes_total(&self, user_id: &str) -> Result<i64, StoreError> {
        Ok(self
            .quotes
            .read()
            .await
            .iter()
            .filter(|q| q.user_id == user_id)
            .count() as i64)
    }

    async fn quotes_with_min_upvotes(
        &self,
        user_id: &str,
        min_upvotes: i64,
    ) -> Result<i64, StoreError> {
        Ok(self
            .quotes
            .read()
            .await
            .iter()
            .filter(|q| q.user_id == user_id && q.upvotes >= min_upvotes)
            .count() as i64)
    }
}
