//! Reputation Engine for Reader Gamification
//!
//! Consumes a user's statistics snapshot plus activity counts, and produces
//! badge grants, a class-tag assignment, and rank-score deltas.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐     ┌─────────────────┐
//! │ ActivityEvent    │────►│ ReputationEngine │◄────│ BadgeDefinition │
//! │ (fire-and-forget)│     │ (orchestrator)   │     │ (static table)  │
//! └──────────────────┘     └──────────────────┘     └─────────────────┘
//!                                   │
//!                                   ▼
//!                          ┌──────────────────┐
//!                          │ ReputationStore  │
//!                          │ ActivityCounts   │
//!                          │ (storage seam)   │
//!                          └──────────────────┘
//! ```
//!
//! ## Score Model
//!
//! - Rank score is a signed accumulator, changed only through additive
//!   deltas (atomic at the storage layer, no floor or ceiling)
//! - Achievement badges credit their points exactly once, at grant time
//! - Class tags are recomputed from account tenure on every pass and
//!   overwrite the previous value; they carry no points
//! - Gamification is best-effort: a failed badge insert or score write is
//!   logged and never fails the action that triggered it

pub mod badges;
pub mod evaluator;
pub mod events;
pub mod stats;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use badges::BadgeRecord;
use stats::{ClassTag, UserStats};

pub use badges::{BadgeCategory, BadgeDefinition, Criterion, ACHIEVEMENT_BADGES};
pub use evaluator::{EvaluationOutcome, ReputationEngine};
pub use events::{ActivityEvent, ActivityKind, EventDispatcher};

/// Storage failure surfaced by a store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Hard failures of an engine invocation
///
/// Criterion reads failing closed and swallowed write failures are logged
/// inside the pass instead of surfacing here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("user {0} not found")]
    UserNotFound(String),

    #[error("invalid statistics for user {user_id}: {reason}")]
    InvalidStats { user_id: String, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Persistence seam for the engine's output effects and user lookups
#[async_trait]
pub trait ReputationStore: Send + Sync {
    /// Fetch the statistics snapshot for a user
    async fn fetch_user(&self, user_id: &str) -> Result<Option<UserStats>, StoreError>;

    /// Whether a badge record exists for (user, name)
    async fn badge_exists(&self, user_id: &str, name: &str) -> Result<bool, StoreError>;

    /// Insert a badge record. Returns `false` when a record for
    /// (user, name) was already present; uniqueness is enforced by the
    /// store so concurrent duplicate grants collapse into one.
    async fn insert_badge(&self, record: &BadgeRecord) -> Result<bool, StoreError>;

    /// All badge records held by a user
    async fn badges_for_user(&self, user_id: &str) -> Result<Vec<BadgeRecord>, StoreError>;

    /// Overwrite the user's profile class tag
    async fn set_class_tag(&self, user_id: &str, tag: ClassTag) -> Result<(), StoreError>;

    /// Atomically add `delta` to the user's rank score. Must be a single
    /// additive update, never an application-level read-modify-write.
    async fn increment_rank_score(&self, user_id: &str, delta: i64) -> Result<(), StoreError>;
}

/// Count capability over activity collections, consumed by badge criteria
#[async_trait]
pub trait ActivityCounts: Send + Sync {
    /// Reviews by the user with at least `min_upvotes` upvotes
    async fn reviews_with_min_upvotes(
        &self,
        user_id: &str,
        min_upvotes: i64,
    ) -> Result<i64, StoreError>;

    /// Reading-progress records by the user with a streak of at least
    /// `min_days` days
    async fn progress_with_min_streak(
        &self,
        user_id: &str,
        min_days: i64,
    ) -> Result<i64, StoreError>;

    /// Reading-progress records by the user last updated at or after `since`
    async fn progress_updated_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError>;

    /// Quotes authored by the user
    async fn quotes_total(&self, user_id: &str) -> Result<i64, StoreError>;

    /// Quotes by the user with at least `min_upvotes` upvotes
    async fn quotes_with_min_upvotes(
        &self,
        user_id: &str,
        min_upvotes: i64,
    ) -> Result<i64, StoreError>;
}
