//! Reputation Evaluator - Main Orchestrator
//!
//! Runs one refresh pass for a user: the badge pass over the achievement
//! rule table, the tenure class-tag recomputation, and the rank-score
//! delta for anything newly granted. Persistence is behind the store
//! traits; write failures inside the pass are logged and skipped so a
//! partial failure never aborts the rest of the batch.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::engine::badges::{BadgeRecord, ACHIEVEMENT_BADGES};
use crate::engine::stats::ClassTag;
use crate::engine::{ActivityCounts, EngineError, ReputationStore};

/// Result of one refresh pass, for logging and inspection
#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    /// Names of achievement badges granted in this pass
    pub granted: Vec<&'static str>,
    /// Class tag computed and written in this pass
    pub class_tag: ClassTag,
    /// Score delta applied for newly granted badges (zero when the pass
    /// granted nothing; already-held badges never re-contribute)
    pub badge_delta: i64,
}

/// Main reputation engine
pub struct ReputationEngine<S> {
    store: Arc<S>,
}

impl<S> Clone for ReputationEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> ReputationEngine<S>
where
    S: ReputationStore + ActivityCounts,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Run one full refresh pass for a user
    ///
    /// A missing or malformed user is a hard error; everything past the
    /// stats load is best-effort. Idempotent in grant effect: re-invoking
    /// with unchanged statistics grants nothing and applies a zero delta.
    pub async fn refresh(&self, user_id: &str) -> Result<EvaluationOutcome, EngineError> {
        let stats = self
            .store
            .fetch_user(user_id)
            .await?
            .ok_or_else(|| EngineError::UserNotFound(user_id.to_string()))?;

        if stats.books_read < 0 {
            return Err(EngineError::InvalidStats {
                user_id: user_id.to_string(),
                reason: format!("negative books_read: {}", stats.books_read),
            });
        }

        let mut badge_delta = 0i64;
        let mut granted = Vec::new();

        for def in ACHIEVEMENT_BADGES {
            // Grants are permanent; an existing record skips re-evaluation
            match self.store.badge_exists(user_id, def.name).await {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        user_id = %user_id,
                        badge = def.name,
                        error = %e,
                        "badge lookup failed, skipping"
                    );
                    continue;
                }
            }

            // Read failures fail closed: never grant on ambiguous data
            let met = match def.criterion.is_met(&stats, &*self.store).await {
                Ok(met) => met,
                Err(e) => {
                    warn!(
                        user_id = %user_id,
                        badge = def.name,
                        error = %e,
                        "criterion check failed, treating as not met"
                    );
                    false
                }
            };

            if !met {
                continue;
            }

            let record = BadgeRecord::achievement(user_id, def.name);
            match self.store.insert_badge(&record).await {
                Ok(true) => {
                    badge_delta += def.points;
                    granted.push(def.name);
                    debug!(user_id = %user_id, badge = def.name, points = def.points, "badge granted");
                }
                Ok(false) => {
                    // Concurrent pass granted it first; the unique index
                    // turned the race into a duplicate-key no-op
                    debug!(user_id = %user_id, badge = def.name, "badge already granted");
                }
                Err(e) => {
                    warn!(
                        user_id = %user_id,
                        badge = def.name,
                        error = %e,
                        "failed to persist badge, continuing"
                    );
                }
            }
        }

        let class_tag = ClassTag::from_account_age(stats.created_at, Utc::now());

        // Tier bookkeeping record, independent of achievements; carries no
        // points. Duplicate insert means the tier was already recorded.
        let tag_record = BadgeRecord::class_tag(user_id, class_tag);
        if let Err(e) = self.store.insert_badge(&tag_record).await {
            warn!(
                user_id = %user_id,
                class_tag = %class_tag,
                error = %e,
                "failed to record class-tag badge"
            );
        }

        // Profile tag is overwritten every pass, changed or not
        if let Err(e) = self.store.set_class_tag(user_id, class_tag).await {
            warn!(
                user_id = %user_id,
                class_tag = %class_tag,
                error = %e,
                "failed to write class tag"
            );
        }

        if badge_delta != 0 {
            if let Err(e) = self.store.increment_rank_score(user_id, badge_delta).await {
                warn!(
                    user_id = %user_id,
                    delta = badge_delta,
                    error = %e,
                    "failed to apply badge score delta"
                );
            }
        }

        if !granted.is_empty() {
            info!(
                user_id = %user_id,
                granted = ?granted,
                delta = badge_delta,
                class_tag = %class_tag,
                "reputation refresh granted badges"
            );
        }

        Ok(EvaluationOutcome {
            granted,
            class_tag,
            badge_delta,
        })
    }

    /// Apply a signed score delta for an activity unrelated to badges
    /// (upvotes, completions). Atomic at the storage layer; failure is
    /// surfaced so the caller can log and continue.
    pub async fn apply_score_delta(&self, user_id: &str, delta: i64) -> Result<(), EngineError> {
        self.store
            .increment_rank_score(user_id, delta)
            .await
            .map_err(EngineError::from)
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}
