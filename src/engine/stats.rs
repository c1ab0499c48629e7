//! User Statistics Snapshot & Class-Tag Tiers
//!
//! `UserStats` is owned by the account subsystem; the engine reads it and
//! only writes back through rank-score deltas and the class-tag overwrite.
//! Class tags are a pure function of account tenure, measured in literal
//! 30-day months.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Read-only statistics snapshot for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: String,

    /// Books the user has finished
    pub books_read: i64,

    /// Accumulating reputation counter (signed, no floor)
    pub rank_score: i64,

    /// Current tenure tier, if one has been assigned yet
    pub class_tag: Option<ClassTag>,

    /// Account creation time
    pub created_at: DateTime<Utc>,
}

impl UserStats {
    pub fn new(user_id: String, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            books_read: 0,
            rank_score: 0,
            class_tag: None,
            created_at,
        }
    }

    /// Account age at `now`
    pub fn account_age(&self, now: DateTime<Utc>) -> Duration {
        now - self.created_at
    }
}

/// Tenure-derived tier, overwritten on every recomputation
///
/// Exactly one tag is active per user at any time. Boundaries are half-open
/// intervals over 30-day months: `[0, 30)` Beginner, `[30, 90)` Casual,
/// `[90, 300)` Regular, `[300, 360)` Dedicated, `[360, ∞)` Family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassTag {
    Beginner,
    Casual,
    Regular,
    Dedicated,
    Family,
}

impl ClassTag {
    /// Classify an account by its age at `now`
    pub fn from_account_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let age = now - created_at;

        if age < Duration::days(30) {
            ClassTag::Beginner
        } else if age < Duration::days(3 * 30) {
            ClassTag::Casual
        } else if age < Duration::days(10 * 30) {
            ClassTag::Regular
        } else if age < Duration::days(12 * 30) {
            ClassTag::Dedicated
        } else {
            ClassTag::Family
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassTag::Beginner => "Beginner",
            ClassTag::Casual => "Casual",
            ClassTag::Regular => "Regular",
            ClassTag::Dedicated => "Dedicated",
            ClassTag::Family => "Family",
        }
    }

    /// Parse a stored tag value; unknown strings map to `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Beginner" => Some(ClassTag::Beginner),
            "Casual" => Some(ClassTag::Casual),
            "Regular" => Some(ClassTag::Regular),
            "Dedicated" => Some(ClassTag::Dedicated),
            "Family" => Some(ClassTag::Family),
            _ => None,
        }
    }
}

impl std::fmt::Display for ClassTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
