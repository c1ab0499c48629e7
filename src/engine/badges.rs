//! Badge Definitions & Records
//!
//! The achievement rule set is a fixed compiled-in table of
//! (name, points, criterion). Rules are independent; order carries no
//! priority. Each criterion is declarative data evaluated against the
//! user's statistics and the activity-count capability, so every rule is
//! unit-testable against synthetic inputs.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::stats::{ClassTag, UserStats};
use crate::engine::{ActivityCounts, StoreError};

/// Category of a persisted badge record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BadgeCategory {
    /// Permanent achievement, granted once when its criterion is met
    #[serde(rename = "achievement")]
    Achievement,
    /// Bookkeeping record for a tenure tier the user has reached
    #[serde(rename = "class-tag")]
    ClassTag,
}

impl BadgeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeCategory::Achievement => "achievement",
            BadgeCategory::ClassTag => "class-tag",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "achievement" => Some(BadgeCategory::Achievement),
            "class-tag" => Some(BadgeCategory::ClassTag),
            _ => None,
        }
    }
}

/// A persisted badge grant: at most one per (user, name)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeRecord {
    pub user_id: String,
    pub name: String,
    pub category: BadgeCategory,
    pub description: String,
    pub granted_at: DateTime<Utc>,
}

impl BadgeRecord {
    pub fn achievement(user_id: &str, name: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            name: name.to_string(),
            category: BadgeCategory::Achievement,
            description: format!("Earned the {} badge!", name),
            granted_at: Utc::now(),
        }
    }

    pub fn class_tag(user_id: &str, tag: ClassTag) -> Self {
        Self {
            user_id: user_id.to_string(),
            name: tag.as_str().to_string(),
            category: BadgeCategory::ClassTag,
            description: format!("Earned the {} badge!", tag.as_str()),
            granted_at: Utc::now(),
        }
    }
}

/// Declarative eligibility criterion for an achievement badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Criterion {
    /// `books_read >= min`
    BooksRead { min: i64 },
    /// At least one reading-progress record with a streak of `min_days`
    ProgressStreak { min_days: i64 },
    /// At least one reading-progress record updated in the trailing window
    ProgressRecency { within_hours: i64 },
    /// At least `min_count` reviews each with `min_upvotes` upvotes
    ReviewUpvotes { min_upvotes: i64, min_count: i64 },
    /// At least `min_count` quotes authored
    QuotesAuthored { min_count: i64 },
    /// At least one quote with `min_upvotes` upvotes
    QuoteUpvotes { min_upvotes: i64 },
}

impl Criterion {
    /// Evaluate the criterion against the user's statistics and activity
    /// counts. Count-query failures propagate so the caller can fail closed.
    pub async fn is_met<A>(&self, stats: &UserStats, activity: &A) -> Result<bool, StoreError>
    where
        A: ActivityCounts + ?Sized,
    {
        match *self {
            Criterion::BooksRead { min } => Ok(stats.books_read >= min),
            Criterion::ProgressStreak { min_days } => {
                let count = activity
                    .progress_with_min_streak(&stats.user_id, min_days)
                    .await?;
                Ok(count > 0)
            }
            Criterion::ProgressRecency { within_hours } => {
                let since = Utc::now() - Duration::hours(within_hours);
                let count = activity.progress_updated_since(&stats.user_id, since).await?;
                Ok(count > 0)
            }
            Criterion::ReviewUpvotes {
                min_upvotes,
                min_count,
            } => {
                let count = activity
                    .reviews_with_min_upvotes(&stats.user_id, min_upvotes)
                    .await?;
                Ok(count >= min_count)
            }
            Criterion::QuotesAuthored { min_count } => {
                let count = activity.quotes_total(&stats.user_id).await?;
                Ok(count >= min_count)
            }
            Criterion::QuoteUpvotes { min_upvotes } => {
                let count = activity
                    .quotes_with_min_upvotes(&stats.user_id, min_upvotes)
                    .await?;
                Ok(count > 0)
            }
        }
    }
}

/// One row of the achievement rule table
#[derive(Debug, Clone, Copy)]
pub struct BadgeDefinition {
    /// Unique badge name
    pub name: &'static str,
    /// Points credited once, at grant time
    pub points: i64,
    /// Eligibility criterion
    pub criterion: Criterion,
}

/// The fixed achievement rule set
pub const ACHIEVEMENT_BADGES: &[BadgeDefinition] = &[
    BadgeDefinition {
        name: "Book Worm",
        points: 3,
        criterion: Criterion::BooksRead { min: 4 },
    },
    BadgeDefinition {
        name: "Marathon Reader",
        points: 5,
        criterion: Criterion::BooksRead { min: 8 },
    },
    BadgeDefinition {
        name: "Page Turner",
        points: 2,
        criterion: Criterion::BooksRead { min: 5 },
    },
    BadgeDefinition {
        name: "Streak Keeper",
        points: 4,
        criterion: Criterion::ProgressStreak { min_days: 7 },
    },
    BadgeDefinition {
        name: "Upvoted Author",
        points: 3,
        criterion: Criterion::ReviewUpvotes {
            min_upvotes: 5,
            min_count: 1,
        },
    },
    BadgeDefinition {
        name: "Community Helper",
        points: 3,
        criterion: Criterion::ReviewUpvotes {
            min_upvotes: 1,
            min_count: 3,
        },
    },
    BadgeDefinition {
        name: "Daily Reader",
        points: 2,
        criterion: Criterion::ProgressRecency { within_hours: 24 },
    },
    BadgeDefinition {
        name: "Quote Contributor",
        points: 3,
        criterion: Criterion::QuotesAuthored { min_count: 1 },
    },
    BadgeDefinition {
        name: "Popular Quote",
        points: 5,
        criterion: Criterion::QuoteUpvotes { min_upvotes: 10 },
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_badge_names_are_unique() {
        let names: HashSet<_> = ACHIEVEMENT_BADGES.iter().map(|b| b.name).collect();
        assert_eq!(names.len(), ACHIEVEMENT_BADGES.len());
    }

    #[test]
    fn test_rule_table_points() {
        let points = |name: &str| {
            ACHIEVEMENT_BADGES
                .iter()
                .find(|b| b.name == name)
                .map(|b| b.points)
                .unwrap()
        };
        assert_eq!(points("Book Worm"), 3);
        assert_eq!(points("Page Turner"), 2);
        assert_eq!(points("Marathon Reader"), 5);
        assert_eq!(points("Streak Keeper"), 4);
        assert_eq!(points("Daily Reader"), 2);
        assert_eq!(points("Upvoted Author"), 3);
        assert_eq!(points("Community Helper"), 3);
        assert_eq!(points("Quote Contributor"), 3);
        assert_eq!(points("Popular Quote"), 5);
    }

    #[test]
    fn test_record_constructors() {
        let record = BadgeRecord::achievement("user_1", "Book Worm");
        assert_eq!(record.category, BadgeCategory::Achievement);
        assert_eq!(record.description, "Earned the Book Worm badge!");

        let record = BadgeRecord::class_tag("user_1", ClassTag::Casual);
        assert_eq!(record.category, BadgeCategory::ClassTag);
        assert_eq!(record.name, "Casual");
    }

    #[test]
    fn test_category_strings() {
        assert_eq!(BadgeCategory::Achievement.as_str(), "achievement");
        assert_eq!(BadgeCategory::ClassTag.as_str(), "class-tag");
        assert_eq!(
            BadgeCategory::parse("class-tag"),
            Some(BadgeCategory::ClassTag)
        );
        assert_eq!(BadgeCategory::parse("unknown"), None);
    }
}
