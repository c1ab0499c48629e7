//! Reading Tracker Reputation Engine
//!
//! Evaluates badge-eligibility rules against a user's reading statistics,
//! persists newly-earned badges, computes a tenure-based class tag, and
//! applies score deltas to the user's rank counter. Invoked from the
//! backend's request handlers via fire-and-forget event dispatch so that
//! gamification latency and failures never block the primary action.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs         - Crate root with re-exports
//! ├── config.rs      - Configuration management & logging init
//! ├── engine/        - Reputation engine
//! │   ├── stats.rs      - User statistics snapshot & class-tag tiers
//! │   ├── badges.rs     - Declarative badge definition table
//! │   ├── evaluator.rs  - Badge pass, class-tag write, score delta
//! │   └── events.rs     - Activity events & async dispatcher
//! └── storage/       - Persistence behind the engine's store traits
//!     ├── pool.rs       - PostgreSQL connection pool & schema bootstrap
//!     ├── postgres.rs   - PgStore (production)
//!     └── memory.rs     - MemoryStore (fallback & tests)
//! ```

pub mod config;
pub mod engine;
pub mod storage;

// Re-export main types for convenience
pub use config::{init_logging, DatabaseConfig, DispatchConfig, EngineConfig, LoggingConfig};
pub use engine::badges::{
    BadgeCategory, BadgeDefinition, BadgeRecord, Criterion, ACHIEVEMENT_BADGES,
};
pub use engine::evaluator::{EvaluationOutcome, ReputationEngine};
pub use engine::events::{ActivityEvent, ActivityKind, EventDispatcher};
pub use engine::stats::{ClassTag, UserStats};
pub use engine::{ActivityCounts, EngineError, ReputationStore, StoreError};
pub use storage::memory::MemoryStore;
pub use storage::pool::DatabasePool;
pub use storage::postgres::PgStore;
