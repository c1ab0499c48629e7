//! Persistence for the Reputation Engine
//!
//! `PgStore` is the production implementation over PostgreSQL; the badge
//! table carries a unique (user_id, name) index so concurrent duplicate
//! grants collapse into a harmless conflict. `MemoryStore` backs the
//! `postgres_enabled = false` fallback and the test suite.

pub mod memory;
pub mod pool;
pub mod postgres;

pub use memory::MemoryStore;
pub use pool::DatabasePool;
pub use postgres::PgStore;
