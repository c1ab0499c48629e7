//! Database Connection Pool using sqlx

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::engine::StoreError;
use crate::storage::postgres::PgStore;

pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.postgres_url)
            .await?;

        info!("Connected to PostgreSQL");

        Ok(Self { pool })
    }

    /// Create the badge table and its uniqueness guard
    ///
    /// The users, reviews, reading_progress, and quotes tables are owned
    /// by the backend's account and catalog subsystems; this engine only
    /// reads them and owns nothing but badges.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        info!("Initializing reputation schema...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS badges (
                id BIGSERIAL PRIMARY KEY,
                user_id VARCHAR(255) NOT NULL,
                name VARCHAR(255) NOT NULL,
                category VARCHAR(50) NOT NULL,
                description TEXT NOT NULL,
                granted_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        // The concurrency guard: a racing duplicate grant becomes a
        // conflict no-op instead of a second row
        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_badges_user_name ON badges(user_id, name)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_badges_user ON badges(user_id)")
            .execute(&self.pool)
            .await?;

        info!("Reputation schema initialized");
        Ok(())
    }

    pub fn store(&self) -> PgStore {
        PgStore::new(self.pool.clone())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
