use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use tracing_subscriber::EnvFilter;

/// Configuration for the reputation engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Database configuration
    pub database: DatabaseConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Event dispatch configuration
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string
    pub postgres_url: String,
    /// Enable PostgreSQL (if false, uses in-memory fallback)
    pub postgres_enabled: bool,
    /// Maximum pool connections
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug)
    pub level: String,
}

/// Configuration for the fire-and-forget event dispatcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Bounded queue capacity; events beyond this are dropped with a warning
    pub queue_capacity: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            postgres_url: "postgresql://localhost:5432/reading_tracker".to_string(),
            postgres_enabled: false,
            max_connections: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            dispatch: DispatchConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = env::var("TRACKER_POSTGRES_URL") {
            config.database.postgres_url = url;
        }

        if let Ok(enabled) = env::var("TRACKER_POSTGRES_ENABLED") {
            config.database.postgres_enabled = enabled
                .parse()
                .context("Invalid TRACKER_POSTGRES_ENABLED value")?;
        }

        if let Ok(max) = env::var("TRACKER_POSTGRES_MAX_CONNECTIONS") {
            config.database.max_connections = max
                .parse()
                .context("Invalid TRACKER_POSTGRES_MAX_CONNECTIONS value")?;
        }

        if let Ok(level) = env::var("TRACKER_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(capacity) = env::var("TRACKER_DISPATCH_QUEUE_CAPACITY") {
            config.dispatch.queue_capacity = capacity
                .parse()
                .context("Invalid TRACKER_DISPATCH_QUEUE_CAPACITY value")?;
        }

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration for consistency
    pub fn validate(&self) -> Result<()> {
        if self.database.postgres_enabled && self.database.postgres_url.is_empty() {
            return Err(anyhow::anyhow!(
                "PostgreSQL is enabled but connection string is empty"
            ));
        }

        if self.database.max_connections == 0 {
            return Err(anyhow::anyhow!("Database pool must allow at least one connection"));
        }

        if self.dispatch.queue_capacity == 0 {
            return Err(anyhow::anyhow!("Dispatch queue capacity must be non-zero"));
        }

        Ok(())
    }
}

/// Initialize tracing with the configured level, honoring `RUST_LOG` overrides
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .context("Invalid log level")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.database.postgres_enabled);
    }

    #[test]
    fn test_zero_queue_capacity_rejected() {
        let mut config = EngineConfig::default();
        config.dispatch.queue_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_postgres_url_rejected_when_enabled() {
        let mut config = EngineConfig::default();
        config.database.postgres_enabled = true;
        config.database.postgres_url = String::new();
        assert!(config.validate().is_err());
    }
}
