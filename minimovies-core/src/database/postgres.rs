use std::{fmt, sync::Arc, time::Duration};

use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use tracing::info;

use crate::{
    database::infrastructure::postgres::{
        PostgresMovieRepository, PostgresProfileRepository,
        PostgresReviewRepository, PostgresSessionAuthenticator,
        PostgresWatchHistoryRepository,
    },
    error::{CoreError, Result},
};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;

/// Pool sizing for [`PostgresDatabase::connect`].
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// Owns the connection pool and hands out per-port repositories.
#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    settings: PoolSettings,
}

impl fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresDatabase")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .field("max_connections", &self.settings.max_connections)
            .field("min_connections", &self.settings.min_connections)
            .finish()
    }
}

impl PostgresDatabase {
    pub async fn connect(
        connection_string: &str,
        settings: PoolSettings,
    ) -> Result<Self> {
        let connect_options: PgConnectOptions =
            connection_string.parse().map_err(|e| {
                CoreError::Database(format!("Invalid database URL: {}", e))
            })?;

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(settings.acquire_timeout)
            .max_lifetime(Duration::from_secs(1800))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                CoreError::Database(format!(
                    "Database connection failed: {}",
                    e
                ))
            })?;

        info!(
            max_connections = settings.max_connections,
            min_connections = settings.min_connections,
            "database pool initialized"
        );

        Ok(Self { pool, settings })
    }

    /// Wrap an existing pool (used by `sqlx::test`).
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            settings: PoolSettings::default(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded migrations.
    pub async fn migrate(&self) -> Result<()> {
        crate::MIGRATOR.run(&self.pool).await?;
        info!("database migrations applied");
        Ok(())
    }

    pub fn watch_history(&self) -> Arc<PostgresWatchHistoryRepository> {
        Arc::new(PostgresWatchHistoryRepository::new(self.pool.clone()))
    }

    pub fn reviews(&self) -> Arc<PostgresReviewRepository> {
        Arc::new(PostgresReviewRepository::new(self.pool.clone()))
    }

    pub fn profiles(&self) -> Arc<PostgresProfileRepository> {
        Arc::new(PostgresProfileRepository::new(self.pool.clone()))
    }

    pub fn movies(&self) -> Arc<PostgresMovieRepository> {
        Arc::new(PostgresMovieRepository::new(self.pool.clone()))
    }

    pub fn sessions(&self) -> Arc<PostgresSessionAuthenticator> {
        Arc::new(PostgresSessionAuthenticator::new(self.pool.clone()))
    }
}
