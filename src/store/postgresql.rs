//! PostgreSQL result store
//!
//! Records go to a single JSONB table created by
//! `migrations/001_detection_results.sql`.

use super::traits::{DetectionRecord, ResultStore};
use crate::config::StoreConfig;
use crate::domain::{DocmaskError, Result};
use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::NoTls;

const INSERT_RECORD: &str = "INSERT INTO detection_results \
    (id, file_identifier, raw_content, pattern_detection_results, external_detection_results, created_at) \
    VALUES ($1, $2, $3, $4, $5, $6)";

/// Pooled PostgreSQL store
pub struct PostgresResultStore {
    pool: Pool,
    statement_timeout_seconds: u64,
}

impl PostgresResultStore {
    /// Create the pool
    ///
    /// No connection is made until the first query.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is missing or invalid.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let connection_string = config.connection_string.as_ref().ok_or_else(|| {
            DocmaskError::Configuration("store.connection_string is not set".to_string())
        })?;

        let pg_config: tokio_postgres::Config = connection_string
            .expose_secret()
            .as_ref()
            .parse()
            .map_err(|e| {
                DocmaskError::Configuration(format!("Invalid PostgreSQL connection string: {}", e))
            })?;

        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );

        let timeout = Some(Duration::from_secs(config.connection_timeout_seconds));
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .wait_timeout(timeout)
            .create_timeout(timeout)
            .recycle_timeout(timeout)
            .runtime(deadpool_postgres::Runtime::Tokio1)
            .build()
            .map_err(|e| DocmaskError::Store(format!("Failed to create connection pool: {}", e)))?;

        Ok(Self {
            pool,
            statement_timeout_seconds: config.statement_timeout_seconds,
        })
    }

    async fn connection(&self) -> Result<deadpool_postgres::Object> {
        let client = self.pool.get().await.map_err(|e| {
            DocmaskError::Store(format!("Failed to get connection from pool: {}", e))
        })?;

        client
            .batch_execute(&format!(
                "SET statement_timeout = {}",
                self.statement_timeout_seconds * 1000
            ))
            .await
            .map_err(|e| DocmaskError::Store(format!("Failed to set statement timeout: {}", e)))?;

        Ok(client)
    }

    /// Create the table and indexes if they do not exist
    pub async fn ensure_schema(&self) -> Result<()> {
        let client = self.connection().await?;
        let migration_sql = include_str!("../../migrations/001_detection_results.sql");

        client
            .batch_execute(migration_sql)
            .await
            .map_err(|e| DocmaskError::Store(format!("Failed to execute migration: {}", e)))?;

        tracing::info!("PostgreSQL schema initialized");
        Ok(())
    }
}

#[async_trait]
impl ResultStore for PostgresResultStore {
    async fn save(&self, record: &DetectionRecord) -> Result<()> {
        let pattern = serde_json::to_value(&record.pattern_detection_results)?;
        let external = serde_json::to_value(&record.external_detection_results)?;

        let client = self.connection().await?;
        client
            .execute(
                INSERT_RECORD,
                &[
                    &record.id,
                    &record.file_identifier,
                    &record.raw_content,
                    &pattern,
                    &external,
                    &record.created_at,
                ],
            )
            .await
            .map_err(|e| DocmaskError::Store(format!("Failed to insert detection record: {}", e)))?;

        tracing::debug!(record_id = %record.id, "Detection record saved to PostgreSQL");
        Ok(())
    }

    async fn test_connection(&self) -> Result<()> {
        let client = self.connection().await?;
        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| DocmaskError::Store(format!("Connection test failed: {}", e)))?;
        Ok(())
    }

    fn name(&self) -> &str {
        "postgresql"
    }
}
