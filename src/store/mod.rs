//! Detection result persistence

pub mod jsonl;
pub mod postgresql;
pub mod traits;

pub use jsonl::JsonlResultStore;
pub use postgresql::PostgresResultStore;
pub use traits::{DetectionRecord, NullResultStore, ResultStore};

use crate::config::{StoreBackend, StoreConfig};
use crate::domain::Result;
use std::sync::Arc;

/// Create the store selected by configuration
///
/// # Errors
///
/// Returns an error if the backend cannot be initialised.
pub async fn create_result_store(config: &StoreConfig) -> Result<Arc<dyn ResultStore>> {
    match config.backend {
        StoreBackend::None => Ok(Arc::new(NullResultStore)),
        StoreBackend::Jsonl => {
            tracing::info!(path = %config.path.display(), "Using JSON lines result store");
            Ok(Arc::new(JsonlResultStore::new(config.path.clone())?))
        }
        StoreBackend::PostgreSQL => {
            tracing::info!("Using PostgreSQL result store");
            let store = PostgresResultStore::new(config)?;
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_factory_selects_backend() {
        let store = create_result_store(&StoreConfig::default()).await.unwrap();
        assert_eq!(store.name(), "none");

        let dir = TempDir::new().unwrap();
        let config = StoreConfig {
            backend: StoreBackend::Jsonl,
            path: dir.path().join("results.jsonl"),
            ..Default::default()
        };
        let store = create_result_store(&config).await.unwrap();
        assert_eq!(store.name(), "jsonl");
    }
}
