//! Runtime wiring helpers
//!
//! Builds the configured issue repository so binary crates only depend on
//! `service` for storage selection.

use std::sync::Arc;

use configs::{AppConfig, StorageBackend};
use tracing::info;

use crate::issues::{repo::seaorm::SeaOrmIssueRepository, repository::IssueRepository, IssueService};
use crate::storage::project_store::ProjectFileStore;

/// Open the storage backend selected by `[storage]`.
pub async fn open_repository(cfg: &AppConfig) -> anyhow::Result<Arc<dyn IssueRepository>> {
    match cfg.storage.backend {
        StorageBackend::File => {
            common::env::ensure_data_dir(&cfg.storage.data_dir).await?;
            let store: Arc<dyn IssueRepository> = ProjectFileStore::open(&cfg.storage.data_dir).await?;
            info!(backend = "file", data_dir = %cfg.storage.data_dir.display(), "issue store opened");
            Ok(store)
        }
        StorageBackend::Postgres => {
            let db = models::db::connect_and_migrate(&cfg.database).await?;
            info!(backend = "postgres", "issue store opened");
            Ok(Arc::new(SeaOrmIssueRepository::new(db)))
        }
    }
}

/// Convenience: repository plus the service on top of it.
pub async fn issue_service(cfg: &AppConfig) -> anyhow::Result<IssueService> {
    Ok(IssueService::new(open_repository(cfg).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::filter::IssueFilter;

    #[tokio::test]
    async fn file_backend_from_config() -> Result<(), anyhow::Error> {
        let mut cfg = AppConfig::default();
        let dir = std::env::temp_dir().join(format!("runtime_store_{}", uuid::Uuid::new_v4()));
        cfg.storage.data_dir = dir.clone();
        let repo = open_repository(&cfg).await?;
        assert!(repo.list("nothing", &IssueFilter::default()).await.is_err());
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
