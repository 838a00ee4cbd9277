//! Reload sink that keeps a shared catalog snapshot fresh.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::watcher::ReloadSink;

use super::SandboxCatalog;

/// Rebuilds the [`SandboxCatalog`] whenever the debounce window elapses.
///
/// Readers hold the shared handle from [`catalog`](CatalogSink::catalog)
/// and always see the last successfully built snapshot; a failed rebuild
/// leaves it standing.
pub struct CatalogSink {
    root: PathBuf,
    catalog: Arc<RwLock<SandboxCatalog>>,
}

impl CatalogSink {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            catalog: Arc::new(RwLock::new(SandboxCatalog::default())),
        }
    }

    /// Shared handle to the latest snapshot.
    pub fn catalog(&self) -> Arc<RwLock<SandboxCatalog>> {
        Arc::clone(&self.catalog)
    }
}

#[async_trait]
impl ReloadSink for CatalogSink {
    fn name(&self) -> &str {
        "catalog"
    }

    async fn reload(&self) {
        match SandboxCatalog::scan(&self.root) {
            Ok(fresh) => {
                let devices = fresh.device_count();
                let apps = fresh.app_count();
                *self.catalog.write().await = fresh;
                crate::log_event!("catalog", "rebuilt", "{devices} devices, {apps} apps");
            }
            Err(e) => {
                tracing::warn!("[catalog] rebuild failed, keeping previous snapshot: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use tempfile::TempDir;

    #[tokio::test]
    async fn reload_swaps_in_a_fresh_snapshot() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("device-a")).unwrap();

        let sink = CatalogSink::new(tmp.path().to_path_buf());
        let catalog = sink.catalog();
        assert_eq!(catalog.read().await.device_count(), 0);

        sink.reload().await;
        assert_eq!(catalog.read().await.device_count(), 1);

        fs::create_dir(tmp.path().join("device-b")).unwrap();
        sink.reload().await;
        assert_eq!(catalog.read().await.device_count(), 2);
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_snapshot() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::create_dir(root.join("device-a")).unwrap();

        let sink = CatalogSink::new(root.clone());
        sink.reload().await;
        assert_eq!(sink.catalog().read().await.device_count(), 1);

        fs::remove_dir_all(&root).unwrap();
        sink.reload().await;
        assert_eq!(
            sink.catalog().read().await.device_count(),
            1,
            "stale snapshot stands until a successful rebuild"
        );
    }
}
