//! `simwatch watch`: run the watcher until interrupted.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::catalog::CatalogSink;
use crate::config::Settings;
use crate::log_event;
use crate::watcher::SandboxWatcher;

pub async fn run(
    settings: &Settings,
    root: Option<PathBuf>,
    debounce_ms: Option<u64>,
) -> Result<()> {
    let root = root.unwrap_or_else(|| settings.root_path.clone());
    let debounce_ms = debounce_ms.unwrap_or(settings.watcher.debounce_ms);

    let sink = Arc::new(CatalogSink::new(root.clone()));
    let catalog = sink.catalog();

    let mut watcher = SandboxWatcher::builder()
        .root(&root)
        .debounce_ms(debounce_ms)
        .channel_capacity(settings.watcher.channel_capacity)
        .sink(sink)
        .build()?;

    watcher
        .start()
        .with_context(|| format!("cannot watch {}", root.display()))?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    watcher.stop().await;

    let catalog = catalog.read().await;
    log_event!(
        "simwatch",
        "exiting",
        "{} devices, {} apps in the last snapshot",
        catalog.device_count(),
        catalog.app_count()
    );
    Ok(())
}
