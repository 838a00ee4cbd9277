//! Watcher wired to the real catalog sink: the snapshot tracks the tree.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::time::sleep;

use simwatch::{CatalogSink, SandboxCatalog, SandboxWatcher};

async fn wait_for_devices(
    catalog: &Arc<tokio::sync::RwLock<SandboxCatalog>>,
    expected: usize,
) {
    for _ in 0..50 {
        if catalog.read().await.device_count() == expected {
            return;
        }
        sleep(Duration::from_millis(100)).await;
    }
    panic!(
        "catalog never reached {expected} devices (has {})",
        catalog.read().await.device_count()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn catalog_follows_the_directory_tree() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("device-a")).unwrap();

    let sink = Arc::new(CatalogSink::new(tmp.path().to_path_buf()));
    let catalog = sink.catalog();

    let mut watcher = SandboxWatcher::builder()
        .root(tmp.path())
        .debounce_ms(150)
        .sink(sink)
        .build()
        .unwrap();
    watcher.start().unwrap();

    // Initial sync picks up the pre-existing device.
    wait_for_devices(&catalog, 1).await;

    fs::create_dir(tmp.path().join("device-b")).unwrap();
    wait_for_devices(&catalog, 2).await;

    fs::remove_dir(tmp.path().join("device-a")).unwrap();
    wait_for_devices(&catalog, 1).await;
    assert_eq!(catalog.read().await.devices[0].name, "device-b");

    watcher.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn app_containers_show_up_in_the_snapshot() {
    let tmp = TempDir::new().unwrap();
    let device = tmp.path().join("device-a");
    fs::create_dir(&device).unwrap();

    let sink = Arc::new(CatalogSink::new(tmp.path().to_path_buf()));
    let catalog = sink.catalog();

    let mut watcher = SandboxWatcher::builder()
        .root(tmp.path())
        .debounce_ms(150)
        .sink(sink)
        .build()
        .unwrap();
    watcher.start().unwrap();
    wait_for_devices(&catalog, 1).await;

    fs::create_dir(device.join("app-container")).unwrap();

    for _ in 0..50 {
        if catalog.read().await.app_count() == 1 {
            break;
        }
        sleep(Duration::from_millis(100)).await;
    }
    let snapshot = catalog.read().await;
    assert_eq!(snapshot.app_count(), 1);
    assert_eq!(snapshot.devices[0].apps[0].name, "app-container");
    drop(snapshot);

    watcher.stop().await;
}
