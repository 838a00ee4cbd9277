//! Single-path watch primitive built on `notify`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::error::WatchError;

/// Role of a watched path within the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    /// The top-level directory holding the whole sandbox collection.
    Root,
    /// One immediate subdirectory of the root.
    Child,
}

/// Typed change notification emitted by a [`WatchTarget`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// The root directory's immediate entries may have changed.
    RootChanged,
    /// Something changed inside one child directory.
    ChildChanged { path: PathBuf },
}

/// A non-recursive native watch on a single directory.
///
/// Change notifications are forwarded onto the shared event channel from
/// the notify backend's thread. The liveness flag is cleared by [`stop`]
/// *before* the native watcher is released, so no event is forwarded
/// after `stop` returns.
///
/// [`stop`]: WatchTarget::stop
pub struct WatchTarget {
    path: PathBuf,
    mode: WatchMode,
    live: Arc<AtomicBool>,
    watcher: Option<RecommendedWatcher>,
}

impl std::fmt::Debug for WatchTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchTarget")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("live", &self.live)
            .field("watcher", &self.watcher.is_some())
            .finish()
    }
}

impl WatchTarget {
    /// Start watching `path`, forwarding change notifications to `tx`.
    ///
    /// Fails if the path is missing, is not a directory, or the native
    /// watch resource cannot be acquired. The error variant matches the
    /// requested mode so callers can propagate root failures and skip
    /// child failures.
    pub fn start(
        path: &Path,
        mode: WatchMode,
        tx: mpsc::Sender<WatchEvent>,
    ) -> Result<Self, WatchError> {
        if !path.is_dir() {
            return Err(start_error(path, mode, "not a directory"));
        }

        let live = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&live);
        let event = match mode {
            WatchMode::Root => WatchEvent::RootChanged,
            WatchMode::Child => WatchEvent::ChildChanged {
                path: path.to_path_buf(),
            },
        };
        let watched = path.to_path_buf();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            if !flag.load(Ordering::SeqCst) {
                return;
            }
            match res {
                // Any event on a watched directory means "something
                // changed"; coalescing is the debounce gate's job.
                Ok(_) => {
                    let _ = tx.blocking_send(event.clone());
                }
                Err(e) => {
                    tracing::error!("[watcher] event stream error on {}: {e}", watched.display());
                }
            }
        })
        .map_err(|e| start_error(path, mode, &e.to_string()))?;

        watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|e| start_error(path, mode, &e.to_string()))?;

        Ok(Self {
            path: path.to_path_buf(),
            mode,
            live,
            watcher: Some(watcher),
        })
    }

    /// The watched path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Role this target plays in the tree.
    pub fn mode(&self) -> WatchMode {
        self.mode
    }

    /// True until [`stop`](WatchTarget::stop) runs.
    pub fn is_live(&self) -> bool {
        self.watcher.is_some()
    }

    /// Stop delivering notifications.
    ///
    /// Idempotent. Native unwatch failures (the directory may already be
    /// gone from disk) are logged and swallowed.
    pub fn stop(&mut self) {
        self.live.store(false, Ordering::SeqCst);
        if let Some(mut watcher) = self.watcher.take() {
            if let Err(e) = watcher.unwatch(&self.path) {
                crate::debug_event!("watcher", "unwatch failed", "{}: {e}", self.path.display());
            }
        }
    }
}

impl Drop for WatchTarget {
    fn drop(&mut self) {
        self.stop();
    }
}

fn start_error(path: &Path, mode: WatchMode, reason: &str) -> WatchError {
    let path = path.to_path_buf();
    let reason = reason.to_string();
    match mode {
        WatchMode::Root => WatchError::RootWatch { path, reason },
        WatchMode::Child => WatchError::ChildWatch { path, reason },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    use tempfile::TempDir;
    use tokio::time::timeout;

    #[tokio::test]
    async fn start_on_directory_succeeds() {
        let tmp = TempDir::new().unwrap();
        let (tx, _rx) = mpsc::channel(16);

        let target = WatchTarget::start(tmp.path(), WatchMode::Root, tx).unwrap();
        assert!(target.is_live());
        assert_eq!(target.mode(), WatchMode::Root);
        assert_eq!(target.path(), tmp.path());
    }

    #[tokio::test]
    async fn start_on_missing_path_fails_with_path() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("gone");
        let (tx, _rx) = mpsc::channel(16);

        let err = WatchTarget::start(&missing, WatchMode::Root, tx).unwrap_err();
        assert!(matches!(err, WatchError::RootWatch { .. }));
        assert_eq!(err.path(), Some(&missing));
    }

    #[tokio::test]
    async fn start_on_file_fails_in_child_mode() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        let (tx, _rx) = mpsc::channel(16);

        let err = WatchTarget::start(&file, WatchMode::Child, tx).unwrap_err();
        assert!(matches!(err, WatchError::ChildWatch { .. }));
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let (tx, _rx) = mpsc::channel(16);

        let mut target = WatchTarget::start(tmp.path(), WatchMode::Child, tx).unwrap();
        target.stop();
        assert!(!target.is_live());
        target.stop();
        assert!(!target.is_live());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn child_target_reports_its_own_path() {
        let tmp = TempDir::new().unwrap();
        let (tx, mut rx) = mpsc::channel(16);

        let _target = WatchTarget::start(tmp.path(), WatchMode::Child, tx).unwrap();
        fs::write(tmp.path().join("new.txt"), "hello").unwrap();

        let event = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("change notification should arrive")
            .expect("channel open");
        assert_eq!(
            event,
            WatchEvent::ChildChanged {
                path: tmp.path().to_path_buf()
            }
        );
    }
}
