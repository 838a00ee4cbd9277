//! Watcher tree lifecycle: one root watch plus one watch per immediate
//! subdirectory, rebuilt wholesale on every root-level change.
//!
//! All tree mutation happens inside a single driver task that consumes
//! the event channel, so re-enumerations are serialized by construction
//! and a child notification arriving mid-rebuild simply queues behind it.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

use super::debounce::DebounceGate;
use super::error::WatchError;
use super::sink::ReloadSink;
use super::target::{WatchEvent, WatchMode, WatchTarget};

/// Where a [`SandboxWatcher`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchStatus {
    Unstarted,
    Running,
    Stopped,
}

enum WatchState {
    Unstarted,
    Running {
        shutdown_tx: mpsc::Sender<()>,
        driver: JoinHandle<()>,
    },
    Stopped,
}

/// Owns the watcher tree for one sandbox root.
///
/// Construct via [`SandboxWatcher::builder`]. `start` establishes the
/// root watch, enumerates children once (as if a root change had just
/// occurred) and arms one initial reload; afterwards the driver task
/// keeps the tree and the debounce gate in sync with incoming events.
pub struct SandboxWatcher {
    root: PathBuf,
    delay: Duration,
    channel_capacity: usize,
    sink: Arc<dyn ReloadSink>,
    state: WatchState,
}

impl std::fmt::Debug for SandboxWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SandboxWatcher")
            .field("root", &self.root)
            .field("delay", &self.delay)
            .field("channel_capacity", &self.channel_capacity)
            .field("status", &self.status())
            .finish()
    }
}

impl SandboxWatcher {
    /// Create a builder for configuring the watcher.
    pub fn builder() -> SandboxWatcherBuilder {
        SandboxWatcherBuilder::new()
    }

    /// The watched sandbox root.
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Current lifecycle state.
    pub fn status(&self) -> WatchStatus {
        match self.state {
            WatchState::Unstarted => WatchStatus::Unstarted,
            WatchState::Running { .. } => WatchStatus::Running,
            WatchState::Stopped => WatchStatus::Stopped,
        }
    }

    /// Begin watching.
    ///
    /// Fails only if the root watch cannot be established; that error is
    /// the caller's to retry (see [`restart`](SandboxWatcher::restart)).
    /// Child-level failures are contained and logged. Calling on an
    /// already-running watcher is a no-op. Must be called from within a
    /// tokio runtime.
    pub fn start(&mut self) -> Result<(), WatchError> {
        if matches!(self.state, WatchState::Running { .. }) {
            return Ok(());
        }

        let (event_tx, event_rx) = mpsc::channel(self.channel_capacity);
        let root = WatchTarget::start(&self.root, WatchMode::Root, event_tx.clone())?;
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let mut driver = TreeDriver {
            root_path: self.root.clone(),
            root,
            children: Vec::new(),
            event_tx,
            event_rx,
            shutdown_rx,
            gate: DebounceGate::new(self.delay),
            sink: Arc::clone(&self.sink),
        };

        // Initial sync: the tree starts consistent without waiting for
        // the first real notification.
        driver.rebuild_children();
        driver.schedule_reload();

        let driver = tokio::spawn(driver.run());
        self.state = WatchState::Running {
            shutdown_tx,
            driver,
        };

        crate::log_event!("watcher", "started", "{}", self.root.display());
        Ok(())
    }

    /// Stop the tree: root and child watches are released and any pending
    /// reload is cancelled. Idempotent; a no-op on an unstarted watcher.
    pub async fn stop(&mut self) {
        match std::mem::replace(&mut self.state, WatchState::Stopped) {
            WatchState::Running {
                shutdown_tx,
                driver,
            } => {
                // The driver may already be gone; either way it winds
                // down through its teardown path.
                let _ = shutdown_tx.send(()).await;
                if let Err(e) = driver.await {
                    tracing::warn!("[watcher] driver task ended abnormally: {e}");
                }
                crate::log_event!("watcher", "stopped", "{}", self.root.display());
            }
            state => self.state = state,
        }
    }

    /// `stop` followed by a fresh `start`, producing a new tree.
    pub async fn restart(&mut self) -> Result<(), WatchError> {
        self.stop().await;
        self.start()
    }
}

/// Builder for a [`SandboxWatcher`].
pub struct SandboxWatcherBuilder {
    root: Option<PathBuf>,
    delay: Duration,
    channel_capacity: usize,
    sink: Option<Arc<dyn ReloadSink>>,
}

impl SandboxWatcherBuilder {
    pub fn new() -> Self {
        Self {
            root: None,
            delay: Duration::from_millis(1000),
            channel_capacity: 100,
            sink: None,
        }
    }

    /// Sandbox root to watch.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Quiet period before a reload fires, in milliseconds.
    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }

    /// Event channel capacity.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Sink invoked when the debounce window elapses.
    pub fn sink(mut self, sink: Arc<dyn ReloadSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn build(self) -> Result<SandboxWatcher, WatchError> {
        let root = self.root.ok_or_else(|| WatchError::InitFailed {
            reason: "root path is required".to_string(),
        })?;
        let sink = self.sink.ok_or_else(|| WatchError::InitFailed {
            reason: "reload sink is required".to_string(),
        })?;

        Ok(SandboxWatcher {
            root,
            delay: self.delay,
            channel_capacity: self.channel_capacity,
            sink,
            state: WatchState::Unstarted,
        })
    }
}

impl Default for SandboxWatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the live tree state. Runs until shutdown is signalled or every
/// event sender is gone.
struct TreeDriver {
    root_path: PathBuf,
    root: WatchTarget,
    children: Vec<WatchTarget>,
    event_tx: mpsc::Sender<WatchEvent>,
    event_rx: mpsc::Receiver<WatchEvent>,
    shutdown_rx: mpsc::Receiver<()>,
    gate: DebounceGate,
    sink: Arc<dyn ReloadSink>,
}

impl TreeDriver {
    async fn run(mut self) {
        loop {
            tokio::select! {
                _ = self.shutdown_rx.recv() => break,

                event = self.event_rx.recv() => match event {
                    Some(WatchEvent::RootChanged) => {
                        crate::debug_event!("watcher", "root changed", "{}", self.root_path.display());
                        self.rebuild_children();
                        // A device appearing or disappearing is itself
                        // reload-worthy, not just a topology change.
                        self.schedule_reload();
                    }
                    Some(WatchEvent::ChildChanged { path }) => {
                        // Contents of one sandbox changed; the set of
                        // devices did not. Topology stays untouched.
                        crate::debug_event!("watcher", "child changed", "{}", path.display());
                        self.schedule_reload();
                    }
                    None => break,
                },
            }
        }

        self.teardown();
    }

    fn schedule_reload(&mut self) {
        self.gate.pulse(Arc::clone(&self.sink));
    }

    /// Discard every current child watch and rebuild the set from a
    /// fresh listing of the root's immediate entries.
    ///
    /// Stale children are dropped wholesale, never diffed. Entries that
    /// vanish or fail between listing and start are skipped.
    fn rebuild_children(&mut self) {
        for mut child in self.children.drain(..) {
            child.stop();
        }

        let entries = match std::fs::read_dir(&self.root_path) {
            Ok(entries) => entries,
            Err(e) => {
                // Raced deletion of the root itself: zero children this
                // cycle, recover on the next notification.
                let err = WatchError::Enumeration {
                    path: self.root_path.clone(),
                    reason: e.to_string(),
                };
                tracing::warn!("[watcher] {err}");
                return;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("[watcher] unreadable entry under {}: {e}", self.root_path.display());
                    continue;
                }
            };
            let is_dir = entry.file_type().map(|ty| ty.is_dir()).unwrap_or(false);
            if !is_dir {
                continue;
            }

            match WatchTarget::start(&entry.path(), WatchMode::Child, self.event_tx.clone()) {
                Ok(target) => self.children.push(target),
                Err(e) => {
                    crate::debug_event!("watcher", "skipping child", "{e}");
                }
            }
        }

        crate::debug_event!("watcher", "watching", "{} children", self.children.len());
    }

    fn teardown(&mut self) {
        for mut child in self.children.drain(..) {
            child.stop();
        }
        self.root.stop();
        self.gate.cancel_all();
    }
}
