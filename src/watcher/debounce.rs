//! Trailing-edge debounce gate in front of a [`ReloadSink`].
//!
//! Bursts of change signals (a build touching dozens of sandbox files,
//! a device being created) collapse into a single reload that fires once
//! the tree has been quiet for the configured delay.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Duration, sleep};

use super::sink::ReloadSink;

/// Coalesces change signals into one delayed [`ReloadSink::reload`] call.
///
/// At most one firing is pending at any time. Each `pulse` cancels the
/// pending firing and arms a new one; the sink runs `delay` after the
/// *last* pulse. Armed firings carry a generation number and re-check it
/// before running, so a cancelled firing never executes even if its task
/// was not aborted in time.
pub struct DebounceGate {
    delay: Duration,
    generation: Arc<Mutex<u64>>,
    pending: Option<JoinHandle<()>>,
}

impl DebounceGate {
    /// Create a gate with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(Mutex::new(0)),
            pending: None,
        }
    }

    /// Arm (or re-arm) the gate: `sink.reload()` runs once the delay
    /// elapses with no further pulses.
    ///
    /// Must be called from within a tokio runtime. A firing that already
    /// started running is not recalled; pulsing while it runs only arms
    /// the next one.
    pub fn pulse(&mut self, sink: Arc<dyn ReloadSink>) {
        let armed = {
            let mut generation = self.generation.lock();
            *generation += 1;
            *generation
        };

        if let Some(handle) = self.pending.take() {
            handle.abort();
        }

        let generation = Arc::clone(&self.generation);
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            sleep(delay).await;

            // A newer pulse or cancel_all supersedes this firing.
            if *generation.lock() != armed {
                return;
            }

            crate::debug_event!(sink.name(), "quiet period elapsed, reloading");
            sink.reload().await;
        }));
    }

    /// Cancel any pending firing. Used on teardown.
    pub fn cancel_all(&mut self) {
        *self.generation.lock() += 1;
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// True while a firing is armed and has not yet run.
    pub fn has_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for DebounceGate {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
