//! Reload sink trait: the downstream consumer of debounced change signals.

use async_trait::async_trait;

/// Consumer invoked when the debounce window elapses.
///
/// The watcher makes no claim about *what* changed, only that something
/// changed since the last firing. Implementations rebuild their derived
/// view from current directory contents.
#[async_trait]
pub trait ReloadSink: Send + Sync {
    /// Sink name for logging.
    fn name(&self) -> &str;

    /// Rebuild the derived view. Errors are the sink's own concern; a
    /// failed rebuild leaves the previous view standing.
    async fn reload(&self);
}
