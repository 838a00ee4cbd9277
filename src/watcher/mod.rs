//! Hierarchical sandbox watcher with debounced reload.
//!
//! Watches exactly two levels: the sandbox root plus each of its
//! immediate subdirectories, funneling every notification through one
//! trailing-edge debounce gate.
//!
//! # Architecture
//!
//! ```text
//! SandboxWatcher
//!   - root WatchTarget (non-recursive)
//!   - one WatchTarget per immediate subdirectory
//!   - typed WatchEvents funnel through one channel into the driver task
//!         |
//!    RootChanged  -> rebuild child watches, then pulse the gate
//!    ChildChanged -> pulse the gate only
//!         |
//!    DebounceGate (trailing edge) -> ReloadSink
//! ```

mod debounce;
mod error;
mod sink;
mod target;
mod tree;

pub use debounce::DebounceGate;
pub use error::WatchError;
pub use sink::ReloadSink;
pub use target::{WatchEvent, WatchMode, WatchTarget};
pub use tree::{SandboxWatcher, SandboxWatcherBuilder, WatchStatus};
