pub mod catalog;
pub mod cli;
pub mod config;
pub mod logging;
pub mod watcher;

pub use catalog::{AppContainer, CatalogError, CatalogSink, Device, FileInfo, SandboxCatalog};
pub use config::Settings;
pub use watcher::{
    DebounceGate, ReloadSink, SandboxWatcher, WatchError, WatchEvent, WatchMode, WatchStatus,
    WatchTarget,
};
