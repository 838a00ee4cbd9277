//! Error types for the sandbox watcher.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from watcher operations.
///
/// Only `RootWatch` is fatal to the caller; the tree contains everything
/// else and keeps running in best-effort degraded mode.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to initialize watcher: {reason}")]
    InitFailed { reason: String },

    #[error("Cannot watch root {path}: {reason}")]
    RootWatch { path: PathBuf, reason: String },

    #[error("Cannot watch child {path}: {reason}")]
    ChildWatch { path: PathBuf, reason: String },

    #[error("Cannot enumerate {path}: {reason}")]
    Enumeration { path: PathBuf, reason: String },
}

impl WatchError {
    /// Path the failing operation was aimed at, where one applies.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::InitFailed { .. } => None,
            Self::RootWatch { path, .. }
            | Self::ChildWatch { path, .. }
            | Self::Enumeration { path, .. } => Some(path),
        }
    }
}
