//! Derived view of the sandbox tree: devices and their app containers.
//!
//! A device is one immediate subdirectory of the sandbox root; an app
//! container is one immediate subdirectory of a device. The catalog is a
//! point-in-time snapshot, rebuilt wholesale whenever the watcher's
//! debounce window elapses.

mod sink;

pub use sink::CatalogSink;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use thiserror::Error;

/// Errors from catalog enumeration.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Cannot scan {path}: {reason}")]
    Scan { path: PathBuf, reason: String },
}

/// Prefetched metadata for one directory entry.
#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
    /// Last modification time, if the filesystem reports one.
    pub modified: Option<DateTime<Local>>,
}

impl FileInfo {
    /// Read metadata for a directory entry. Entries whose metadata cannot
    /// be read at all (raced deletion) yield `None`.
    pub fn for_entry(entry: &fs::DirEntry) -> Option<Self> {
        let metadata = entry.metadata().ok()?;
        Some(Self {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
            is_directory: metadata.is_dir(),
            modified: metadata.modified().ok().map(DateTime::<Local>::from),
        })
    }
}

/// One app container inside a device sandbox.
#[derive(Debug, Clone, Serialize)]
pub struct AppContainer {
    pub name: String,
    pub path: PathBuf,
    pub modified: Option<DateTime<Local>>,
}

/// One device sandbox: an immediate subdirectory of the root.
#[derive(Debug, Clone, Serialize)]
pub struct Device {
    pub name: String,
    pub path: PathBuf,
    pub modified: Option<DateTime<Local>>,
    pub apps: Vec<AppContainer>,
}

/// Snapshot of every device sandbox under one root.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SandboxCatalog {
    pub devices: Vec<Device>,
}

impl SandboxCatalog {
    /// Enumerate `root`'s immediate subdirectories as devices, and each
    /// device's immediate subdirectories as app containers.
    ///
    /// Non-directory entries are ignored at both levels. A device whose
    /// contents cannot be listed (deleted mid-scan, permissions) degrades
    /// to an empty app list; only an unreadable root fails the scan.
    pub fn scan(root: &Path) -> Result<Self, CatalogError> {
        let entries = fs::read_dir(root).map_err(|e| CatalogError::Scan {
            path: root.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut devices = Vec::new();
        for entry in entries.flatten() {
            let Some(info) = FileInfo::for_entry(&entry) else {
                continue;
            };
            if !info.is_directory {
                continue;
            }

            let apps = scan_apps(&info.path);
            devices.push(Device {
                name: info.name,
                path: info.path,
                modified: info.modified,
                apps,
            });
        }

        devices.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self { devices })
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn app_count(&self) -> usize {
        self.devices.iter().map(|device| device.apps.len()).sum()
    }
}

fn scan_apps(device_path: &Path) -> Vec<AppContainer> {
    let Ok(entries) = fs::read_dir(device_path) else {
        return Vec::new();
    };

    let mut apps: Vec<AppContainer> = entries
        .flatten()
        .filter_map(|entry| {
            let info = FileInfo::for_entry(&entry)?;
            info.is_directory.then_some(AppContainer {
                name: info.name,
                path: info.path,
                modified: info.modified,
            })
        })
        .collect();

    apps.sort_by(|a, b| a.name.cmp(&b.name));
    apps
}
