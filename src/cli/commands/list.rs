//! `simwatch list`: one-shot enumeration, for when nothing is watching.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::catalog::SandboxCatalog;
use crate::config::Settings;

pub fn run(settings: &Settings, root: Option<PathBuf>, json: bool) -> Result<()> {
    let root = root.unwrap_or_else(|| settings.root_path.clone());
    let catalog =
        SandboxCatalog::scan(&root).with_context(|| format!("cannot list {}", root.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    for device in &catalog.devices {
        println!("{}  ({} apps)", device.name, device.apps.len());
        for app in &device.apps {
            println!("  {}", app.name);
        }
    }
    println!(
        "{} devices, {} apps",
        catalog.device_count(),
        catalog.app_count()
    );
    Ok(())
}
