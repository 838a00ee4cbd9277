//! `simwatch init`: write a default settings file.

use std::path::Path;

use anyhow::Result;

use crate::config::Settings;

pub fn run(config_path: Option<&Path>, force: bool) -> Result<()> {
    let written = Settings::init_config_file(config_path, force)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    println!("Created configuration at: {}", written.display());
    Ok(())
}
