//! `simwatch config`: print the effective configuration.

use anyhow::{Context, Result};

use crate::config::Settings;

pub fn run(settings: &Settings) -> Result<()> {
    let rendered = toml::to_string_pretty(settings).context("cannot render configuration")?;
    print!("{rendered}");
    Ok(())
}
