//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "simwatch")]
#[command(version, about = "Live catalog of simulator device sandboxes")]
pub struct Cli {
    /// Path to a settings file (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Watch the sandbox root and rebuild the catalog on changes
    Watch {
        /// Sandbox root to watch (overrides config)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Debounce delay in milliseconds (overrides config)
        #[arg(long)]
        debounce_ms: Option<u64>,
    },

    /// Enumerate the sandbox root once and print the catalog
    List {
        /// Sandbox root to list (overrides config)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config,

    /// Create a default settings file
    Init {
        /// Overwrite an existing settings file
        #[arg(short, long)]
        force: bool,
    },
}
