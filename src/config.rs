//! Layered configuration for simwatch.
//!
//! Settings merge, lowest precedence first:
//! - built-in defaults
//! - TOML settings file (platform config dir, or an explicit path)
//! - environment variable overrides
//!
//! # Environment Variables
//!
//! Variables must be prefixed with `SIMWATCH_` and use double underscores
//! to separate nested levels:
//! - `SIMWATCH_ROOT_PATH=/tmp/sandboxes` sets `root_path`
//! - `SIMWATCH_WATCHER__DEBOUNCE_MS=250` sets `watcher.debounce_ms`
//! - `SIMWATCH_LOGGING__DEFAULT=debug` sets `logging.default`

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Sandbox root to watch (the device collection directory)
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// Watcher tuning
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// Logging levels
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WatcherConfig {
    /// Quiet period before a catalog rebuild fires, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Capacity of the change-event channel
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level when no `RUST_LOG` is set
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides, e.g. `watcher = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_version() -> u32 {
    1
}
fn default_root_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("Library/Developer/CoreSimulator/Devices"))
        .unwrap_or_else(|| PathBuf::from("."))
}
fn default_debounce_ms() -> u64 {
    1000
}
fn default_channel_capacity() -> usize {
    100
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            root_path: default_root_path(),
            watcher: WatcherConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        Self::load_from(Self::config_file_path())
    }

    /// Load configuration from a specific file, still honoring
    /// environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            // Double underscore separates nested levels; single
            // underscores stay part of the field name.
            .merge(Env::prefixed("SIMWATCH_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Default settings file location: `<config dir>/simwatch/settings.toml`.
    pub fn config_file_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("simwatch")
            .join("settings.toml")
    }

    /// Save current configuration to file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file at `path` (or the default location).
    pub fn init_config_file(
        path: Option<&Path>,
        force: bool,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_file_path);

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        Settings::default().save(&config_path)?;
        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.version, 1);
        assert_eq!(settings.watcher.debounce_ms, 1000);
        assert_eq!(settings.watcher.channel_capacity, 100);
        assert_eq!(settings.logging.default, "info");
        assert!(!settings.root_path.as_os_str().is_empty());
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        let toml_content = r#"
version = 2
root_path = "/tmp/sandboxes"

[watcher]
debounce_ms = 250

[logging]
default = "debug"

[logging.modules]
watcher = "trace"
"#;

        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.version, 2);
        assert_eq!(settings.root_path, PathBuf::from("/tmp/sandboxes"));
        assert_eq!(settings.watcher.debounce_ms, 250);
        // Unset fields keep their defaults.
        assert_eq!(settings.watcher.channel_capacity, 100);
        assert_eq!(settings.logging.default, "debug");
        assert_eq!(settings.logging.modules["watcher"], "trace");
    }

    #[test]
    fn test_save_settings_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested/settings.toml");

        let mut settings = Settings::default();
        settings.watcher.debounce_ms = 2000;
        settings.root_path = PathBuf::from("/tmp/devices");

        settings.save(&config_path).unwrap();

        let loaded = Settings::load_from(&config_path).unwrap();
        assert_eq!(loaded.watcher.debounce_ms, 2000);
        assert_eq!(loaded.root_path, PathBuf::from("/tmp/devices"));
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        fs::write(&config_path, "[watcher]\ndebounce_ms = 500\n").unwrap();

        unsafe {
            std::env::set_var("SIMWATCH_WATCHER__DEBOUNCE_MS", "75");
        }

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.watcher.debounce_ms, 75);

        unsafe {
            std::env::remove_var("SIMWATCH_WATCHER__DEBOUNCE_MS");
        }
    }

    #[test]
    fn test_init_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        let written = Settings::init_config_file(Some(&config_path), false).unwrap();
        assert_eq!(written, config_path);
        assert!(config_path.exists());

        // Refuses to clobber without force.
        assert!(Settings::init_config_file(Some(&config_path), false).is_err());
        assert!(Settings::init_config_file(Some(&config_path), true).is_ok());
    }
}
