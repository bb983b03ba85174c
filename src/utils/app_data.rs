use crate::tree::types::{TreeConfig, TreeMode};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const APP_NAME: &str = "gstindex";
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the tree mode
pub const MODE_ENV: &str = "GSTINDEX_MODE";
/// Environment variable overriding the parallel build thread count
pub const THREADS_ENV: &str = "GSTINDEX_THREADS";

/// Application configuration stored in the app data directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Construction settings for every tree the CLI builds
    #[serde(default)]
    pub tree: TreeConfig,

    /// Threads used by `report --split`
    /// If 0, uses the number of CPU cores
    #[serde(default = "default_parallel_build_threads")]
    pub parallel_build_threads: usize,

    /// Capacity of the buffered report writer, in bytes
    #[serde(default = "default_report_buffer_size")]
    pub report_buffer_size: usize,
}

fn default_parallel_build_threads() -> usize {
    0 // 0 means use CPU count
}

fn default_report_buffer_size() -> usize {
    64 * 1024
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tree: TreeConfig::default(),
            parallel_build_threads: default_parallel_build_threads(),
            report_buffer_size: default_report_buffer_size(),
        }
    }
}

impl AppConfig {
    /// Load config from the app data directory, or return default if not found
    ///
    /// Environment overrides are applied on top of the file.
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            serde_json::from_str::<AppConfig>(&content)
                .context("Failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Save config to the app data directory, returning where it went
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = get_config_path()?;
        let content = serde_json::to_string_pretty(self)
            .context("Failed to serialize config")?;
        fs::write(&config_path, content)
            .context("Failed to write config file")?;
        Ok(config_path)
    }

    /// Apply `GSTINDEX_MODE` / `GSTINDEX_THREADS` from `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup(MODE_ENV) {
            self.tree.mode = mode
                .parse::<TreeMode>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("Invalid {}", MODE_ENV))?;
        }
        if let Some(threads) = lookup(THREADS_ENV) {
            self.parallel_build_threads = threads
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: {}", THREADS_ENV, threads))?;
        }
        Ok(())
    }

    /// Get the effective thread count (resolves 0 to CPU count)
    pub fn effective_build_threads(&self) -> usize {
        if self.parallel_build_threads == 0 {
            num_cpus()
        } else {
            self.parallel_build_threads
        }
    }
}

/// Get the number of CPUs available
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Get the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    let app_dir = get_app_data_dir()?;
    Ok(app_dir.join(CONFIG_FILE))
}

/// Get the application data directory
pub fn get_app_data_dir() -> Result<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir()
            .map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    };

    let base = base.context("Could not determine app data directory")?;
    let app_dir = base.join(APP_NAME);

    fs::create_dir_all(&app_dir)?;
    Ok(app_dir)
}
