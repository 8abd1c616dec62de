//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$RMSFORMS_CONFIG` (environment variable)
//! 2. `~/.config/rmsforms/config.toml` (Linux/macOS)
//!    `%APPDATA%\rmsforms\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::forms::ParserContext;
use crate::toolkit::formdata::FormDataStore;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Extraction policy.
    pub parsing: ParsingConfig,
    /// Performance tuning.
    pub performance: PerformanceConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Extraction policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Reject malformed dates and page numbers instead of keeping them raw.
    pub strict: bool,
    /// Message ids or sender calls to log in detail.
    pub filter_ids: Vec<String>,
    /// Directory of `SENDER_MESSAGEID.txt` form-data files.
    pub form_data_dir: Option<PathBuf>,
}

/// Performance tuning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Worker threads (0 = available parallelism).
    pub workers: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    match config_file_path() {
        Some(path) if path.exists() => load_config_from(&path),
        _ => Config::default(),
    }
}

/// Load one config file, falling back to defaults when it is unreadable.
pub fn load_config_from(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<Config>(&contents) {
            Ok(cfg) => {
                tracing::info!(path = %path.display(), "Loaded config");
                cfg
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to parse config, using defaults"
                );
                Config::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to read config file, using defaults"
            );
            Config::default()
        }
    }
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("RMSFORMS_CONFIG") {
        return Some(PathBuf::from(env_path));
    }
    dirs::config_dir().map(|d| d.join("rmsforms").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rmsforms")
}

/// Return the log file path.
pub fn log_file_path(config: &Config) -> PathBuf {
    cache_dir(config).join("rmsforms.log")
}

/// Build the shared parser context from the merged settings.
///
/// Loading the form-data directory is the only I/O; a missing directory is
/// an error because the user asked for it explicitly.
pub fn parser_context(parsing: &ParsingConfig) -> anyhow::Result<ParserContext> {
    let mut context = ParserContext::new()
        .with_strict_parsing(parsing.strict)
        .with_filter_ids(parsing.filter_ids.iter().cloned());
    if let Some(dir) = &parsing.form_data_dir {
        let store = FormDataStore::load_dir(dir)
            .map_err(|e| anyhow::anyhow!("Could not load form data from {}: {e}", dir.display()))?;
        tracing::info!(dir = %dir.display(), entries = store.len(), "Loaded form data");
        context = context.with_form_data(store);
    }
    Ok(context)
}
