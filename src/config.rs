//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MBOXZIP2JSON_CONFIG` (environment variable)
//! 2. `~/.config/mboxzip2json/config.toml` (Linux/macOS)
//!    `%APPDATA%\mboxzip2json\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Archive traversal settings.
    pub archive: ArchiveConfig,
    /// Mailbox detection settings.
    pub mailbox: MailboxConfig,
    /// JSON output settings.
    pub output: OutputConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Also write logs to this file.
    pub log_file: Option<PathBuf>,
}

/// Archive traversal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Entries whose name has this extension are descended into.
    pub nested_extension: String,
    /// Nested archives up to this many bytes are buffered in memory;
    /// larger ones spill to a temporary file.
    pub memory_limit: u64,
    /// Hard cap on the size of a single nested archive. `None` = unlimited.
    pub max_nested_size: Option<u64>,
}

/// Mailbox detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailboxConfig {
    /// File name suffixes treated as MBOX content.
    pub suffixes: Vec<String>,
}

/// JSON output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Indent the JSON array.
    pub pretty: bool,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_file: None,
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            nested_extension: ".zip".to_string(),
            memory_limit: 64 * 1024 * 1024, // 64 MB
            max_nested_size: None,
        }
    }
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            suffixes: vec![".mbox".to_string(), ".mbox.txt".to_string()],
        }
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    match config_file_path() {
        Some(path) if path.exists() => load_config_from(&path),
        _ => Config::default(),
    }
}

/// Load configuration from a discovered path, falling back to defaults.
pub fn load_config_from(path: &Path) -> Config {
    match read_config(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to load config, using defaults"
            );
            Config::default()
        }
    }
}

/// Read and parse a config file the user named explicitly. Errors are returned.
pub fn read_config(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file '{}'", path.display()))?;
    let cfg = toml::from_str::<Config>(&contents)
        .with_context(|| format!("parsing config file '{}'", path.display()))?;
    tracing::info!(path = %path.display(), "Loaded config");
    Ok(cfg)
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MBOXZIP2JSON_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("mboxzip2json").join("config.toml"))
}
