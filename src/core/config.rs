//! # Configuration
//!
//! Centralizes shell settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.pepper/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use log::{debug, info, warn};
use serde::Deserialize;

use crate::core::notification::DEFAULT_MAX_NOTIFICATIONS;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct PepperConfig {
    #[serde(default)]
    pub general: GeneralConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeneralConfig {
    /// Theme to activate at startup (must exist in the theme directory).
    pub theme: Option<String>,
    pub theme_dir: Option<PathBuf>,
    pub plugin_dir: Option<PathBuf>,
    pub max_notifications: Option<usize>,
    pub log_file: Option<PathBuf>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_LOG_FILE: &str = "pepper.log";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub theme: Option<String>,
    pub theme_dir: Option<PathBuf>,
    pub plugin_dir: Option<PathBuf>,
    pub max_notifications: usize,
    pub log_file: PathBuf,
}

/// CLI flag values that override everything else (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub theme: Option<String>,
    pub theme_dir: Option<PathBuf>,
    pub plugin_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.pepper/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".pepper").join("config.toml"))
}

/// Returns the default directory for user themes (`~/.pepper/themes`).
pub fn default_theme_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".pepper").join("themes"))
}

/// Load config from `~/.pepper/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `PepperConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<PepperConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(PepperConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(PepperConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: PepperConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &PathBuf) {
    let default_content = r#"# Pepper Configuration
# All settings are optional — defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# theme = "dracula"                  # Theme activated at startup
# theme_dir = "/path/to/themes"      # Defaults to ~/.pepper/themes
# plugin_dir = "/path/to/plugins"    # Directory of plugin manifests
# max_notifications = 5              # Visible notification cap
# log_file = "pepper.log"
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env
/// vars (`PEPPER_*`) → CLI flags.
pub fn resolve(config: &PepperConfig, cli: &CliOverrides) -> ResolvedConfig {
    let theme = cli
        .theme
        .clone()
        .or_else(|| std::env::var("PEPPER_THEME").ok())
        .or_else(|| config.general.theme.clone());

    let theme_dir = cli
        .theme_dir
        .clone()
        .or_else(|| std::env::var("PEPPER_THEME_DIR").ok().map(PathBuf::from))
        .or_else(|| config.general.theme_dir.clone())
        .or_else(default_theme_dir);

    let plugin_dir = cli
        .plugin_dir
        .clone()
        .or_else(|| std::env::var("PEPPER_PLUGIN_DIR").ok().map(PathBuf::from))
        .or_else(|| config.general.plugin_dir.clone());

    let log_file = cli
        .log_file
        .clone()
        .or_else(|| std::env::var("PEPPER_LOG_FILE").ok().map(PathBuf::from))
        .or_else(|| config.general.log_file.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    let max_notifications = std::env::var("PEPPER_MAX_NOTIFICATIONS")
        .ok()
        .and_then(|value| match value.parse() {
            Ok(n) => Some(n),
            Err(e) => {
                warn!("Ignoring PEPPER_MAX_NOTIFICATIONS={value}: {e}");
                None
            }
        })
        .or(config.general.max_notifications)
        .unwrap_or(DEFAULT_MAX_NOTIFICATIONS);

    ResolvedConfig {
        theme,
        theme_dir,
        plugin_dir,
        max_notifications,
        log_file,
    }
}
