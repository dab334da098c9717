//! # Themes
//!
//! Color and metric sets loaded from YAML files. A theme file needs a
//! `name`; `colors` and `metrics` are optional and fall back field-by-field
//! to the built-in defaults, so a theme can override just the handful of
//! values it cares about.
//!
//! ```yaml
//! name: dracula
//! colors:
//!   primary: "#bd93f9"
//!   background: "#282a36"
//! metrics:
//!   sizes:
//!     sidebar: 30
//! ```
//!
//! A malformed file is an error, never a silent default.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use serde::Deserialize;

/// The ten named theme colors, as hex strings or ratatui color names.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeColors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub text: String,
    pub error: String,
    pub warning: String,
    pub success: String,
    pub info: String,
    pub selection: String,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            primary: "#bd93f9".to_string(),
            secondary: "#6272a4".to_string(),
            accent: "#ff79c6".to_string(),
            background: "#282a36".to_string(),
            text: "#f8f8f2".to_string(),
            error: "#ff5555".to_string(),
            warning: "#ffb86c".to_string(),
            success: "#50fa7b".to_string(),
            info: "#8be9fd".to_string(),
            selection: "#44475a".to_string(),
        }
    }
}

/// Spacing, size, and breakpoint tables in terminal cells.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeMetrics {
    pub spacing: BTreeMap<String, u16>,
    pub sizes: BTreeMap<String, u16>,
    pub breakpoints: BTreeMap<String, u16>,
}

impl Default for ThemeMetrics {
    fn default() -> Self {
        let table = |pairs: &[(&str, u16)]| {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<BTreeMap<_, _>>()
        };
        Self {
            spacing: table(&[("xs", 1), ("sm", 2), ("md", 4), ("lg", 8), ("xl", 16)]),
            sizes: table(&[
                ("icon", 1),
                ("input", 3),
                ("header", 3),
                ("footer", 3),
                ("sidebar", 30),
            ]),
            breakpoints: table(&[("sm", 40), ("md", 80), ("lg", 120)]),
        }
    }
}

impl ThemeMetrics {
    /// Look up a size by name, with a fallback for unknown keys.
    pub fn size(&self, name: &str, fallback: u16) -> u16 {
        self.sizes.get(name).copied().unwrap_or(fallback)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Theme {
    pub name: String,
    #[serde(default)]
    pub colors: ThemeColors,
    #[serde(default)]
    pub metrics: ThemeMetrics,
}

impl Theme {
    /// Load a theme from a YAML file.
    pub fn load(path: &Path) -> Result<Theme, ThemeError> {
        let contents = fs::read_to_string(path).map_err(|source| ThemeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let theme: Theme = serde_yaml::from_str(&contents).map_err(|source| {
            error!("Invalid theme file {}: {source}", path.display());
            ThemeError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(theme)
    }

    /// The built-in theme used when nothing has been loaded.
    pub fn fallback() -> Theme {
        Theme {
            name: "default".to_string(),
            colors: ThemeColors::default(),
            metrics: ThemeMetrics::default(),
        }
    }
}

#[derive(Debug)]
pub enum ThemeError {
    Io { path: PathBuf, source: io::Error },
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeError::Io { path, source } => {
                write!(f, "theme I/O error for {}: {source}", path.display())
            }
            ThemeError::Parse { path, source } => {
                write!(f, "invalid theme file {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ThemeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ThemeError::Io { source, .. } => Some(source),
            ThemeError::Parse { source, .. } => Some(source),
        }
    }
}

/// Name-keyed theme registry with one active theme.
///
/// Registration order is preserved so "switch theme" can cycle a stable
/// ring. Last write wins on duplicate names (the order slot is kept).
pub struct ThemeManager {
    themes: HashMap<String, Theme>,
    order: Vec<String>,
    active: Option<String>,
    fallback: Theme,
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeManager {
    pub fn new() -> Self {
        Self {
            themes: HashMap::new(),
            order: Vec::new(),
            active: None,
            fallback: Theme::fallback(),
        }
    }

    pub fn register(&mut self, theme: Theme) {
        if !self.themes.contains_key(&theme.name) {
            self.order.push(theme.name.clone());
        }
        info!("Registered theme: {}", theme.name);
        self.themes.insert(theme.name.clone(), theme);
    }

    /// Load a single theme file and register it.
    pub fn load_theme(&mut self, path: &Path) -> Result<&Theme, ThemeError> {
        let theme = Theme::load(path)?;
        let name = theme.name.clone();
        self.register(theme);
        Ok(&self.themes[&name])
    }

    /// Load every `*.yaml` / `*.yml` in a directory, in path order.
    ///
    /// Individual files that fail to parse are logged and skipped; only a
    /// directory-level I/O failure is an error. Returns how many themes
    /// loaded.
    pub fn load_dir(&mut self, directory: &Path) -> Result<usize, ThemeError> {
        let entries = fs::read_dir(directory).map_err(|source| ThemeError::Io {
            path: directory.to_path_buf(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                matches!(
                    path.extension().and_then(|e| e.to_str()),
                    Some("yaml") | Some("yml")
                )
            })
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            match self.load_theme(&path) {
                Ok(_) => loaded += 1,
                Err(e) => warn!("Skipping theme {}: {e}", path.display()),
            }
        }
        info!("Loaded {loaded} theme(s) from {}", directory.display());
        Ok(loaded)
    }

    /// Activate a theme by name. Unknown names are logged and leave the
    /// active theme unchanged.
    pub fn set_theme(&mut self, name: &str) -> bool {
        if self.themes.contains_key(name) {
            self.active = Some(name.to_string());
            info!("Set theme to {name}");
            true
        } else {
            error!("Theme not found: {name}");
            false
        }
    }

    pub fn get(&self, name: &str) -> Option<&Theme> {
        self.themes.get(name)
    }

    /// The active theme, or the built-in fallback when none is set.
    pub fn active(&self) -> &Theme {
        self.active
            .as_deref()
            .and_then(|name| self.themes.get(name))
            .unwrap_or(&self.fallback)
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The name after the active one in the registration ring, for theme
    /// cycling. `None` when no themes are loaded.
    pub fn next_theme_name(&self) -> Option<&str> {
        if self.order.is_empty() {
            return None;
        }
        let next = match &self.active {
            Some(active) => {
                let index = self.order.iter().position(|n| n == active)?;
                (index + 1) % self.order.len()
            }
            None => 0,
        };
        Some(self.order[next].as_str())
    }

    /// Theme names in registration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}
