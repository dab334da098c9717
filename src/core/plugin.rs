//! # Plugins
//!
//! A plugin is a unit with an async `initialize`/`cleanup` lifecycle that
//! extends the shell at startup: registering commands, key bindings,
//! themes, or posting notifications.
//!
//! Plugins are compiled in and registered with the manager; a plugin
//! directory of TOML manifests selects which registered plugins are
//! enabled and annotates them. Initialization runs in registration order,
//! cleanup in reverse. A failing plugin is logged and skipped, never fatal.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::core::command::CommandRegistry;
use crate::core::keyboard::Keymap;
use crate::core::notification::NotificationCenter;
use crate::core::theme::ThemeManager;

/// The registries a plugin may extend during `initialize`.
pub struct ShellSetup<'a> {
    pub commands: &'a mut CommandRegistry,
    pub keymap: &'a mut Keymap,
    pub themes: &'a mut ThemeManager,
    pub notifications: &'a mut NotificationCenter,
}

#[async_trait]
pub trait Plugin: Send {
    fn name(&self) -> &str;

    fn version(&self) -> &str {
        "0.0.0"
    }

    fn description(&self) -> &str {
        ""
    }

    /// Called once at startup, before the event loop runs.
    async fn initialize(&mut self, shell: &mut ShellSetup<'_>) -> Result<(), PluginError>;

    /// Called on shutdown for every plugin that initialized successfully.
    async fn cleanup(&mut self) {}
}

#[derive(Debug)]
pub enum PluginError {
    /// Initialization failed; the message is plugin-defined.
    Init(String),
    Io { path: PathBuf, source: io::Error },
    Manifest {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginError::Init(message) => write!(f, "plugin initialization failed: {message}"),
            PluginError::Io { path, source } => {
                write!(f, "plugin I/O error for {}: {source}", path.display())
            }
            PluginError::Manifest { path, source } => {
                write!(f, "invalid plugin manifest {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for PluginError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PluginError::Init(_) => None,
            PluginError::Io { source, .. } => Some(source),
            PluginError::Manifest { source, .. } => Some(source),
        }
    }
}

/// On-disk plugin manifest (`<plugin-dir>/<name>.toml`).
#[derive(Debug, Deserialize)]
pub struct PluginManifest {
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl PluginManifest {
    pub fn load(path: &Path) -> Result<Self, PluginError> {
        let contents = fs::read_to_string(path).map_err(|source| PluginError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| PluginError::Manifest {
            path: path.to_path_buf(),
            source,
        })
    }
}

struct RegisteredPlugin {
    plugin: Box<dyn Plugin>,
    enabled: bool,
    initialized: bool,
}

/// Name-keyed plugin registry preserving registration order.
#[derive(Default)]
pub struct PluginManager {
    plugins: Vec<RegisteredPlugin>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin. A plugin with the same name is replaced in place,
    /// keeping its order slot.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        debug!("Registered plugin: {} v{}", plugin.name(), plugin.version());
        let entry = RegisteredPlugin {
            plugin,
            enabled: true,
            initialized: false,
        };
        match self
            .plugins
            .iter_mut()
            .find(|p| p.plugin.name() == entry.plugin.name())
        {
            Some(slot) => *slot = entry,
            None => self.plugins.push(entry),
        }
    }

    /// Apply `*.toml` manifests from a directory to the registered plugins.
    ///
    /// A manifest naming a registered plugin sets its enabled flag; a
    /// manifest for an unknown plugin is logged and skipped, as is any
    /// malformed manifest. Plugins without a manifest stay enabled.
    /// Returns how many manifests matched a registered plugin.
    pub fn discover(&mut self, directory: &Path) -> Result<usize, PluginError> {
        let entries = fs::read_dir(directory).map_err(|source| PluginError::Io {
            path: directory.to_path_buf(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("toml"))
            .collect();
        paths.sort();

        let mut matched = 0;
        for path in paths {
            let manifest = match PluginManifest::load(&path) {
                Ok(manifest) => manifest,
                Err(e) => {
                    warn!("Skipping plugin manifest {}: {e}", path.display());
                    continue;
                }
            };
            match self
                .plugins
                .iter_mut()
                .find(|p| p.plugin.name() == manifest.name)
            {
                Some(entry) => {
                    entry.enabled = manifest.enabled;
                    debug!(
                        "Plugin '{}' {} by manifest {}",
                        manifest.name,
                        if manifest.enabled { "enabled" } else { "disabled" },
                        path.display()
                    );
                    matched += 1;
                }
                None => {
                    warn!(
                        "Manifest {} names unregistered plugin '{}'",
                        path.display(),
                        manifest.name
                    );
                }
            }
        }
        Ok(matched)
    }

    /// Initialize every enabled plugin in registration order.
    ///
    /// Failures are logged and the remaining plugins still run; there is no
    /// isolation beyond that. Returns how many initialized successfully.
    pub async fn initialize_all(&mut self, shell: &mut ShellSetup<'_>) -> usize {
        let mut succeeded = 0;
        for entry in &mut self.plugins {
            if !entry.enabled {
                debug!("Skipping disabled plugin: {}", entry.plugin.name());
                continue;
            }
            match entry.plugin.initialize(shell).await {
                Ok(()) => {
                    info!("Initialized plugin: {}", entry.plugin.name());
                    entry.initialized = true;
                    succeeded += 1;
                }
                Err(e) => {
                    warn!("Plugin '{}' failed to initialize: {e}", entry.plugin.name());
                }
            }
        }
        succeeded
    }

    /// Clean up initialized plugins in reverse registration order.
    pub async fn cleanup_all(&mut self) {
        for entry in self.plugins.iter_mut().rev() {
            if entry.initialized {
                debug!("Cleaning up plugin: {}", entry.plugin.name());
                entry.plugin.cleanup().await;
                entry.initialized = false;
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins
            .iter()
            .find(|p| p.plugin.name() == name)
            .map(|p| p.plugin.as_ref())
    }

    pub fn is_enabled(&self, name: &str) -> Option<bool> {
        self.plugins
            .iter()
            .find(|p| p.plugin.name() == name)
            .map(|p| p.enabled)
    }

    /// Plugin names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.plugin.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
