//! # Command Registry
//!
//! Named commands with a description, a category, and a handler closure.
//! The palette lists them, key bindings can point at them, and plugins
//! register their own at startup.
//!
//! Identity is the command name: registering a name twice replaces the
//! earlier entry.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::mpsc;
use std::time::Duration;

use log::{debug, warn};

use crate::core::action::ShellAction;
use crate::core::notification::NotificationCenter;
use crate::core::theme::ThemeManager;

/// Outcome of a command handler.
pub type CommandResult = Result<(), Box<dyn Error + Send + Sync>>;

/// Handler closure invoked when a command executes.
pub type CommandHandler = Box<dyn FnMut(&mut CommandCtx<'_>) -> CommandResult + Send>;

/// What a command handler may touch while it runs.
///
/// Screen changes go through the action channel rather than a direct
/// reference: the screen stack belongs to the event loop, and the loop
/// drains the channel in the same iteration.
pub struct CommandCtx<'a> {
    pub notifications: &'a mut NotificationCenter,
    pub themes: &'a mut ThemeManager,
    pub actions: &'a mpsc::Sender<ShellAction>,
    pub quit: &'a mut bool,
}

impl CommandCtx<'_> {
    /// Post a deferred shell action. A send failure means the loop is gone,
    /// which only happens during shutdown.
    pub fn post(&self, action: ShellAction) {
        if self.actions.send(action).is_err() {
            warn!("Action channel closed; shell is shutting down");
        }
    }
}

/// A named, executable command.
pub struct Command {
    pub name: String,
    pub description: String,
    pub category: String,
    /// Display label for the palette (e.g. "ctrl+t"); purely informational.
    pub shortcut: Option<String>,
    handler: CommandHandler,
}

impl Command {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category: "General".to_string(),
            shortcut: None,
            handler,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("shortcut", &self.shortcut)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum CommandError {
    /// No command registered under this name.
    Unknown(String),
    /// The handler itself failed.
    Failed {
        name: String,
        source: Box<dyn Error + Send + Sync>,
    },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Unknown(name) => write!(f, "unknown command: {name}"),
            CommandError::Failed { name, source } => {
                write!(f, "command '{name}' failed: {source}")
            }
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CommandError::Unknown(_) => None,
            CommandError::Failed { source, .. } => Some(source.as_ref()),
        }
    }
}

/// Name-keyed command registry. Last write wins on collision.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Command) {
        debug!("Registered command: {}", command.name);
        if self.commands.insert(command.name.clone(), command).is_some() {
            debug!("Replaced existing command registration");
        }
    }

    pub fn register_many(&mut self, commands: impl IntoIterator<Item = Command>) {
        for command in commands {
            self.register(command);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.commands.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands ordered by category, then name. The palette relies on this
    /// being stable across frames.
    pub fn sorted(&self) -> Vec<&Command> {
        let mut commands: Vec<&Command> = self.commands.values().collect();
        commands.sort_by(|a, b| {
            (a.category.as_str(), a.name.as_str()).cmp(&(b.category.as_str(), b.name.as_str()))
        });
        commands
    }

    /// Execute a command by name.
    ///
    /// Handler failures come back as `CommandError::Failed`; the caller
    /// decides whether to notify, log, or both. The registry itself stays
    /// usable either way.
    pub fn execute(&mut self, name: &str, ctx: &mut CommandCtx<'_>) -> Result<(), CommandError> {
        let command = self
            .commands
            .get_mut(name)
            .ok_or_else(|| CommandError::Unknown(name.to_string()))?;
        debug!("Executing command: {name}");
        (command.handler)(ctx).map_err(|source| CommandError::Failed {
            name: name.to_string(),
            source,
        })
    }
}

/// Convenience for handlers that report failure with a plain message.
pub fn command_failure(message: impl Into<String>) -> Box<dyn Error + Send + Sync> {
    let message = message.into();
    Box::<dyn Error + Send + Sync>::from(message)
}

/// Default time-to-live for notifications the shell posts on behalf of
/// commands and screens.
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(5);
