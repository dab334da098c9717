//! Terminal application shell: registries for commands, key bindings,
//! themes, and plugins behind a ratatui event loop with screens,
//! notifications, a command palette, and a help overlay.

pub mod core;
pub mod tui;

pub use crate::core::action::ShellAction;
pub use crate::core::command::{Command, CommandCtx, CommandRegistry, CommandResult};
pub use crate::core::config::{CliOverrides, PepperConfig, ResolvedConfig};
pub use crate::core::keyboard::{KeyBinding, Keymap};
pub use crate::core::notification::{NotificationCenter, Severity};
pub use crate::core::plugin::{Plugin, PluginError, PluginManager, ShellSetup};
pub use crate::core::theme::{Theme, ThemeManager};
pub use crate::tui::Shell;
pub use crate::tui::screen::{ErrorScreen, LoadingScreen, Screen, ScreenEvent, ScreenStack};
