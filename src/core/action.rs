//! # Shell Actions
//!
//! Anything that wants to mutate the shell from outside the event loop —
//! a background task, a command handler, a plugin — posts a `ShellAction`
//! on the shell's channel instead of touching state directly.
//!
//! ```text
//! background task → Sender<ShellAction> → event loop → shell state
//! ```
//!
//! The loop drains the channel once per iteration, so there is exactly one
//! mutator and no locking anywhere.

use std::time::Duration;

use crate::core::notification::Severity;

/// A deferred mutation of shell state, applied by the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellAction {
    /// Post a notification.
    Notify {
        message: String,
        severity: Severity,
        duration: Option<Duration>,
    },
    /// Replace the footer status text.
    SetStatus(String),
    /// Switch to a named screen registered with the screen stack.
    SwitchScreen(String),
    /// Push a loading screen with the given message.
    PushLoading(String),
    /// Pop the top screen (no-op on the last screen).
    PopScreen,
    /// Activate a loaded theme by name.
    SwitchTheme(String),
    /// Toggle the help overlay.
    ToggleHelp,
    /// Leave the event loop.
    Quit,
}
