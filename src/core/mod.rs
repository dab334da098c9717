//! # Core Systems
//!
//! Framework-free building blocks of the shell: registries for commands,
//! key bindings, themes, and plugins, plus the bounded notification center
//! and configuration loading.
//!
//! Nothing in here draws to the terminal. The `tui` module owns rendering
//! and feeds these systems from its event loop.

pub mod action;
pub mod command;
pub mod config;
pub mod keyboard;
pub mod notification;
pub mod plugin;
pub mod theme;
