//! # Shell
//!
//! The ratatui-specific layer: terminal I/O, the event loop, and the
//! `Shell` struct that owns every registry. This is the only module that
//! touches the terminal directly.
//!
//! ## Redraw Strategy
//!
//! The loop only draws when something changed:
//!
//! - **Animating** (a screen's `tick` requested redraws, or timed
//!   notifications are pending expiry): polls every ~80ms.
//! - **Idle**: sleeps up to 250ms and redraws only on input.
//!
//! ## Event Routing
//!
//! Overlays eat input before anything else sees it:
//! palette → help → keymap → current screen.

pub mod component;
pub mod components;
pub mod event;
pub mod screen;

use std::io::{self, stdout};
use std::path::Path;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use log::{debug, info, warn};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use crate::core::action::ShellAction;
use crate::core::command::{
    Command, CommandCtx, CommandRegistry, DEFAULT_NOTIFICATION_TTL, command_failure,
};
use crate::core::config::ResolvedConfig;
use crate::core::keyboard::{KeyBinding, Keymap};
use crate::core::notification::{NotificationCenter, Severity};
use crate::core::plugin::{PluginManager, ShellSetup};
use crate::core::theme::{ThemeError, ThemeManager};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::{
    CommandPalette, Footer, HelpEvent, HelpSection, HelpViewer, NotificationArea, PaletteEvent,
    PaletteState, theme_color,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::screen::{LoadingScreen, ScreenEvent, ScreenStack};

/// Keymap action names the shell handles itself.
pub const ACTION_SHOW_PALETTE: &str = "show_palette";
pub const ACTION_TOGGLE_HELP: &str = "toggle_help";
pub const ACTION_QUIT: &str = "quit";

const POLL_ANIMATING: Duration = Duration::from_millis(80);
const POLL_IDLE: Duration = Duration::from_millis(250);

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        execute!(stdout(), EnableBracketedPaste)?;
        info!("Terminal modes enabled (bracketed paste)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableBracketedPaste);
    }
}

/// The application shell: every registry plus the overlays and the action
/// channel, with `run` as the event loop.
pub struct Shell {
    pub commands: CommandRegistry,
    pub keymap: Keymap,
    pub plugins: PluginManager,
    pub themes: ThemeManager,
    pub notifications: NotificationCenter,
    pub screens: ScreenStack,
    pub status: String,
    help: HelpViewer,
    palette: Option<PaletteState>,
    actions_tx: mpsc::Sender<ShellAction>,
    actions_rx: mpsc::Receiver<ShellAction>,
    quit: bool,
}

impl Shell {
    pub fn new(config: &ResolvedConfig) -> Self {
        let (actions_tx, actions_rx) = mpsc::channel();
        let mut shell = Self {
            commands: CommandRegistry::new(),
            keymap: Keymap::new(),
            plugins: PluginManager::new(),
            themes: ThemeManager::new(),
            notifications: NotificationCenter::new(config.max_notifications),
            screens: ScreenStack::new(),
            status: String::new(),
            help: HelpViewer::new(),
            palette: None,
            actions_tx,
            actions_rx,
            quit: false,
        };
        shell.register_builtins();
        shell
    }

    /// A sender for posting actions from background tasks.
    pub fn action_sender(&self) -> mpsc::Sender<ShellAction> {
        self.actions_tx.clone()
    }

    fn register_builtins(&mut self) {
        let bindings = [
            ("ctrl+p", ACTION_SHOW_PALETTE, "Commands"),
            ("?", ACTION_TOGGLE_HELP, "Help"),
            ("ctrl+t", "Switch Theme", "Theme"),
            ("ctrl+q", ACTION_QUIT, "Quit"),
        ];
        for (key, action, description) in bindings {
            match KeyBinding::new(key, action, description) {
                Ok(binding) => self.keymap.register(binding),
                Err(e) => warn!("Invalid built-in binding: {e}"),
            }
        }

        self.commands.register(
            Command::new(
                "Toggle Help",
                "Show or hide the help overlay",
                Box::new(|ctx| {
                    ctx.post(ShellAction::ToggleHelp);
                    Ok(())
                }),
            )
            .with_category("View")
            .with_shortcut("?"),
        );
        self.commands.register(
            Command::new(
                "Switch Theme",
                "Cycle to the next loaded theme",
                Box::new(|ctx| match ctx.themes.next_theme_name().map(str::to_string) {
                    Some(next) => {
                        ctx.themes.set_theme(&next);
                        ctx.post(ShellAction::SetStatus(format!("Theme: {next}")));
                        Ok(())
                    }
                    None => Err(command_failure("no themes loaded")),
                }),
            )
            .with_category("View")
            .with_shortcut("ctrl+t"),
        );
        self.commands.register(
            Command::new(
                "Clear Notifications",
                "Dismiss every visible notification",
                Box::new(|ctx| {
                    ctx.notifications.clear_all();
                    Ok(())
                }),
            )
            .with_category("View"),
        );
        self.commands.register(
            Command::new(
                "Quit",
                "Exit the application",
                Box::new(|ctx| {
                    *ctx.quit = true;
                    Ok(())
                }),
            )
            .with_shortcut("ctrl+q"),
        );
    }

    /// Load every theme file in a directory, then activate `preferred` or,
    /// failing that, the first theme loaded.
    pub fn load_themes(
        &mut self,
        directory: &Path,
        preferred: Option<&str>,
    ) -> Result<usize, ThemeError> {
        let loaded = self.themes.load_dir(directory)?;
        match preferred {
            Some(name) => {
                if !self.themes.set_theme(name) {
                    self.notifications.notify(
                        format!("Theme not found: {name}"),
                        Severity::Warning,
                        Some(DEFAULT_NOTIFICATION_TTL),
                    );
                }
            }
            None => {
                if let Some(first) = self.themes.names().first().cloned() {
                    self.themes.set_theme(&first);
                }
            }
        }
        Ok(loaded)
    }

    /// Apply plugin manifests (when a directory is configured) and
    /// initialize every enabled plugin.
    pub async fn load_plugins(&mut self, directory: Option<&Path>) {
        if let Some(dir) = directory {
            match self.plugins.discover(dir) {
                Ok(matched) => debug!("Applied {matched} plugin manifest(s)"),
                Err(e) => warn!("Plugin discovery failed: {e}"),
            }
        }
        let Shell {
            commands,
            keymap,
            themes,
            notifications,
            plugins,
            ..
        } = self;
        let mut setup = ShellSetup {
            commands,
            keymap,
            themes,
            notifications,
        };
        let initialized = plugins.initialize_all(&mut setup).await;
        info!("Initialized {initialized} plugin(s)");
    }

    /// Execute a registered command. Failures become an error notification
    /// rather than propagating; the shell keeps running.
    pub fn execute_command(&mut self, name: &str) {
        let Shell {
            commands,
            notifications,
            themes,
            actions_tx,
            quit,
            ..
        } = self;
        let mut ctx = CommandCtx {
            notifications,
            themes,
            actions: actions_tx,
            quit,
        };
        if let Err(e) = commands.execute(name, &mut ctx) {
            warn!("{e}");
            self.notifications.notify(
                e.to_string(),
                Severity::Error,
                Some(DEFAULT_NOTIFICATION_TTL),
            );
        }
    }

    // ========================================================================
    // Event routing
    // ========================================================================

    fn handle_event(&mut self, event: &TuiEvent) {
        // Resize already flagged a redraw upstream
        if matches!(event, TuiEvent::Resize) {
            return;
        }

        if let Some(palette) = &mut self.palette {
            if let Some(palette_event) = palette.handle_event(event) {
                self.palette = None;
                if let PaletteEvent::Execute(name) = palette_event {
                    self.execute_command(&name);
                }
            }
            return;
        }

        if self.help.visible {
            if let Some(HelpEvent::Dismiss) = self.help.handle_event(event) {
                self.help.visible = false;
            }
            return;
        }

        if let TuiEvent::Key(key) = event
            && let Some(action) = self.keymap.resolve(key).map(str::to_string)
        {
            self.dispatch_action(&action);
            return;
        }

        let screen_event = self
            .screens
            .current_mut()
            .and_then(|screen| screen.handle_event(event));
        if let Some(screen_event) = screen_event {
            self.handle_screen_event(screen_event);
        }
    }

    /// Resolve a keymap action name: shell built-ins first, then command
    /// names.
    fn dispatch_action(&mut self, action: &str) {
        match action {
            ACTION_SHOW_PALETTE => self.palette = Some(PaletteState::open(&self.commands)),
            ACTION_TOGGLE_HELP => self.apply_action(ShellAction::ToggleHelp),
            ACTION_QUIT => self.quit = true,
            name if self.commands.contains(name) => self.execute_command(name),
            other => warn!("Key binding action has no handler: {other}"),
        }
    }

    fn handle_screen_event(&mut self, event: ScreenEvent) {
        match event {
            ScreenEvent::Pop => {
                self.screens.pop();
            }
            ScreenEvent::SwitchTo(name) => {
                if !self.screens.switch_to(&name) {
                    self.notifications.notify(
                        format!("Unknown screen: {name}"),
                        Severity::Error,
                        Some(DEFAULT_NOTIFICATION_TTL),
                    );
                }
            }
            ScreenEvent::RunCommand(name) => self.execute_command(&name),
            ScreenEvent::Notify { message, severity } => {
                self.notifications
                    .notify(message, severity, Some(DEFAULT_NOTIFICATION_TTL));
            }
        }
    }

    fn apply_action(&mut self, action: ShellAction) {
        match action {
            ShellAction::Notify {
                message,
                severity,
                duration,
            } => {
                self.notifications.notify(message, severity, duration);
            }
            ShellAction::SetStatus(status) => self.status = status,
            ShellAction::SwitchScreen(name) => {
                if !self.screens.switch_to(&name) {
                    self.notifications.notify(
                        format!("Unknown screen: {name}"),
                        Severity::Error,
                        Some(DEFAULT_NOTIFICATION_TTL),
                    );
                }
            }
            ShellAction::PushLoading(message) => {
                self.screens.push(Box::new(LoadingScreen::new(message)));
            }
            ShellAction::PopScreen => {
                self.screens.pop();
            }
            ShellAction::SwitchTheme(name) => {
                if self.themes.set_theme(&name) {
                    self.status = format!("Theme: {name}");
                } else {
                    self.notifications.notify(
                        format!("Unknown theme: {name}"),
                        Severity::Warning,
                        Some(DEFAULT_NOTIFICATION_TTL),
                    );
                }
            }
            ShellAction::ToggleHelp => {
                if !self.help.visible {
                    // Rebuild so late plugin bindings show up
                    self.help.add_section(HelpSection::keyboard(&self.keymap));
                }
                self.help.toggle();
            }
            ShellAction::Quit => self.quit = true,
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    fn draw(&mut self, frame: &mut Frame) {
        let theme = self.themes.active().clone();
        let area = frame.area();
        let [screen_area, footer_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

        frame.render_widget(
            Block::default().style(
                Style::default()
                    .bg(theme_color(&theme.colors.background))
                    .fg(theme_color(&theme.colors.text)),
            ),
            area,
        );

        if let Some(screen) = self.screens.current_mut() {
            screen.render(frame, screen_area, &theme);
        }
        Footer::new(&self.keymap, &self.status).render(frame, footer_area, &theme);
        NotificationArea::new(&self.notifications).render(frame, area, &theme);
        self.help.render(frame, area, &theme);
        if let Some(state) = &mut self.palette {
            CommandPalette::new(state).render(frame, area, &theme);
        }
    }

    // ========================================================================
    // Event loop
    // ========================================================================

    pub async fn run(&mut self) -> io::Result<()> {
        let mut terminal = ratatui::init();
        let _terminal_mode_guard = TerminalModeGuard::new()?;

        self.help.add_section(HelpSection::keyboard(&self.keymap));

        let mut needs_redraw = true; // Force first frame
        let mut frame_count: usize = 0;

        while !self.quit {
            frame_count = frame_count.wrapping_add(1);

            let mut animating = false;
            if let Some(screen) = self.screens.current_mut() {
                animating = screen.tick(frame_count);
            }

            // Timed notifications need periodic sweeps to disappear on time
            if self.notifications.iter().any(|n| n.duration.is_some()) {
                animating = true;
            }
            if self.notifications.expire_stale(Instant::now()) {
                needs_redraw = true;
            }

            if animating {
                needs_redraw = true;
            }
            if needs_redraw {
                terminal.draw(|frame| self.draw(frame))?;
                needs_redraw = false;
            }

            // Dynamic poll timeout: short when animating, long when idle
            let timeout = if animating { POLL_ANIMATING } else { POLL_IDLE };

            // Drain all pending events before the next draw
            let mut pending = Vec::new();
            if let Some(event) = poll_event_timeout(timeout)? {
                pending.push(event);
                while let Some(event) = poll_event_immediate()? {
                    pending.push(event);
                }
            }
            if !pending.is_empty() {
                needs_redraw = true;
            }
            for event in pending {
                self.handle_event(&event);
            }

            // Deferred actions from handlers and background tasks
            while let Ok(action) = self.actions_rx.try_recv() {
                debug!("Applying shell action: {action:?}");
                needs_redraw = true;
                self.apply_action(action);
            }
        }

        ratatui::restore();
        self.plugins.cleanup_all().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::*;
    use crate::core::theme::Theme;

    fn test_config() -> ResolvedConfig {
        ResolvedConfig {
            theme: None,
            theme_dir: None,
            plugin_dir: None,
            max_notifications: 5,
            log_file: PathBuf::from("test.log"),
        }
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> TuiEvent {
        TuiEvent::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_builtins_registered() {
        let shell = Shell::new(&test_config());
        for name in ["Toggle Help", "Switch Theme", "Clear Notifications", "Quit"] {
            assert!(shell.commands.contains(name), "missing builtin: {name}");
        }
        let ctrl_p = KeyEvent::new(KeyCode::Char('p'), KeyModifiers::CONTROL);
        assert_eq!(shell.keymap.resolve(&ctrl_p), Some(ACTION_SHOW_PALETTE));
    }

    #[test]
    fn test_quit_command_sets_flag() {
        let mut shell = Shell::new(&test_config());
        shell.execute_command("Quit");
        assert!(shell.quit);
    }

    #[test]
    fn test_unknown_command_becomes_error_notification() {
        let mut shell = Shell::new(&test_config());
        shell.execute_command("No Such Command");
        assert_eq!(shell.notifications.len(), 1);
        let n = shell.notifications.iter().next().unwrap();
        assert_eq!(n.severity, Severity::Error);
        assert!(n.message.contains("No Such Command"));
    }

    #[test]
    fn test_switch_theme_cycles_through_loaded_themes() {
        let mut shell = Shell::new(&test_config());
        for name in ["one", "two"] {
            let mut theme = Theme::fallback();
            theme.name = name.to_string();
            shell.themes.register(theme);
        }

        shell.execute_command("Switch Theme");
        assert_eq!(shell.themes.active_name(), Some("one"));
        shell.execute_command("Switch Theme");
        assert_eq!(shell.themes.active_name(), Some("two"));

        // The handler posts a status update for the loop to apply
        let action = shell.actions_rx.try_recv().unwrap();
        assert_eq!(action, ShellAction::SetStatus("Theme: one".to_string()));
    }

    #[test]
    fn test_switch_theme_with_no_themes_fails() {
        let mut shell = Shell::new(&test_config());
        shell.execute_command("Switch Theme");
        let n = shell.notifications.iter().next().unwrap();
        assert_eq!(n.severity, Severity::Error);
    }

    #[test]
    fn test_palette_opens_and_executes() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&counter);
        let mut shell = Shell::new(&test_config());
        shell.commands.register(Command::new(
            "AAA Probe",
            "",
            Box::new(move |_| {
                handle.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        ));

        shell.handle_event(&press(KeyCode::Char('p'), KeyModifiers::CONTROL));
        assert!(shell.palette.is_some());

        // Filter down to the probe and run it
        for c in "aaa".chars() {
            shell.handle_event(&press(KeyCode::Char(c), KeyModifiers::NONE));
        }
        shell.handle_event(&press(KeyCode::Enter, KeyModifiers::NONE));
        assert!(shell.palette.is_none());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_palette_esc_dismisses_without_executing() {
        let mut shell = Shell::new(&test_config());
        shell.dispatch_action(ACTION_SHOW_PALETTE);
        shell.handle_event(&press(KeyCode::Esc, KeyModifiers::NONE));
        assert!(shell.palette.is_none());
        assert!(!shell.quit);
    }

    #[test]
    fn test_help_toggle_and_dismiss() {
        let mut shell = Shell::new(&test_config());
        shell.handle_event(&press(KeyCode::Char('?'), KeyModifiers::NONE));
        assert!(shell.help.visible);
        // While open, '?' routes to the help overlay and closes it
        shell.handle_event(&press(KeyCode::Char('?'), KeyModifiers::NONE));
        assert!(!shell.help.visible);
    }

    #[test]
    fn test_screen_event_notify_and_run_command() {
        let mut shell = Shell::new(&test_config());
        shell.handle_screen_event(ScreenEvent::Notify {
            message: "saved".to_string(),
            severity: Severity::Info,
        });
        assert_eq!(shell.notifications.len(), 1);

        shell.handle_screen_event(ScreenEvent::RunCommand("Quit".to_string()));
        assert!(shell.quit);
    }

    #[test]
    fn test_push_loading_and_pop_actions() {
        let mut shell = Shell::new(&test_config());
        shell.apply_action(ShellAction::PushLoading("Fetching".to_string()));
        assert_eq!(shell.screens.depth(), 1);
        assert_eq!(shell.screens.current_title(), Some("Loading"));
        // The last screen never pops
        shell.apply_action(ShellAction::PopScreen);
        assert_eq!(shell.screens.depth(), 1);
    }

    #[test]
    fn test_quit_key_leaves_loop() {
        let mut shell = Shell::new(&test_config());
        shell.handle_event(&press(KeyCode::Char('q'), KeyModifiers::CONTROL));
        assert!(shell.quit);
    }

    #[test]
    fn test_keymap_binding_can_target_command() {
        let mut shell = Shell::new(&test_config());
        // ctrl+t is bound to the "Switch Theme" command by name; with no
        // themes loaded the handler fails and the shell notifies
        shell.handle_event(&press(KeyCode::Char('t'), KeyModifiers::CONTROL));
        assert_eq!(shell.notifications.len(), 1);
    }
}
