//! # Screens
//!
//! A screen is a full-viewport view managed by the shell's navigation
//! stack. Applications register screen factories under a name and switch
//! between them; the shell pushes built-in loading and error screens on
//! top when asked.

use std::collections::HashMap;

use log::{debug, warn};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph, Wrap};

use crate::core::notification::Severity;
use crate::core::theme::Theme;
use crate::tui::components::theme_color;
use crate::tui::event::TuiEvent;

/// What a screen asks the shell to do after handling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEvent {
    /// Pop this screen off the stack.
    Pop,
    /// Switch to a named registered screen.
    SwitchTo(String),
    /// Execute a registered command by name.
    RunCommand(String),
    /// Post a notification.
    Notify { message: String, severity: Severity },
}

pub trait Screen {
    fn title(&self) -> &str;

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Handle an event the shell didn't consume. `None` means ignored.
    fn handle_event(&mut self, _event: &TuiEvent) -> Option<ScreenEvent> {
        None
    }

    /// Animation hook, called once per loop iteration with a frame counter.
    /// Return true to request a redraw.
    fn tick(&mut self, _frame: usize) -> bool {
        false
    }

    /// Called when the screen lands on top of the stack.
    fn on_enter(&mut self) {}
}

pub type ScreenFactory = Box<dyn Fn() -> Box<dyn Screen>>;

/// Named screen factories plus the live navigation stack.
///
/// The stack never becomes empty: `pop` refuses to remove the last screen.
#[derive(Default)]
pub struct ScreenStack {
    factories: HashMap<String, ScreenFactory>,
    stack: Vec<Box<dyn Screen>>,
}

impl ScreenStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a screen factory under a name. Last write wins.
    pub fn register(&mut self, name: impl Into<String>, factory: ScreenFactory) {
        let name = name.into();
        debug!("Registered screen: {name}");
        self.factories.insert(name, factory);
    }

    /// Instantiate a registered screen and push it. Unknown names are
    /// logged and leave the stack unchanged.
    pub fn switch_to(&mut self, name: &str) -> bool {
        match self.factories.get(name) {
            Some(factory) => {
                let mut screen = factory();
                screen.on_enter();
                debug!("Switched to screen: {name}");
                self.stack.push(screen);
                true
            }
            None => {
                warn!("Screen not found: {name}");
                false
            }
        }
    }

    pub fn push(&mut self, mut screen: Box<dyn Screen>) {
        screen.on_enter();
        self.stack.push(screen);
    }

    /// Pop the top screen. Refuses to pop the last one.
    pub fn pop(&mut self) -> bool {
        if self.stack.len() <= 1 {
            debug!("Refusing to pop the last screen");
            return false;
        }
        self.stack.pop();
        if let Some(top) = self.stack.last_mut() {
            top.on_enter();
        }
        true
    }

    pub fn current_mut(&mut self) -> Option<&mut Box<dyn Screen>> {
        self.stack.last_mut()
    }

    pub fn current_title(&self) -> Option<&str> {
        self.stack.last().map(|s| s.title())
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn has_screen(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

// ============================================================================
// Built-in screens
// ============================================================================

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Full-screen spinner with a message. Esc pops it.
pub struct LoadingScreen {
    message: String,
    frame: usize,
}

impl LoadingScreen {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            frame: 0,
        }
    }
}

impl Screen for LoadingScreen {
    fn title(&self) -> &str {
        "Loading"
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let spinner = SPINNER_FRAMES[self.frame % SPINNER_FRAMES.len()];
        let [_, center, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(2),
            Constraint::Fill(1),
        ])
        .areas(area);

        let lines = vec![
            Line::from(self.message.as_str()).centered(),
            Line::styled(
                spinner,
                Style::default().fg(theme_color(&theme.colors.accent)),
            )
            .centered(),
        ];
        frame.render_widget(Paragraph::new(lines), center);
    }

    fn handle_event(&mut self, event: &TuiEvent) -> Option<ScreenEvent> {
        match event {
            TuiEvent::Key(key) if key.code == crossterm::event::KeyCode::Esc => {
                Some(ScreenEvent::Pop)
            }
            _ => None,
        }
    }

    fn tick(&mut self, frame: usize) -> bool {
        self.frame = frame;
        true
    }
}

/// Centered bordered error message. Any key pops it.
pub struct ErrorScreen {
    message: String,
}

impl ErrorScreen {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Screen for ErrorScreen {
    fn title(&self) -> &str {
        "Error"
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let error_color = theme_color(&theme.colors.error);
        let paragraph = Paragraph::new(self.message.as_str())
            .block(
                Block::bordered()
                    .title(" ERROR ")
                    .title_style(Style::default().fg(error_color).add_modifier(Modifier::BOLD))
                    .border_style(Style::default().fg(error_color)),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn handle_event(&mut self, event: &TuiEvent) -> Option<ScreenEvent> {
        match event {
            TuiEvent::Key(_) => Some(ScreenEvent::Pop),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ProbeScreen {
        name: String,
        entered: std::rc::Rc<std::cell::Cell<usize>>,
    }

    impl Screen for ProbeScreen {
        fn title(&self) -> &str {
            &self.name
        }

        fn render(&mut self, _frame: &mut Frame, _area: Rect, _theme: &Theme) {}

        fn on_enter(&mut self) {
            self.entered.set(self.entered.get() + 1);
        }
    }

    fn probe_factory(
        name: &str,
        entered: &std::rc::Rc<std::cell::Cell<usize>>,
    ) -> ScreenFactory {
        let name = name.to_string();
        let entered = std::rc::Rc::clone(entered);
        Box::new(move || {
            Box::new(ProbeScreen {
                name: name.clone(),
                entered: std::rc::Rc::clone(&entered),
            })
        })
    }

    #[test]
    fn test_switch_to_registered_screen() {
        let entered = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut screens = ScreenStack::new();
        screens.register("main", probe_factory("main", &entered));

        assert!(screens.switch_to("main"));
        assert_eq!(screens.depth(), 1);
        assert_eq!(screens.current_title(), Some("main"));
        assert_eq!(entered.get(), 1);
    }

    #[test]
    fn test_switch_to_unknown_screen_is_noop() {
        let mut screens = ScreenStack::new();
        assert!(!screens.switch_to("ghost"));
        assert_eq!(screens.depth(), 0);
    }

    #[test]
    fn test_register_same_name_replaces() {
        let entered = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut screens = ScreenStack::new();
        screens.register("main", probe_factory("first", &entered));
        screens.register("main", probe_factory("second", &entered));
        screens.switch_to("main");
        assert_eq!(screens.current_title(), Some("second"));
    }

    #[test]
    fn test_pop_never_empties_stack() {
        let entered = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut screens = ScreenStack::new();
        screens.register("main", probe_factory("main", &entered));
        screens.switch_to("main");
        screens.push(Box::new(LoadingScreen::new("wait")));

        assert_eq!(screens.depth(), 2);
        assert!(screens.pop());
        assert_eq!(screens.depth(), 1);
        assert!(!screens.pop());
        assert_eq!(screens.depth(), 1);
    }

    #[test]
    fn test_pop_reenters_screen_below() {
        let entered = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut screens = ScreenStack::new();
        screens.register("main", probe_factory("main", &entered));
        screens.switch_to("main");
        screens.push(Box::new(LoadingScreen::new("wait")));
        screens.pop();
        // on_enter ran once on switch and again when re-exposed by pop
        assert_eq!(entered.get(), 2);
    }

    #[test]
    fn test_loading_screen_esc_pops() {
        let mut screen = LoadingScreen::new("wait");
        let esc = TuiEvent::Key(crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Esc,
            crossterm::event::KeyModifiers::NONE,
        ));
        assert_eq!(screen.handle_event(&esc), Some(ScreenEvent::Pop));
        assert!(screen.tick(3));
    }

    #[test]
    fn test_error_screen_any_key_pops() {
        let mut screen = ErrorScreen::new("boom");
        let key = TuiEvent::Key(crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Char('x'),
            crossterm::event::KeyModifiers::NONE,
        ));
        assert_eq!(screen.handle_event(&key), Some(ScreenEvent::Pop));
        assert_eq!(screen.handle_event(&TuiEvent::Resize), None);
    }
}
