//! # Command Palette
//!
//! Centered overlay listing registered commands with incremental filtering.
//! The filter is a case-insensitive substring match over command name and
//! description; Enter asks the shell to execute the selection.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `PaletteState` lives on the shell while the palette is open
//! - `CommandPalette` is created each frame with borrowed state

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph};

use crate::core::command::CommandRegistry;
use crate::core::theme::Theme;
use crate::tui::component::EventHandler;
use crate::tui::components::{centered_rect, theme_color, truncate};
use crate::tui::event::TuiEvent;

/// A palette row: the displayable fields of a registered command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    pub name: String,
    pub description: String,
    pub category: String,
    pub shortcut: Option<String>,
}

impl PaletteEntry {
    fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query) || self.description.to_lowercase().contains(query)
    }
}

/// Events emitted by the palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteEvent {
    Execute(String),
    Dismiss,
}

/// Persistent state for the command palette overlay.
pub struct PaletteState {
    entries: Vec<PaletteEntry>,
    pub query: String,
    pub selected: usize,
}

impl PaletteState {
    /// Snapshot the registry into an open palette. The snapshot keeps the
    /// registry free for the handler that eventually executes.
    pub fn open(registry: &CommandRegistry) -> Self {
        let entries = registry
            .sorted()
            .into_iter()
            .map(|cmd| PaletteEntry {
                name: cmd.name.clone(),
                description: cmd.description.clone(),
                category: cmd.category.clone(),
                shortcut: cmd.shortcut.clone(),
            })
            .collect();
        Self {
            entries,
            query: String::new(),
            selected: 0,
        }
    }

    pub fn filtered(&self) -> Vec<&PaletteEntry> {
        if self.query.is_empty() {
            return self.entries.iter().collect();
        }
        let query = self.query.to_lowercase();
        self.entries.iter().filter(|e| e.matches(&query)).collect()
    }

    pub fn clamp_selection(&mut self) {
        let count = self.filtered().len();
        self.selected = if count == 0 {
            0
        } else {
            self.selected.min(count - 1)
        };
    }

    fn selected_name(&self) -> Option<String> {
        self.filtered().get(self.selected).map(|e| e.name.clone())
    }
}

impl EventHandler for PaletteState {
    type Event = PaletteEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<PaletteEvent> {
        let TuiEvent::Key(key) = event else {
            return None;
        };
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => Some(PaletteEvent::Dismiss),
            KeyCode::Char('c') if ctrl => Some(PaletteEvent::Dismiss),
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down => {
                let count = self.filtered().len();
                if count > 0 && self.selected < count - 1 {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Enter | KeyCode::Tab => self.selected_name().map(PaletteEvent::Execute),
            KeyCode::Backspace => {
                self.query.pop();
                self.clamp_selection();
                None
            }
            KeyCode::Char(c) if !ctrl => {
                self.query.push(c);
                self.clamp_selection();
                None
            }
            _ => None,
        }
    }
}

/// Transient render wrapper for the palette overlay.
pub struct CommandPalette<'a> {
    state: &'a mut PaletteState,
}

impl<'a> CommandPalette<'a> {
    pub fn new(state: &'a mut PaletteState) -> Self {
        Self { state }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let overlay = centered_rect(60, 60, area);
        frame.render_widget(Clear, overlay);

        let primary = theme_color(&theme.colors.primary);
        let dim = theme_color(&theme.colors.secondary);
        let text = theme_color(&theme.colors.text);
        let selection = theme_color(&theme.colors.selection);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(primary))
            .title(" Commands ")
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(" ↑↓ navigate  Enter run  Esc close ").centered())
            .padding(Padding::horizontal(1));
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        if inner.height < 3 {
            return;
        }

        // Search line
        let query_area = Rect::new(inner.x, inner.y, inner.width, 1);
        let query_line = Line::from(vec![
            Span::styled("> ", Style::default().fg(dim)),
            Span::styled(self.state.query.as_str(), Style::default().fg(text)),
            Span::styled("█", Style::default().fg(primary)),
        ]);
        frame.render_widget(Paragraph::new(query_line), query_area);

        let filtered = self.state.filtered();

        // Command list
        let list_area = Rect::new(
            inner.x,
            inner.y + 1,
            inner.width,
            inner.height.saturating_sub(2),
        );
        let items: Vec<ListItem> = if filtered.is_empty() {
            vec![ListItem::new(Line::styled(
                "  No matching commands",
                Style::default().fg(dim),
            ))]
        } else {
            let category_width = filtered.iter().map(|e| e.category.len()).max().unwrap_or(0);
            let name_budget = (inner.width as usize).saturating_sub(category_width + 12);
            filtered
                .iter()
                .map(|entry| {
                    let mut spans = vec![
                        Span::styled(
                            format!("{:>category_width$}  ", entry.category),
                            Style::default().fg(dim).add_modifier(Modifier::DIM),
                        ),
                        Span::styled(
                            truncate(&entry.name, name_budget),
                            Style::default().fg(text),
                        ),
                    ];
                    if let Some(shortcut) = &entry.shortcut {
                        spans.push(Span::styled(
                            format!("  {shortcut}"),
                            Style::default().fg(dim),
                        ));
                    }
                    ListItem::new(Line::from(spans))
                })
                .collect()
        };

        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .bg(selection)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        let mut list_state = ListState::default();
        if !filtered.is_empty() {
            list_state.select(Some(self.state.selected));
        }
        frame.render_stateful_widget(list, list_area, &mut list_state);

        // Selected command description
        let description = filtered
            .get(self.state.selected)
            .map(|e| e.description.as_str())
            .unwrap_or("");
        let desc_area = Rect::new(inner.x, inner.bottom().saturating_sub(1), inner.width, 1);
        frame.render_widget(
            Paragraph::new(Line::styled(description, Style::default().fg(dim)))
                .alignment(Alignment::Center),
            desc_area,
        );
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEvent;

    use super::*;
    use crate::core::command::Command;

    fn sample_registry() -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        registry.register(
            Command::new("Toggle Help", "Show or hide help", Box::new(|_| Ok(())))
                .with_category("View"),
        );
        registry.register(
            Command::new("Switch Theme", "Change application theme", Box::new(|_| Ok(())))
                .with_category("View")
                .with_shortcut("ctrl+t"),
        );
        registry.register(Command::new("Quit", "Exit application", Box::new(|_| Ok(()))));
        registry
    }

    fn press(code: KeyCode) -> TuiEvent {
        TuiEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_open_snapshots_sorted_registry() {
        let state = PaletteState::open(&sample_registry());
        let names: Vec<&str> = state.filtered().iter().map(|e| e.name.as_str()).collect();
        // "General" sorts before "View"
        assert_eq!(names, vec!["Quit", "Switch Theme", "Toggle Help"]);
    }

    #[test]
    fn test_filter_matches_name_case_insensitive() {
        let mut state = PaletteState::open(&sample_registry());
        state.query = "THEME".to_string();
        let names: Vec<&str> = state.filtered().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Switch Theme"]);
    }

    #[test]
    fn test_filter_matches_description() {
        let mut state = PaletteState::open(&sample_registry());
        state.query = "exit".to_string();
        let names: Vec<&str> = state.filtered().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Quit"]);
    }

    #[test]
    fn test_filter_no_match_is_empty() {
        let mut state = PaletteState::open(&sample_registry());
        state.query = "zzz".to_string();
        assert!(state.filtered().is_empty());
    }

    #[test]
    fn test_typing_narrows_and_clamps_selection() {
        let mut state = PaletteState::open(&sample_registry());
        state.selected = 2;
        for c in "quit".chars() {
            state.handle_event(&press(KeyCode::Char(c)));
        }
        assert_eq!(state.query, "quit");
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_enter_executes_selection() {
        let mut state = PaletteState::open(&sample_registry());
        state.handle_event(&press(KeyCode::Down));
        let event = state.handle_event(&press(KeyCode::Enter));
        assert_eq!(
            event,
            Some(PaletteEvent::Execute("Switch Theme".to_string()))
        );
    }

    #[test]
    fn test_enter_with_no_match_is_noop() {
        let mut state = PaletteState::open(&sample_registry());
        state.query = "zzz".to_string();
        assert_eq!(state.handle_event(&press(KeyCode::Enter)), None);
    }

    #[test]
    fn test_esc_dismisses() {
        let mut state = PaletteState::open(&sample_registry());
        assert_eq!(
            state.handle_event(&press(KeyCode::Esc)),
            Some(PaletteEvent::Dismiss)
        );
    }

    #[test]
    fn test_selection_does_not_run_past_end() {
        let mut state = PaletteState::open(&sample_registry());
        for _ in 0..10 {
            state.handle_event(&press(KeyCode::Down));
        }
        assert_eq!(state.selected, 2);
        state.handle_event(&press(KeyCode::Up));
        assert_eq!(state.selected, 1);
    }
}
