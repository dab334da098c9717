//! # Help Viewer
//!
//! Scrollable overlay of titled help sections. The shell maintains a
//! "Keyboard Shortcuts" section generated from the keymap's visible
//! bindings; plugins and applications can add their own sections.

use crossterm::event::KeyCode;
use ratatui::Frame;
use ratatui::layout::{Rect, Size};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::keyboard::Keymap;
use crate::core::theme::Theme;
use crate::tui::component::EventHandler;
use crate::tui::components::{centered_rect, theme_color};
use crate::tui::event::TuiEvent;

pub const KEYBOARD_SECTION_TITLE: &str = "Keyboard Shortcuts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpSection {
    pub title: String,
    pub lines: Vec<String>,
}

impl HelpSection {
    pub fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
        }
    }

    /// Build the keyboard section from the keymap's visible bindings,
    /// with chords left-aligned into a column.
    pub fn keyboard(keymap: &Keymap) -> Self {
        let chords: Vec<(String, &str)> = keymap
            .visible()
            .map(|b| (b.key.to_string(), b.description.as_str()))
            .collect();
        let key_width = chords.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        let lines = chords
            .iter()
            .map(|(key, description)| format!("{key:<key_width$}  {description}"))
            .collect();
        Self::new(KEYBOARD_SECTION_TITLE, lines)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpEvent {
    Dismiss,
}

/// Persistent help state: sections plus overlay visibility and scroll.
pub struct HelpViewer {
    sections: Vec<HelpSection>,
    pub visible: bool,
    scroll: ScrollViewState,
}

impl Default for HelpViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpViewer {
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
            visible: false,
            scroll: ScrollViewState::default(),
        }
    }

    /// Add a section; an existing section with the same title is replaced
    /// in place.
    pub fn add_section(&mut self, section: HelpSection) {
        match self.sections.iter_mut().find(|s| s.title == section.title) {
            Some(slot) => *slot = section,
            None => self.sections.push(section),
        }
    }

    pub fn sections(&self) -> &[HelpSection] {
        &self.sections
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        if self.visible {
            self.scroll.scroll_to_top();
        }
    }

    fn content_lines(&self) -> Vec<Line<'_>> {
        let mut lines = Vec::new();
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            lines.push(Line::styled(
                section.title.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
            for line in &section.lines {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::raw(line.as_str()),
                ]));
            }
        }
        lines
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if !self.visible {
            return;
        }
        let overlay = centered_rect(70, 70, area);
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme_color(&theme.colors.primary)))
            .title(" Help ")
            .title_bottom(Line::from(" ↑↓ scroll  Esc close ").centered())
            .padding(Padding::horizontal(1));
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let lines = self.content_lines();
        let content_height = lines.len() as u16;
        let content_width = inner.width.saturating_sub(1);

        let mut scroll_view = ScrollView::new(Size::new(content_width, content_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);
        scroll_view.render_widget(
            Paragraph::new(lines).style(Style::default().fg(theme_color(&theme.colors.text))),
            Rect::new(0, 0, content_width, content_height),
        );
        frame.render_stateful_widget(scroll_view, inner, &mut self.scroll);
    }
}

impl EventHandler for HelpViewer {
    type Event = HelpEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<HelpEvent> {
        let TuiEvent::Key(key) = event else {
            return None;
        };
        match key.code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => Some(HelpEvent::Dismiss),
            KeyCode::Up => {
                self.scroll.scroll_up();
                None
            }
            KeyCode::Down => {
                self.scroll.scroll_down();
                None
            }
            KeyCode::PageUp => {
                self.scroll.scroll_page_up();
                None
            }
            KeyCode::PageDown => {
                self.scroll.scroll_page_down();
                None
            }
            KeyCode::Home => {
                self.scroll.scroll_to_top();
                None
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEvent, KeyModifiers};

    use super::*;
    use crate::core::keyboard::KeyBinding;

    #[test]
    fn test_keyboard_section_aligns_chords() {
        let mut keymap = Keymap::new();
        keymap.register(KeyBinding::new("ctrl+p", "show_palette", "Show Command Palette").unwrap());
        keymap.register(KeyBinding::new("?", "toggle_help", "Toggle Help").unwrap());
        keymap.register(KeyBinding::new("ctrl+l", "redraw", "Redraw").unwrap().hidden());

        let section = HelpSection::keyboard(&keymap);
        assert_eq!(section.title, KEYBOARD_SECTION_TITLE);
        assert_eq!(
            section.lines,
            vec![
                "ctrl+p  Show Command Palette".to_string(),
                "?       Toggle Help".to_string(),
            ]
        );
    }

    #[test]
    fn test_add_section_replaces_same_title() {
        let mut viewer = HelpViewer::new();
        viewer.add_section(HelpSection::new("About", vec!["v1".to_string()]));
        viewer.add_section(HelpSection::new("About", vec!["v2".to_string()]));
        assert_eq!(viewer.sections().len(), 1);
        assert_eq!(viewer.sections()[0].lines, vec!["v2".to_string()]);
    }

    #[test]
    fn test_toggle_flips_visibility() {
        let mut viewer = HelpViewer::new();
        assert!(!viewer.visible);
        viewer.toggle();
        assert!(viewer.visible);
        viewer.toggle();
        assert!(!viewer.visible);
    }

    #[test]
    fn test_esc_and_question_dismiss() {
        let mut viewer = HelpViewer::new();
        viewer.toggle();
        for code in [KeyCode::Esc, KeyCode::Char('?'), KeyCode::Char('q')] {
            let event = TuiEvent::Key(KeyEvent::new(code, KeyModifiers::NONE));
            assert_eq!(viewer.handle_event(&event), Some(HelpEvent::Dismiss));
        }
    }

    #[test]
    fn test_content_lines_include_titles_and_entries() {
        let mut viewer = HelpViewer::new();
        viewer.add_section(HelpSection::new("One", vec!["a".to_string()]));
        viewer.add_section(HelpSection::new("Two", vec!["b".to_string(), "c".to_string()]));
        // 2 titles + 3 entries + 1 blank separator
        assert_eq!(viewer.content_lines().len(), 6);
    }
}
