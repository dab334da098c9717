//! Footer bar: visible keybindings on the left, shell status on the right.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::core::keyboard::Keymap;
use crate::core::theme::Theme;
use crate::tui::component::Component;
use crate::tui::components::theme_color;

/// Transient render wrapper built each frame from borrowed shell state.
pub struct Footer<'a> {
    keymap: &'a Keymap,
    status: &'a str,
}

impl<'a> Footer<'a> {
    pub fn new(keymap: &'a Keymap, status: &'a str) -> Self {
        Self { keymap, status }
    }

    fn binding_spans(&self, theme: &Theme) -> Vec<Span<'a>> {
        let accent = theme_color(&theme.colors.accent);
        let dim = theme_color(&theme.colors.secondary);
        let mut spans = Vec::new();
        for binding in self.keymap.visible() {
            if !spans.is_empty() {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(
                binding.key.to_string(),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                binding.description.clone(),
                Style::default().fg(dim),
            ));
        }
        spans
    }
}

impl Component for Footer<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let mut spans = self.binding_spans(theme);

        if !self.status.is_empty() {
            let used: usize = spans.iter().map(|s| s.content.width()).sum();
            let status_width = self.status.width();
            let gap = (area.width as usize).saturating_sub(used + status_width);
            if gap > 0 {
                spans.push(Span::raw(" ".repeat(gap)));
                spans.push(Span::styled(
                    self.status.to_string(),
                    Style::default().fg(theme_color(&theme.colors.secondary)),
                ));
            }
        }

        let bar = Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme_color(&theme.colors.selection)));
        frame.render_widget(bar, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::keyboard::KeyBinding;

    #[test]
    fn test_hidden_bindings_are_skipped() {
        let mut keymap = Keymap::new();
        keymap.register(KeyBinding::new("ctrl+p", "show_palette", "Commands").unwrap());
        keymap.register(KeyBinding::new("ctrl+l", "redraw", "Redraw").unwrap().hidden());

        let footer = Footer::new(&keymap, "");
        let spans = footer.binding_spans(&Theme::fallback());
        let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains("ctrl+p"));
        assert!(text.contains("Commands"));
        assert!(!text.contains("Redraw"));
    }

    #[test]
    fn test_render_uses_selection_background() {
        use ratatui::Terminal;
        use ratatui::backend::TestBackend;

        let mut keymap = Keymap::new();
        keymap.register(KeyBinding::new("ctrl+p", "show_palette", "Commands").unwrap());
        let theme = Theme::fallback();

        let backend = TestBackend::new(40, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                Footer::new(&keymap, "ready").render(frame, frame.area(), &theme);
            })
            .unwrap();

        let cell = &terminal.backend().buffer()[(0, 0)];
        assert_eq!(cell.style().bg, Some(theme_color(&theme.colors.selection)));
    }

    #[test]
    fn test_bindings_separated_by_gap() {
        let mut keymap = Keymap::new();
        keymap.register(KeyBinding::new("ctrl+p", "show_palette", "Commands").unwrap());
        keymap.register(KeyBinding::new("?", "toggle_help", "Help").unwrap());

        let footer = Footer::new(&keymap, "");
        let spans = footer.binding_spans(&Theme::fallback());
        let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "ctrl+p Commands  ? Help");
    }
}
