//! Notification rendering: bottom-right docked stack, newest at the
//! bottom, bordered in the severity color from the active theme.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::core::notification::{Notification, NotificationCenter, Severity};
use crate::core::theme::Theme;
use crate::tui::component::Component;
use crate::tui::components::theme_color;

const PANEL_WIDTH: u16 = 44;
const MARGIN: u16 = 1;

/// Transient render wrapper over the notification center.
pub struct NotificationArea<'a> {
    center: &'a NotificationCenter,
}

impl<'a> NotificationArea<'a> {
    pub fn new(center: &'a NotificationCenter) -> Self {
        Self { center }
    }

    fn severity_color(severity: Severity, theme: &Theme) -> ratatui::style::Color {
        let value = match severity {
            Severity::Info => &theme.colors.info,
            Severity::Warning => &theme.colors.warning,
            Severity::Error => &theme.colors.error,
        };
        theme_color(value)
    }

    fn entry_height(notification: &Notification, inner_width: u16) -> u16 {
        // Timestamp prefix "[HH:MM:SS] " is 11 columns
        let text_len = notification.message.width() as u16 + 11;
        let lines = if inner_width == 0 {
            1
        } else {
            text_len.div_ceil(inner_width).max(1)
        };
        lines + 2 // borders
    }
}

impl Component for NotificationArea<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if self.center.is_empty() {
            return;
        }

        let width = PANEL_WIDTH.min(area.width.saturating_sub(2 * MARGIN));
        if width < 6 {
            return;
        }
        let x = area.right().saturating_sub(width + MARGIN);
        let inner_width = width.saturating_sub(2);

        // Stack upward from the bottom edge, newest closest to it.
        let mut bottom = area.bottom().saturating_sub(MARGIN);
        for notification in self.center.iter().rev() {
            let height = Self::entry_height(notification, inner_width);
            if bottom < area.y + height {
                break;
            }
            let rect = Rect::new(x, bottom - height, width, height);
            frame.render_widget(Clear, rect);

            let color = Self::severity_color(notification.severity, theme);
            let line = Line::from(vec![
                Span::styled(
                    format!("[{}] ", notification.timestamp.format("%H:%M:%S")),
                    Style::default()
                        .fg(theme_color(&theme.colors.secondary))
                        .add_modifier(Modifier::DIM),
                ),
                Span::styled(
                    notification.message.as_str(),
                    Style::default().fg(theme_color(&theme.colors.text)),
                ),
            ]);
            let paragraph = Paragraph::new(line)
                .block(Block::bordered().border_style(Style::default().fg(color)))
                .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, rect);

            bottom = bottom.saturating_sub(height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_picks_theme_color() {
        let theme = Theme::fallback();
        assert_eq!(
            NotificationArea::severity_color(Severity::Error, &theme),
            theme_color(&theme.colors.error)
        );
        assert_eq!(
            NotificationArea::severity_color(Severity::Info, &theme),
            theme_color(&theme.colors.info)
        );
    }

    #[test]
    fn test_entry_height_wraps_long_messages() {
        let mut center = NotificationCenter::default();
        center.notify("x".repeat(100), Severity::Info, None);
        let notification = center.iter().next().unwrap();
        // 111 columns of text over 40-wide inner area → 3 lines + borders
        assert_eq!(NotificationArea::entry_height(notification, 40), 5);
    }

    #[test]
    fn test_entry_height_counts_display_columns() {
        let mut center = NotificationCenter::default();
        // 20 CJK chars occupy 40 columns, not 20
        center.notify("字".repeat(20), Severity::Info, None);
        let notification = center.iter().next().unwrap();
        // 40 + 11 prefix columns over a 40-wide inner area → 2 lines + borders
        assert_eq!(NotificationArea::entry_height(notification, 40), 4);
    }

    #[test]
    fn test_entry_height_single_line() {
        let mut center = NotificationCenter::default();
        center.notify("short", Severity::Info, None);
        let notification = center.iter().next().unwrap();
        assert_eq!(NotificationArea::entry_height(notification, 40), 3);
    }
}
