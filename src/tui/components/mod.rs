//! Shell components: overlays and widgets that render registry state.

pub mod command_palette;
pub mod footer;
pub mod help;
pub mod notifications;
pub mod table;

pub use command_palette::{CommandPalette, PaletteEntry, PaletteEvent, PaletteState};
pub use footer::Footer;
pub use help::{HelpEvent, HelpSection, HelpViewer};
pub use notifications::NotificationArea;
pub use table::{Column, DataTable, TableError};

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Color;
use unicode_width::UnicodeWidthChar;

/// Parse a theme color string ("#50fa7b", "cyan") into a ratatui color.
/// Unparseable values render as the terminal default rather than failing.
pub(crate) fn theme_color(value: &str) -> Color {
    value.parse().unwrap_or(Color::Reset)
}

/// Compute a centered rect using percentage of the outer rect.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}

/// Truncate a string to `max_width` display columns, appending "…" if cut.
pub(crate) fn truncate(s: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    let total: usize = s.chars().filter_map(UnicodeWidthChar::width).sum();
    if total <= max_width {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width.saturating_sub(1) {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}
