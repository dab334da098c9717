use ratatui::Frame;
use ratatui::layout::Rect;

use crate::core::theme::Theme;
use crate::tui::event::TuiEvent;

/// A reusable UI component.
///
/// Components receive data via struct fields, may hold internal state, and
/// render into a `Frame` within a given `Rect` using the active theme.
///
/// # Mutability
///
/// `render` takes `&mut self` so components can update internal caches
/// (layout heights, scroll offsets) during the render pass. This aligns
/// with Ratatui's `StatefulWidget` pattern.
pub trait Component {
    /// Render the component into the given area.
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);
}

/// A component that handles terminal events.
pub trait EventHandler {
    /// The type of high-level event this component emits.
    type Event;

    /// Handle a low-level `TuiEvent` and optionally return a high-level event.
    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event>;
}
