//! Terminal event polling.
//!
//! Raw key events are passed through untranslated so the keymap can match
//! arbitrary chords; only event-kind filtering happens here (key releases
//! and repeats from the kitty protocol are dropped).

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

/// Shell-level input events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiEvent {
    Key(KeyEvent),
    /// Bracketed paste — preserves newlines.
    Paste(String),
    Resize,
    FocusGained,
    FocusLost,
}

/// Poll for an event, blocking up to `timeout`.
pub fn poll_event_timeout(timeout: Duration) -> io::Result<Option<TuiEvent>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    Ok(translate(event::read()?))
}

/// Poll for an event without blocking (returns immediately).
pub fn poll_event_immediate() -> io::Result<Option<TuiEvent>> {
    poll_event_timeout(Duration::ZERO)
}

fn translate(event: Event) -> Option<TuiEvent> {
    match event {
        Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
            log::debug!(
                "Key event: {:?} with modifiers {:?}",
                key_event.code,
                key_event.modifiers
            );
            Some(TuiEvent::Key(key_event))
        }
        Event::Paste(data) => Some(TuiEvent::Paste(data)),
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        Event::FocusGained => Some(TuiEvent::FocusGained),
        Event::FocusLost => Some(TuiEvent::FocusLost),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    #[test]
    fn test_key_press_translates() {
        let key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(translate(Event::Key(key)), Some(TuiEvent::Key(key)));
    }

    #[test]
    fn test_key_release_is_dropped() {
        let mut key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(translate(Event::Key(key)), None);
    }

    #[test]
    fn test_resize_translates() {
        assert_eq!(translate(Event::Resize(80, 24)), Some(TuiEvent::Resize));
    }
}
