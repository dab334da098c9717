//! # Key Bindings
//!
//! Maps key chords to named actions. Chords are written the way users
//! expect to read them ("ctrl+p", "shift+f2", "?") and parsed into
//! crossterm's key types for matching against incoming events.
//!
//! The registry is keyed by action: re-registering an action rebinds it
//! while keeping its position, so footer/help ordering stays stable.

use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::debug;

/// A parsed key chord: modifiers plus a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Whether a terminal key event matches this chord.
    ///
    /// SHIFT is ignored for character keys on both sides: terminals report
    /// '?' as Char('?') with or without a SHIFT modifier depending on the
    /// keyboard layout, and the character already encodes the shift.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        let strip = |m: KeyModifiers| m.difference(KeyModifiers::SHIFT);
        match (self.code, event.code) {
            (KeyCode::Char(a), KeyCode::Char(b)) => {
                a == b && strip(self.modifiers) == strip(event.modifiers)
            }
            (a, b) => a == b && self.modifiers == event.modifiers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyComboParseError(String);

impl fmt::Display for KeyComboParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid key combo: {}", self.0)
    }
}

impl std::error::Error for KeyComboParseError {}

impl FromStr for KeyCombo {
    type Err = KeyComboParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut modifiers = KeyModifiers::NONE;
        let mut code = None;

        let parts: Vec<&str> = s.split('+').collect();
        if parts.is_empty() || parts.iter().any(|p| p.is_empty()) {
            return Err(KeyComboParseError(s.to_string()));
        }

        for (i, part) in parts.iter().enumerate() {
            let is_last = i == parts.len() - 1;
            let lowered = part.to_ascii_lowercase();
            match lowered.as_str() {
                "ctrl" | "control" if !is_last => modifiers |= KeyModifiers::CONTROL,
                "alt" if !is_last => modifiers |= KeyModifiers::ALT,
                "shift" if !is_last => modifiers |= KeyModifiers::SHIFT,
                _ if is_last => code = Some(parse_key(&lowered, part)?),
                _ => return Err(KeyComboParseError(s.to_string())),
            }
        }

        match code {
            Some(code) => Ok(KeyCombo::new(code, modifiers)),
            None => Err(KeyComboParseError(s.to_string())),
        }
    }
}

fn parse_key(lowered: &str, raw: &str) -> Result<KeyCode, KeyComboParseError> {
    let code = match lowered {
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "insert" => KeyCode::Insert,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        _ => {
            if let Some(n) = lowered.strip_prefix('f').and_then(|n| n.parse::<u8>().ok())
                && (1..=12).contains(&n)
            {
                KeyCode::F(n)
            } else if raw.chars().count() == 1 {
                // Single printable character, case preserved
                KeyCode::Char(raw.chars().next().unwrap_or_default())
            } else {
                return Err(KeyComboParseError(raw.to_string()));
            }
        }
    };
    Ok(code)
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            write!(f, "ctrl+")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            write!(f, "alt+")?;
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            write!(f, "shift+")?;
        }
        match self.code {
            KeyCode::Char(' ') => write!(f, "space"),
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::Enter => write!(f, "enter"),
            KeyCode::Esc => write!(f, "esc"),
            KeyCode::Tab => write!(f, "tab"),
            KeyCode::Backspace => write!(f, "backspace"),
            KeyCode::Delete => write!(f, "delete"),
            KeyCode::Insert => write!(f, "insert"),
            KeyCode::Up => write!(f, "up"),
            KeyCode::Down => write!(f, "down"),
            KeyCode::Left => write!(f, "left"),
            KeyCode::Right => write!(f, "right"),
            KeyCode::Home => write!(f, "home"),
            KeyCode::End => write!(f, "end"),
            KeyCode::PageUp => write!(f, "pageup"),
            KeyCode::PageDown => write!(f, "pagedown"),
            KeyCode::F(n) => write!(f, "f{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// A chord bound to a named action.
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub key: KeyCombo,
    pub action: String,
    pub description: String,
    /// Whether the binding appears in the footer and help screen.
    pub show: bool,
}

impl KeyBinding {
    /// Build a binding from a chord string. Fails if the chord doesn't parse.
    pub fn new(
        key: &str,
        action: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, KeyComboParseError> {
        Ok(Self {
            key: key.parse()?,
            action: action.into(),
            description: description.into(),
            show: true,
        })
    }

    pub fn hidden(mut self) -> Self {
        self.show = false;
        self
    }
}

/// Action-keyed binding registry, ordered by first registration.
#[derive(Debug, Default)]
pub struct Keymap {
    bindings: Vec<KeyBinding>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binding. An existing binding for the same action is
    /// replaced in place.
    pub fn register(&mut self, binding: KeyBinding) {
        debug!("Registered key binding: {} -> {}", binding.key, binding.action);
        match self.bindings.iter_mut().find(|b| b.action == binding.action) {
            Some(slot) => *slot = binding,
            None => self.bindings.push(binding),
        }
    }

    pub fn register_many(&mut self, bindings: impl IntoIterator<Item = KeyBinding>) {
        for binding in bindings {
            self.register(binding);
        }
    }

    pub fn binding(&self, action: &str) -> Option<&KeyBinding> {
        self.bindings.iter().find(|b| b.action == action)
    }

    /// Resolve a terminal key event to an action name. On duplicate chords
    /// the earliest registration wins.
    pub fn resolve(&self, event: &KeyEvent) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.key.matches(event))
            .map(|b| b.action.as_str())
    }

    /// Bindings that should appear in the footer and help screen.
    pub fn visible(&self) -> impl Iterator<Item = &KeyBinding> {
        self.bindings.iter().filter(|b| b.show)
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_parse_plain_char() {
        let combo: KeyCombo = "q".parse().unwrap();
        assert_eq!(combo.code, KeyCode::Char('q'));
        assert_eq!(combo.modifiers, KeyModifiers::NONE);
    }

    #[test]
    fn test_parse_ctrl_chord() {
        let combo: KeyCombo = "ctrl+p".parse().unwrap();
        assert_eq!(combo.code, KeyCode::Char('p'));
        assert_eq!(combo.modifiers, KeyModifiers::CONTROL);
    }

    #[test]
    fn test_parse_named_and_function_keys() {
        assert_eq!(
            "shift+f2".parse::<KeyCombo>().unwrap().code,
            KeyCode::F(2)
        );
        assert_eq!("enter".parse::<KeyCombo>().unwrap().code, KeyCode::Enter);
        assert_eq!(
            "space".parse::<KeyCombo>().unwrap().code,
            KeyCode::Char(' ')
        );
        assert_eq!(
            "ctrl+alt+delete".parse::<KeyCombo>().unwrap().modifiers,
            KeyModifiers::CONTROL | KeyModifiers::ALT
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("ctrl+".parse::<KeyCombo>().is_err());
        assert!("hyper+x".parse::<KeyCombo>().is_err());
        assert!("f13".parse::<KeyCombo>().is_err());
        assert!("".parse::<KeyCombo>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for chord in ["ctrl+p", "alt+enter", "?", "shift+f2", "space"] {
            let combo: KeyCombo = chord.parse().unwrap();
            assert_eq!(combo.to_string(), chord);
        }
    }

    #[test]
    fn test_matches_ignores_shift_for_chars() {
        let combo: KeyCombo = "?".parse().unwrap();
        assert!(combo.matches(&key(KeyCode::Char('?'), KeyModifiers::NONE)));
        assert!(combo.matches(&key(KeyCode::Char('?'), KeyModifiers::SHIFT)));
        assert!(!combo.matches(&key(KeyCode::Char('?'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_resolve_finds_action() {
        let mut keymap = Keymap::new();
        keymap.register(KeyBinding::new("ctrl+p", "show_palette", "Palette").unwrap());
        keymap.register(KeyBinding::new("?", "toggle_help", "Help").unwrap());

        assert_eq!(
            keymap.resolve(&key(KeyCode::Char('p'), KeyModifiers::CONTROL)),
            Some("show_palette")
        );
        assert_eq!(
            keymap.resolve(&key(KeyCode::Char('?'), KeyModifiers::SHIFT)),
            Some("toggle_help")
        );
        assert_eq!(keymap.resolve(&key(KeyCode::Char('x'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn test_reregister_rebinds_in_place() {
        let mut keymap = Keymap::new();
        keymap.register(KeyBinding::new("ctrl+q", "quit", "Quit").unwrap());
        keymap.register(KeyBinding::new("?", "toggle_help", "Help").unwrap());
        keymap.register(KeyBinding::new("ctrl+d", "quit", "Quit (rebound)").unwrap());

        assert_eq!(keymap.len(), 2);
        let binding = keymap.binding("quit").unwrap();
        assert_eq!(binding.key.to_string(), "ctrl+d");
        // Order slot preserved: quit still first
        assert_eq!(keymap.iter().next().unwrap().action, "quit");
        assert_eq!(
            keymap.resolve(&key(KeyCode::Char('q'), KeyModifiers::CONTROL)),
            None
        );
    }

    #[test]
    fn test_visible_filters_hidden() {
        let mut keymap = Keymap::new();
        keymap.register(KeyBinding::new("ctrl+p", "show_palette", "Palette").unwrap());
        keymap.register(KeyBinding::new("ctrl+l", "redraw", "Redraw").unwrap().hidden());
        let visible: Vec<&str> = keymap.visible().map(|b| b.action.as_str()).collect();
        assert_eq!(visible, vec!["show_palette"]);
    }

    #[test]
    fn test_duplicate_chord_first_registration_wins() {
        let mut keymap = Keymap::new();
        keymap.register(KeyBinding::new("ctrl+x", "first", "").unwrap());
        keymap.register(KeyBinding::new("ctrl+x", "second", "").unwrap());
        assert_eq!(
            keymap.resolve(&key(KeyCode::Char('x'), KeyModifiers::CONTROL)),
            Some("first")
        );
    }
}
