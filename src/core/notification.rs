//! # Notification Center
//!
//! A bounded FIFO of transient messages. New entries evict the oldest once
//! the cap is reached; entries with a duration expire on their own when the
//! event loop sweeps them.
//!
//! The center holds plain data. Rendering lives in
//! `tui::components::notifications`.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use log::debug;
use uuid::Uuid;

/// How many notifications are kept (and drawn) at once by default.
pub const DEFAULT_MAX_NOTIFICATIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub severity: Severity,
    /// Wall-clock creation time, shown in the rendered entry.
    pub timestamp: DateTime<Local>,
    /// How long the entry stays up; `None` means until evicted or dismissed.
    pub duration: Option<Duration>,
    posted: Instant,
}

impl Notification {
    fn new(message: String, severity: Severity, duration: Option<Duration>) -> Self {
        Self {
            id: Uuid::new_v4(),
            message,
            severity,
            timestamp: Local::now(),
            duration,
            posted: Instant::now(),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        match self.duration {
            Some(duration) => now.duration_since(self.posted) >= duration,
            None => false,
        }
    }
}

/// Bounded, oldest-first-evicting notification queue.
#[derive(Debug)]
pub struct NotificationCenter {
    max_notifications: usize,
    items: VecDeque<Notification>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_NOTIFICATIONS)
    }
}

impl NotificationCenter {
    pub fn new(max_notifications: usize) -> Self {
        Self {
            max_notifications: max_notifications.max(1),
            items: VecDeque::new(),
        }
    }

    /// Append a notification, evicting from the front while over the cap.
    /// Returns the new entry's id so callers can dismiss it later.
    pub fn notify(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
        duration: Option<Duration>,
    ) -> Uuid {
        let notification = Notification::new(message.into(), severity, duration);
        let id = notification.id;
        debug!("Notification [{severity}]: {}", notification.message);
        self.items.push_back(notification);
        while self.items.len() > self.max_notifications {
            self.items.pop_front();
        }
        id
    }

    /// Remove a specific notification. Returns whether it was present.
    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    /// Drop entries whose duration has elapsed. Returns whether anything
    /// changed so the caller knows a redraw is due.
    pub fn expire_stale(&mut self, now: Instant) -> bool {
        let before = self.items.len();
        self.items.retain(|n| !n.is_expired(now));
        self.items.len() != before
    }

    pub fn clear_all(&mut self) {
        self.items.clear();
    }

    /// Oldest to newest; reversible so the renderer can stack newest-first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn max_notifications(&self) -> usize {
        self.max_notifications
    }
}
