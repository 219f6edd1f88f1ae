//! Player-facing notification sink.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// How prominently a notification should be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// Convert to u8 for FFI compatibility
    pub fn as_u8(self) -> u8 {
        match self {
            Severity::Info => 0,
            Severity::Success => 1,
            Severity::Warning => 2,
            Severity::Error => 3,
        }
    }
}

/// Receives short messages meant for the player.
///
/// Implementations must not block; they are called from inside the tick.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

/// Forwards notifications to the `tracing` log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info | Severity::Success => tracing::info!("[notify] {message}"),
            Severity::Warning => tracing::warn!("[notify] {message}"),
            Severity::Error => tracing::error!("[notify] {message}"),
        }
    }
}

/// Discards every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl NotificationSink for NullNotifier {
    fn notify(&self, _message: &str, _severity: Severity) {}
}

/// A notification kept by `NotificationLog`
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

/// Notifications a `NotificationLog` keeps before dropping the oldest
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 256;

/// Collects notifications until the host drains them.
///
/// Holds at most `capacity` entries; a full log drops its oldest entry to
/// make room.
#[derive(Debug)]
pub struct NotificationLog {
    entries: Mutex<VecDeque<Notification>>,
    capacity: usize,
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_NOTIFICATION_CAPACITY)
    }
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log keeping at most `capacity` (at least one) notifications
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn entries(&self) -> MutexGuard<'_, VecDeque<Notification>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Take every pending notification, oldest first
    pub fn drain(&self) -> Vec<Notification> {
        self.entries().drain(..).collect()
    }

    /// Take the oldest pending notification
    pub fn pop_front(&self) -> Option<Notification> {
        self.entries().pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any pending notification contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|n| n.message.contains(needle))
    }
}

impl NotificationSink for NotificationLog {
    fn notify(&self, message: &str, severity: Severity) {
        let mut entries = self.entries();
        if entries.len() >= self.capacity {
            if let Some(dropped) = entries.pop_front() {
                tracing::debug!("Notification log full, dropping: {}", dropped.message);
            }
        }
        entries.push_back(Notification {
            message: message.to_string(),
            severity,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_collects_in_order() {
        let log = NotificationLog::new();
        log.notify("first", Severity::Info);
        log.notify("second", Severity::Warning);
        assert_eq!(log.len(), 2);
        assert!(log.contains("sec"));

        let first = log.pop_front().unwrap();
        assert_eq!(first.message, "first");
        let rest = log.drain();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].severity, Severity::Warning);
        assert!(log.is_empty());
    }

    #[test]
    fn test_full_log_drops_oldest() {
        let log = NotificationLog::with_capacity(3);
        for i in 0..5 {
            log.notify(&format!("message {i}"), Severity::Info);
        }
        assert_eq!(log.len(), 3);
        let kept: Vec<_> = log.drain().into_iter().map(|n| n.message).collect();
        assert_eq!(kept, ["message 2", "message 3", "message 4"]);

        log.notify("after drain", Severity::Info);
        assert_eq!(log.pop_front().unwrap().message, "after drain");
        assert!(log.pop_front().is_none());
    }
}
