//! Bounded notification log, newest first

use chrono::{DateTime, Local};

/// Maximum number of notifications kept
pub const NOTIFICATION_CAPACITY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Vec<Notification>,
    next_id: u64,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a notification, evicting the oldest beyond capacity
    pub fn push(&mut self, message: impl Into<String>, severity: Severity) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.insert(
            0,
            Notification {
                id,
                message: message.into(),
                severity,
                timestamp: Local::now(),
            },
        );
        self.entries.truncate(NOTIFICATION_CAPACITY);
        id
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eleventh_insert_evicts_oldest() {
        let mut log = NotificationLog::new();
        for i in 0..11 {
            log.push(format!("message {}", i), Severity::Info);
        }
        assert_eq!(log.len(), NOTIFICATION_CAPACITY);
        assert_eq!(log.latest().unwrap().message, "message 10");
        assert!(log.entries().iter().all(|n| n.message != "message 0"));
        assert_eq!(log.entries().last().unwrap().message, "message 1");
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut log = NotificationLog::new();
        let a = log.push("a", Severity::Success);
        let b = log.push("b", Severity::Error);
        assert!(b > a);
    }

    #[test]
    fn test_clear() {
        let mut log = NotificationLog::new();
        log.push("a", Severity::Warning);
        log.clear();
        assert!(log.is_empty());
        assert!(log.latest().is_none());
    }
}
