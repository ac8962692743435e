//! User-facing notifications.

use std::sync::{Arc, Mutex};

use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// Queue of pending notifications, drained by whatever renders them.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    queue: Arc<Mutex<Vec<Notification>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, kind: NotificationKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            NotificationKind::Error => error!(%message, "notification"),
            NotificationKind::Warning => warn!(%message, "notification"),
            NotificationKind::Success | NotificationKind::Info => info!(%message, "notification"),
        }
        if let Ok(mut queue) = self.queue.lock() {
            queue.push(Notification { kind, message });
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(NotificationKind::Success, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.push(NotificationKind::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(NotificationKind::Error, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(NotificationKind::Info, message);
    }

    /// Take every pending notification.
    pub fn drain(&self) -> Vec<Notification> {
        self.queue
            .lock()
            .map(|mut q| std::mem::take(&mut *q))
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.queue.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_the_queue() {
        let n = Notifier::new();
        n.success("Quest generated");
        n.error("boom");
        assert_eq!(n.snapshot().len(), 2);
        let drained = n.drain();
        assert_eq!(drained[0].kind, NotificationKind::Success);
        assert_eq!(drained[1].message, "boom");
        assert!(n.drain().is_empty());
    }
}
