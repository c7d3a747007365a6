//! User-facing notifications.
//!
//! Handlers and controllers report outcomes through a [`NotificationSink`]
//! instead of a global toast provider; the client drains them over HTTP.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::clock::Clock;
use crate::models::{Notification, NotificationKind, DEFAULT_NOTIFICATION_MS};

pub trait NotificationSink: Send + Sync {
    fn notify_for(&self, kind: NotificationKind, message: &str, duration_ms: u64);

    fn notify(&self, kind: NotificationKind, message: &str) {
        self.notify_for(kind, message, DEFAULT_NOTIFICATION_MS);
    }
}

/// Bounded in-memory sink; the oldest notification is dropped when full.
pub struct MemoryNotifications {
    clock: Arc<dyn Clock>,
    capacity: usize,
    next_id: AtomicU64,
    queue: Mutex<VecDeque<Notification>>,
}

impl MemoryNotifications {
    pub fn new(clock: Arc<dyn Clock>, capacity: usize) -> Self {
        Self {
            clock,
            capacity: capacity.max(1),
            next_id: AtomicU64::new(1),
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// Remove and return every queued notification, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    /// Queued notifications without removing them.
    #[cfg(test)]
    pub fn snapshot(&self) -> Vec<Notification> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

impl NotificationSink for MemoryNotifications {
    fn notify_for(&self, kind: NotificationKind, message: &str, duration_ms: u64) {
        match kind {
            NotificationKind::Error => tracing::warn!(kind = kind.as_str(), "{}", message),
            _ => tracing::info!(kind = kind.as_str(), "{}", message),
        }

        let notification = Notification {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            kind,
            message: message.to_string(),
            duration_ms,
            created_at: self.clock.now(),
        };

        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        if queue.len() == self.capacity {
            queue.pop_front();
        }
        queue.push_back(notification);
    }
}

/// Sink for requests made outside the session. Outcomes are logged, never queued.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOnlyNotifications;

impl NotificationSink for LogOnlyNotifications {
    fn notify_for(&self, kind: NotificationKind, message: &str, _duration_ms: u64) {
        tracing::info!(kind = kind.as_str(), "Public request: {}", message);
    }
}
