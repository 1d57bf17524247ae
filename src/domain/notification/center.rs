use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::metrics::Metrics;
use super::value_objects::{Notification, NotificationId, NotificationKind};

// ============================================================================
// Notification Center
// ============================================================================
//
// Owns the ordered list of active notifications (oldest first) and one
// cancellable expiry task per timed notification, keyed by id.
//
// - Every mutation goes through this type
// - Removing a notification aborts its expiry task
// - An expiry task firing for an id that is gone is a no-op
//
// ============================================================================

pub const DEFAULT_EXPIRY: Duration = Duration::from_millis(5000);

#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Inner>,
}

struct Inner {
    active: watch::Sender<Vec<Notification>>,
    timers: Mutex<HashMap<NotificationId, JoinHandle<()>>>,
    default_expiry: Duration,
    metrics: Option<Arc<Metrics>>,
}

impl NotificationCenter {
    pub fn new(default_expiry: Duration) -> Self {
        Self::build(default_expiry, None)
    }

    pub fn new_with_metrics(default_expiry: Duration, metrics: Arc<Metrics>) -> Self {
        Self::build(default_expiry, Some(metrics))
    }

    fn build(default_expiry: Duration, metrics: Option<Arc<Metrics>>) -> Self {
        let (active, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner {
                active,
                timers: Mutex::new(HashMap::new()),
                default_expiry,
                metrics,
            }),
        }
    }

    pub fn default_expiry(&self) -> Duration {
        self.inner.default_expiry
    }

    pub fn success(&self, message: impl Into<String>) -> NotificationId {
        self.add(message, NotificationKind::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> NotificationId {
        self.add(message, NotificationKind::Error)
    }

    /// Add a notification that expires after the default duration.
    pub fn add(&self, message: impl Into<String>, kind: NotificationKind) -> NotificationId {
        self.add_with_expiry(message, kind, self.inner.default_expiry)
    }

    /// Append a notification and, unless `expiry` is zero, schedule its removal.
    ///
    /// Expiry is scheduled on the current tokio runtime. Outside of one the
    /// notification is still added but stays until removed.
    pub fn add_with_expiry(
        &self,
        message: impl Into<String>,
        kind: NotificationKind,
        expiry: Duration,
    ) -> NotificationId {
        let notification = Notification::new(message.into(), kind, expiry);
        let id = notification.id();

        self.inner.active.send_modify(|active| {
            active.push(notification);
            if let Some(metrics) = &self.inner.metrics {
                metrics.record_notification_raised(kind.as_str(), active.len());
            }
        });

        tracing::debug!(
            notification_id = %id,
            kind = kind.as_str(),
            expiry_ms = expiry.as_millis() as u64,
            "Notification added"
        );

        if !expiry.is_zero() {
            match tokio::runtime::Handle::try_current() {
                Ok(runtime) => {
                    let weak = Arc::downgrade(&self.inner);
                    let mut timers = self.inner.lock_timers();
                    let handle = runtime.spawn(expire_after(weak, id, expiry));
                    timers.insert(id, handle);
                }
                Err(e) => {
                    tracing::warn!(
                        notification_id = %id,
                        error = %e,
                        "No tokio runtime; notification will not expire"
                    );
                }
            }
        }

        id
    }

    /// Remove a notification. Removing an unknown id does nothing.
    pub fn remove(&self, id: NotificationId) -> bool {
        if let Some(handle) = self.inner.lock_timers().remove(&id) {
            handle.abort();
        }

        let removed = self.inner.remove_active(id, "dismissed");
        if removed {
            tracing::debug!(notification_id = %id, "Notification dismissed");
        }
        removed
    }

    /// Remove every notification and cancel every pending expiry.
    pub fn clear_all(&self) {
        let cancelled: Vec<_> = self.inner.lock_timers().drain().collect();
        for (_, handle) in &cancelled {
            handle.abort();
        }

        let mut cleared = 0;
        self.inner.active.send_if_modified(|active| {
            cleared = active.len();
            active.clear();
            if let Some(metrics) = &self.inner.metrics {
                metrics.record_notifications_removed("cleared", cleared, 0);
            }
            cleared > 0
        });

        tracing::debug!(
            cleared = cleared,
            cancelled_timers = cancelled.len(),
            "Notifications cleared"
        );
    }

    /// Snapshot of the active notifications, oldest first.
    pub fn current(&self) -> Vec<Notification> {
        self.inner.active.borrow().clone()
    }

    pub fn get(&self, id: NotificationId) -> Option<Notification> {
        self.inner
            .active
            .borrow()
            .iter()
            .find(|n| n.id() == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.active.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of expiry tasks that have not fired or been cancelled yet
    pub fn pending_timers(&self) -> usize {
        self.inner.lock_timers().len()
    }

    /// Receiver that observes every change of the active list.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.inner.active.subscribe()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_EXPIRY)
    }
}

impl Inner {
    fn lock_timers(&self) -> MutexGuard<'_, HashMap<NotificationId, JoinHandle<()>>> {
        // The map stays consistent even if a holder panicked
        self.timers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn remove_active(&self, id: NotificationId, reason: &str) -> bool {
        self.active.send_if_modified(|active| {
            let before = active.len();
            active.retain(|n| n.id() != id);
            let removed = active.len() != before;
            if removed {
                if let Some(metrics) = &self.metrics {
                    metrics.record_notifications_removed(reason, 1, active.len());
                }
            }
            removed
        })
    }

    fn expire(&self, id: NotificationId) {
        // The task is finishing on its own; drop the handle without aborting
        self.lock_timers().remove(&id);

        if self.remove_active(id, "expired") {
            tracing::debug!(notification_id = %id, "Notification expired");
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let timers = self.timers.get_mut().unwrap_or_else(|poisoned| poisoned.into_inner());
        for (_, handle) in timers.drain() {
            handle.abort();
        }
    }
}

async fn expire_after(center: Weak<Inner>, id: NotificationId, expiry: Duration) {
    tokio::time::sleep(expiry).await;
    if let Some(inner) = center.upgrade() {
        inner.expire(id);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
