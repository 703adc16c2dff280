//! Single-slot user notifications
//!
//! At most one notification is visible at a time. Showing a new one replaces
//! the previous one, and every notification is cleared after a fixed display
//! window unless something newer replaced it first.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{sync::watch, time::sleep};
use tracing::debug;

/// Kind of notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NotificationKind::Success => write!(f, "[ok] {}", self.message),
            NotificationKind::Error => write!(f, "[error] {}", self.message),
        }
    }
}

/// Owner of the notification slot
#[derive(Clone)]
pub struct NotificationCenter {
    slot: Arc<watch::Sender<Option<Notification>>>,
    generation: Arc<AtomicU64>,
    display_window: Duration,
}

impl NotificationCenter {
    /// Create a notification center whose entries expire after `display_window`
    pub fn new(display_window: Duration) -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            slot: Arc::new(slot),
            generation: Arc::new(AtomicU64::new(0)),
            display_window,
        }
    }

    /// Show `notification`, replacing whatever is visible
    ///
    /// Must be called from within a tokio runtime; the expiry timer is a
    /// spawned task.
    pub fn show(&self, notification: Notification) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(%notification, "showing notification");
        self.slot.send_replace(Some(notification));

        let slot = Arc::clone(&self.slot);
        let current = Arc::clone(&self.generation);
        let window = self.display_window;
        tokio::spawn(async move {
            sleep(window).await;
            if current.load(Ordering::SeqCst) == generation {
                slot.send_replace(None);
            }
        });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(Notification::success(message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(Notification::error(message));
    }

    /// Clear the visible notification, if any
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.slot.send_replace(None);
    }

    /// Currently visible notification
    pub fn current(&self) -> Option<Notification> {
        self.slot.borrow().clone()
    }

    /// Receiver notified on every change of the slot
    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.slot.subscribe()
    }
}
