//! Transient user feedback
//!
//! The notifier holds at most one message. A new message replaces the
//! current one, and each message clears itself after the display duration
//! unless something newer replaced it first.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::debug;

/// How long a message stays visible
pub const DEFAULT_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Error,
}

/// A message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub text: String,
}

#[derive(Debug, Default)]
struct Slot {
    current: Option<Notification>,
    generation: u64,
}

/// Single-message notification channel
#[derive(Debug, Clone)]
pub struct Notifier {
    slot: Arc<Mutex<Slot>>,
    duration: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}

impl Notifier {
    pub fn new(duration: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            duration,
        }
    }

    /// Show a message, replacing the current one. Auto-clear needs a Tokio
    /// runtime; without one the message stays until replaced or cleared.
    pub fn notify(&self, kind: NotificationKind, text: impl Into<String>) {
        let text = text.into();
        debug!("Notification ({:?}): {}", kind, text);

        let generation = {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            slot.generation += 1;
            slot.current = Some(Notification { kind, text });
            slot.generation
        };

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let slot = self.slot.clone();
            let duration = self.duration;
            handle.spawn(async move {
                tokio::time::sleep(duration).await;
                let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
                if slot.generation == generation {
                    slot.current = None;
                }
            });
        }
    }

    pub fn success(&self, text: impl Into<String>) {
        self.notify(NotificationKind::Success, text);
    }

    pub fn info(&self, text: impl Into<String>) {
        self.notify(NotificationKind::Info, text);
    }

    pub fn warning(&self, text: impl Into<String>) {
        self.notify(NotificationKind::Warning, text);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.notify(NotificationKind::Error, text);
    }

    /// The visible message, if any
    pub fn current(&self) -> Option<Notification> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
    }

    pub fn clear(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.generation += 1;
        slot.current = None;
    }
}
