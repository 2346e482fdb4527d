//! Notification context.
//!
//! One owner creates a [`Notifier`] and hands clones to every component that
//! may report something. All clones write the same single slot, so exactly
//! one notification is visible at a time and a new one replaces the last.
//! Front ends read the slot with [`Notifier::current`] or follow it with
//! [`Notifier::subscribe`].

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

/// Notification severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Info,
    Success,
}

impl Severity {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Success => "success",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `{visible, severity, message}` triple a notification widget renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notification {
    /// Whether the widget is showing.
    pub visible: bool,
    /// Severity (affects styling).
    pub severity: Severity,
    /// Text to show.
    pub message: String,
}

impl Notification {
    /// Creates a visible notification.
    pub fn shown(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            visible: true,
            severity,
            message: message.into(),
        }
    }

    /// Creates a visible error notification.
    pub fn error(message: impl Into<String>) -> Self {
        Self::shown(Severity::Error, message)
    }
}

/// Shared handle to the page's notification slot.
#[derive(Debug, Clone)]
pub struct Notifier {
    slot: Arc<watch::Sender<Notification>>,
}

impl Notifier {
    /// Creates a new slot holding a hidden notification.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Notification::default());
        Self { slot: Arc::new(tx) }
    }

    /// Replaces the current notification.
    pub fn show(&self, notification: Notification) {
        log::debug!(
            "notification ({}, visible={}): {}",
            notification.severity,
            notification.visible,
            notification.message
        );
        self.slot.send_replace(notification);
    }

    /// Shows a message at the given severity.
    pub fn notify(&self, severity: Severity, message: impl Into<String>) {
        self.show(Notification::shown(severity, message));
    }

    /// Shows an error message.
    pub fn error(&self, message: impl Into<String>) {
        self.notify(Severity::Error, message);
    }

    /// Hides the notification, keeping its last message and severity.
    pub fn dismiss(&self) {
        self.slot.send_if_modified(|current| {
            let was_visible = current.visible;
            current.visible = false;
            was_visible
        });
    }

    /// Returns a copy of the current notification.
    pub fn current(&self) -> Notification {
        self.slot.borrow().clone()
    }

    /// Returns a receiver that wakes on every change.
    pub fn subscribe(&self) -> watch::Receiver<Notification> {
        self.slot.subscribe()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
