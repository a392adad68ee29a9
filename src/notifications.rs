use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

use crate::constants::MAX_TOASTS;

/// Severity of a user-visible notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

/// A transient message shown to the user (toast)
#[derive(Debug, Clone)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Toast {
    /// Timestamped single-line rendering, e.g. `[12:00:01.250] ❌ Search failed`
    pub fn display(&self) -> String {
        format!("[{}] {}", self.at.format("%H:%M:%S%.3f"), self.message)
    }
}

/// Shared notification sink that controllers report to and views drain
#[derive(Clone)]
pub struct Notifier {
    toasts: Arc<Mutex<Vec<Toast>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            toasts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a notification, dropping the oldest once [`MAX_TOASTS`] are held
    pub fn push(&self, level: ToastLevel, message: impl Into<String>) {
        let toast = Toast {
            level,
            message: message.into(),
            at: Utc::now(),
        };

        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.push(toast);
            if toasts.len() > MAX_TOASTS {
                let excess = toasts.len() - MAX_TOASTS;
                toasts.drain(..excess);
            }
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(ToastLevel::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(ToastLevel::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(ToastLevel::Error, message);
    }

    /// Most recent notification, if any
    pub fn latest(&self) -> Option<Toast> {
        self.toasts.lock().ok().and_then(|toasts| toasts.last().cloned())
    }

    /// Get all notifications sorted by date (newest first)
    pub fn get_toasts(&self) -> Vec<Toast> {
        if let Ok(toasts) = self.toasts.lock() {
            let mut sorted = toasts.clone();
            sorted.reverse();
            sorted
        } else {
            Vec::new()
        }
    }

    /// Take every pending notification in the order they were raised
    pub fn drain(&self) -> Vec<Toast> {
        if let Ok(mut toasts) = self.toasts.lock() {
            std::mem::take(&mut *toasts)
        } else {
            Vec::new()
        }
    }

    /// Clear all notifications
    pub fn clear(&self) {
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.clear();
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
