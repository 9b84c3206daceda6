//! User-facing notices raised by the HTTP interceptor.

use std::sync::{Mutex, PoisonError};

/// Sink for error notices. A browser host would render a toast; the CLI
/// prints to stderr.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Emits notices as `tracing` warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!(notice = message, "api notice");
    }
}

/// Keeps every notice in order. Handy for hosts that render them later.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<String>>,
}

impl MemoryNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn notices(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Take and clear the collected notices.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, message: &str) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_owned());
    }
}

#[cfg(test)]
#[path = "notify_test.rs"]
mod tests;
