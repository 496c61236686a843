//! User-facing notices for failed cart operations.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;

/// A failure that is reported to the user.
///
/// Successful operations never produce a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    /// Adding a product failed for a reason other than stock.
    AddFailed,
    /// The requested or resulting amount is above the available stock.
    OutOfStock,
    /// The product to remove is not in the cart, or the removal failed.
    RemoveFailed,
    /// Changing an amount failed for a reason other than stock.
    UpdateFailed,
}

impl Notice {
    /// The message shown to the user.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::AddFailed => "Error adding product",
            Self::OutOfStock => "Requested quantity out of stock",
            Self::RemoveFailed => "Error removing product",
            Self::UpdateFailed => "Error changing product amount",
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Fire-and-forget sink for user notices.
pub trait Notifier: Send + Sync {
    /// Show a notice to the user. Must not block or fail.
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        tracing::warn!(notice = ?notice, "{}", notice.message());
    }
}

/// Collects notices in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices received so far, oldest first.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return all notices received so far.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_keeps_order() {
        let recorder = RecordingNotifier::new();
        recorder.notify(Notice::OutOfStock);
        recorder.notify(Notice::RemoveFailed);
        assert_eq!(
            recorder.notices(),
            vec![Notice::OutOfStock, Notice::RemoveFailed]
        );
        assert_eq!(recorder.take().len(), 2);
        assert!(recorder.notices().is_empty());
    }

    #[test]
    fn test_notice_messages_are_distinct() {
        let all = [
            Notice::AddFailed,
            Notice::OutOfStock,
            Notice::RemoveFailed,
            Notice::UpdateFailed,
        ];
        let messages: std::collections::HashSet<_> = all.iter().map(|n| n.message()).collect();
        assert_eq!(messages.len(), all.len());
    }
}
