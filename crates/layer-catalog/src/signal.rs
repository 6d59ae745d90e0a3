//! Per-category change signals.

use chrono::{DateTime, Utc};
use tokio::sync::watch;

/// Snapshot carried by a category signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryVersion {
    /// Incremented once per change to the category
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

impl CategoryVersion {
    fn initial() -> Self {
        Self {
            version: 0,
            updated_at: Utc::now(),
        }
    }
}

/// Sender side of a category's change notifications.
///
/// Receivers obtained from [`CategorySignal::subscribe`] see every bump as a
/// `changed()` wakeup. Bumping never fails, even with no receivers.
#[derive(Debug)]
pub struct CategorySignal {
    tx: watch::Sender<CategoryVersion>,
}

impl Default for CategorySignal {
    fn default() -> Self {
        Self::new()
    }
}

impl CategorySignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(CategoryVersion::initial());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<CategoryVersion> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> CategoryVersion {
        *self.tx.borrow()
    }

    /// Record a change and wake all receivers.
    pub fn bump(&self) {
        self.tx.send_modify(|v| {
            v.version += 1;
            // Keep timestamps monotonic even if the wall clock steps back.
            v.updated_at = Utc::now().max(v.updated_at);
        });
    }
}
