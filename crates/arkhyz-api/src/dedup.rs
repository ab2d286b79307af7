use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use arkhyz_types::RecordKind;

/// Remembers recent idempotency keys so a resubmitted form (double click,
/// retry after a slow response) does not create a second row.
pub struct SubmissionGuard {
    window: Duration,
    entries: Mutex<HashMap<(RecordKind, String), Entry>>,
}

struct Entry {
    state: EntryState,
    at: Instant,
}

enum EntryState {
    Pending,
    Stored(i64),
}

/// Outcome of [`SubmissionGuard::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// First sighting; the caller must later call `complete` or `release`.
    Proceed,
    /// Already stored inside the window under this id.
    Replay(i64),
    /// An earlier request with the same key has not finished yet.
    InFlight,
}

impl SubmissionGuard {
    /// A zero window disables the guard.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.window.is_zero()
    }

    pub fn begin(&self, kind: RecordKind, key: &str) -> Admission {
        self.begin_at(kind, key, Instant::now())
    }

    pub fn complete(&self, kind: RecordKind, key: &str, id: i64) {
        self.complete_at(kind, key, id, Instant::now());
    }

    /// Forget a key whose submission failed so the client may retry.
    pub fn release(&self, kind: RecordKind, key: &str) {
        if !self.is_enabled() {
            return;
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(&(kind, key.to_string()));
        }
    }

    fn begin_at(&self, kind: RecordKind, key: &str, now: Instant) -> Admission {
        if !self.is_enabled() {
            return Admission::Proceed;
        }
        let Ok(mut entries) = self.entries.lock() else {
            return Admission::Proceed;
        };

        entries.retain(|_, e| now.saturating_duration_since(e.at) < self.window);

        let slot = (kind, key.to_string());
        let seen = entries.get(&slot).map(|e| match e.state {
            EntryState::Stored(id) => Admission::Replay(id),
            EntryState::Pending => Admission::InFlight,
        });
        if let Some(admission) = seen {
            return admission;
        }

        entries.insert(slot, Entry { state: EntryState::Pending, at: now });
        Admission::Proceed
    }

    fn complete_at(&self, kind: RecordKind, key: &str, id: i64, now: Instant) {
        if !self.is_enabled() {
            return;
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert((kind, key.to_string()), Entry { state: EntryState::Stored(id), at: now });
        }
    }
}
