//! Per-session diagnosis history.
//!
//! Only diagnosed results are recorded. Entries are immutable once appended; the store owns the
//! only lock, so concurrent requests for the same session serialise on append here rather than
//! inside the cascade.

use crate::constants::MAX_HISTORY_SESSIONS;
use chrono::{DateTime, Utc};
use medassist_types::DiagnosisLabel;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// One recorded diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub input: String,
    pub diagnosis: DiagnosisLabel,
    pub confidence: f64,
    pub recommendation: String,
}

#[derive(Debug, Default)]
struct Sessions {
    entries: HashMap<Uuid, Vec<HistoryEntry>>,
    /// Session ids, oldest first.
    created: VecDeque<Uuid>,
}

/// Bounded in-memory history keyed by session id.
///
/// A session exists only once something has been appended to it. When the store is full, the
/// session created longest ago is dropped to make room for a new one.
#[derive(Debug)]
pub struct HistoryStore {
    sessions: Mutex<Sessions>,
    capacity: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::with_capacity(MAX_HISTORY_SESSIONS)
    }
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding at most `capacity` sessions (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: Mutex::new(Sessions::default()),
            capacity: capacity.max(1),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, Sessions> {
        // Appends cannot panic between their updates, so a poisoned map is still consistent.
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Appends an entry to `session`, creating the session if it does not exist yet.
    pub fn append(&self, session: Uuid, entry: HistoryEntry) {
        tracing::debug!(%session, diagnosis = %entry.diagnosis, "history append");
        let mut sessions = self.sessions();
        if !sessions.entries.contains_key(&session) {
            while sessions.created.len() >= self.capacity {
                let Some(oldest) = sessions.created.pop_front() else {
                    break;
                };
                sessions.entries.remove(&oldest);
                tracing::debug!(session = %oldest, "history session evicted");
            }
            sessions.created.push_back(session);
        }
        sessions.entries.entry(session).or_default().push(entry);
    }

    /// Returns a snapshot of the session's entries, or `None` for an unknown session.
    pub fn entries(&self, session: Uuid) -> Option<Vec<HistoryEntry>> {
        self.sessions().entries.get(&session).cloned()
    }

    /// Number of sessions currently held.
    pub fn len(&self) -> usize {
        self.sessions().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn entry(diagnosis: &str) -> HistoryEntry {
        HistoryEntry {
            timestamp: Utc::now(),
            input: "fiebre y tos".into(),
            diagnosis: DiagnosisLabel::new(diagnosis).expect("valid label"),
            confidence: 85.0,
            recommendation: "Reposo.".into(),
        }
    }

    #[test]
    fn session_exists_only_after_first_append() {
        let store = HistoryStore::new();
        let session = Uuid::new_v4();
        assert!(store.entries(session).is_none());
        assert!(store.is_empty());

        store.append(session, entry("Gripe"));
        assert_eq!(store.entries(session).expect("session").len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn full_store_evicts_oldest_session() {
        let store = HistoryStore::with_capacity(2);
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        store.append(a, entry("Gripe"));
        store.append(b, entry("Migraña"));
        // Appending to an existing session never evicts.
        store.append(a, entry("Resfriado"));
        assert_eq!(store.len(), 2);

        store.append(c, entry("Dermatitis"));
        assert_eq!(store.len(), 2);
        assert!(store.entries(a).is_none());
        assert_eq!(store.entries(b).expect("session b").len(), 1);
        assert_eq!(store.entries(c).expect("session c").len(), 1);
    }

    #[test]
    fn unknown_session_has_no_entries() {
        let store = HistoryStore::new();
        assert!(store.entries(Uuid::new_v4()).is_none());
    }

    #[test]
    fn append_keeps_order_per_session() {
        let store = HistoryStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        store.append(a, entry("Gripe"));
        store.append(b, entry("Migraña"));
        store.append(a, entry("Resfriado"));

        let a_entries = store.entries(a).expect("session a");
        let labels: Vec<&str> = a_entries.iter().map(|e| e.diagnosis.as_str()).collect();
        assert_eq!(labels, vec!["Gripe", "Resfriado"]);
        assert_eq!(store.entries(b).expect("session b").len(), 1);
    }

    #[test]
    fn concurrent_appends_are_all_recorded() {
        let store = Arc::new(HistoryStore::new());
        let session = Uuid::new_v4();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        store.append(session, entry("Gripe"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread");
        }

        assert_eq!(store.entries(session).expect("session").len(), 200);
    }
}
