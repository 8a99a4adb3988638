//! Session-scoped page state
//!
//! Tracks whether the loader already played in this browsing session and
//! when the user was last active. Returning visitors skip the loader; a
//! viewport class change or a long idle period makes it play again.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::Result;

/// Minimum gap between storage writes caused only by user activity
const ACTIVITY_PERSIST_INTERVAL_SECS: i64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: Uuid,
    #[serde(default)]
    pub loader_played: bool,
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
}

impl SessionRecord {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            loader_played: false,
            last_activity: None,
        }
    }
}

impl Default for SessionRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Backing store for the session record (sessionStorage in a browser)
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<Option<SessionRecord>>;
    fn store(&self, record: &SessionRecord) -> Result<()>;
}

/// Storage that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    record: Mutex<Option<SessionRecord>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: SessionRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<SessionRecord>> {
        Ok(self
            .record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn store(&self, record: &SessionRecord) -> Result<()> {
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = Some(record.clone());
        Ok(())
    }
}

/// JSON file storage, so separate headless runs share one "session"
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Option<SessionRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn store(&self, record: &SessionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(record)?)?;
        Ok(())
    }
}

pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
    record: Mutex<SessionRecord>,
    idle_timeout: Duration,
    persisted_activity: Mutex<Option<DateTime<Utc>>>,
}

impl SessionStore {
    /// Open the session; unreadable storage starts a fresh session
    pub fn open(storage: Box<dyn SessionStorage>, idle_timeout: std::time::Duration) -> Self {
        let record = match storage.load() {
            Ok(Some(record)) => record,
            Ok(None) => SessionRecord::new(),
            Err(e) => {
                warn!("Failed to read session state, starting fresh: {}", e);
                SessionRecord::new()
            }
        };
        let idle_timeout = Duration::from_std(idle_timeout).unwrap_or(Duration::MAX);

        Self {
            storage,
            persisted_activity: Mutex::new(record.last_activity),
            record: Mutex::new(record),
            idle_timeout,
        }
    }

    /// In-memory session with the given idle timeout
    pub fn in_memory(idle_timeout: std::time::Duration) -> Self {
        Self::open(Box::new(MemorySessionStorage::new()), idle_timeout)
    }

    pub fn session_id(&self) -> Uuid {
        self.record().session_id
    }

    pub fn snapshot(&self) -> SessionRecord {
        self.record().clone()
    }

    /// True when the loader played this session and the user has not been idle too long.
    /// An expired idle window clears the flag as a side effect.
    pub fn loader_already_played(&self, now: DateTime<Utc>) -> bool {
        let mut record = self.record();
        if record.loader_played && self.idle_expired(&record, now) {
            debug!("Session idle beyond timeout, loader will replay");
            record.loader_played = false;
            self.persist(&record);
        }
        record.loader_played
    }

    pub fn mark_loader_played(&self, now: DateTime<Utc>) {
        let mut record = self.record();
        record.loader_played = true;
        record.last_activity = Some(now);
        self.persist(&record);
    }

    pub fn clear_loader_flag(&self) {
        let mut record = self.record();
        if record.loader_played {
            record.loader_played = false;
            self.persist(&record);
        }
    }

    /// Note user input; input after a long idle gap clears the loader flag.
    /// Storage is written when the flag changes, otherwise at most once every
    /// ten seconds.
    pub fn record_activity(&self, now: DateTime<Utc>) {
        let mut record = self.record();
        let mut flag_cleared = false;
        if record.loader_played && self.idle_expired(&record, now) {
            debug!("Activity after idle timeout, clearing loader flag");
            record.loader_played = false;
            flag_cleared = true;
        }
        record.last_activity = Some(now);
        if flag_cleared || self.activity_write_due(now) {
            self.persist(&record);
        }
    }

    fn activity_write_due(&self, now: DateTime<Utc>) -> bool {
        self.persisted_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map(|last| {
                now.signed_duration_since(last) >= Duration::seconds(ACTIVITY_PERSIST_INTERVAL_SECS)
            })
            .unwrap_or(true)
    }

    fn idle_expired(&self, record: &SessionRecord, now: DateTime<Utc>) -> bool {
        record
            .last_activity
            .map(|last| now.signed_duration_since(last) > self.idle_timeout)
            .unwrap_or(false)
    }

    fn record(&self) -> MutexGuard<'_, SessionRecord> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, record: &SessionRecord) {
        match self.storage.store(record) {
            Ok(()) => {
                *self
                    .persisted_activity
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = record.last_activity;
            }
            Err(e) => warn!("Failed to persist session state: {}", e),
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("record", &*self.record())
            .field("idle_timeout", &self.idle_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingStorage {
        inner: MemorySessionStorage,
        writes: Arc<AtomicUsize>,
    }

    impl SessionStorage for CountingStorage {
        fn load(&self) -> Result<Option<SessionRecord>> {
            self.inner.load()
        }

        fn store(&self, record: &SessionRecord) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.store(record)
        }
    }

    const IDLE: std::time::Duration = std::time::Duration::from_secs(300);

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_fresh_session_has_not_played() {
        let store = SessionStore::in_memory(IDLE);
        assert!(!store.loader_already_played(at(0)));
    }

    #[test]
    fn test_revisit_within_idle_window_skips() {
        let store = SessionStore::in_memory(IDLE);
        store.mark_loader_played(at(0));
        assert!(store.loader_already_played(at(120)));
    }

    #[test]
    fn test_idle_beyond_timeout_replays() {
        let store = SessionStore::in_memory(IDLE);
        store.mark_loader_played(at(0));
        assert!(!store.loader_already_played(at(301)));
        // The flag stays cleared afterwards
        assert!(!store.loader_already_played(at(302)));
    }

    #[test]
    fn test_activity_keeps_session_warm() {
        let store = SessionStore::in_memory(IDLE);
        store.mark_loader_played(at(0));
        store.record_activity(at(250));
        store.record_activity(at(500));
        assert!(store.loader_already_played(at(700)));
    }

    #[test]
    fn test_activity_after_idle_clears_flag() {
        let store = SessionStore::in_memory(IDLE);
        store.mark_loader_played(at(0));
        store.record_activity(at(1000));
        assert!(!store.snapshot().loader_played);
    }

    #[test]
    fn test_input_bursts_are_written_sparingly() {
        let storage = CountingStorage::default();
        let writes = storage.writes.clone();
        let store = SessionStore::open(Box::new(storage), IDLE);
        store.mark_loader_played(at(0));
        assert_eq!(writes.load(Ordering::SeqCst), 1);

        for secs in 1..10 {
            store.record_activity(at(secs));
        }
        assert_eq!(writes.load(Ordering::SeqCst), 1);
        assert_eq!(store.snapshot().last_activity, Some(at(9)));

        store.record_activity(at(10));
        assert_eq!(writes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_idle_clear_is_written_immediately() {
        let storage = CountingStorage::default();
        let writes = storage.writes.clone();
        let store = SessionStore::open(Box::new(storage), std::time::Duration::from_secs(5));
        store.mark_loader_played(at(0));
        store.record_activity(at(3));
        assert_eq!(writes.load(Ordering::SeqCst), 1);

        store.record_activity(at(9));
        assert_eq!(writes.load(Ordering::SeqCst), 2);
        assert!(!store.snapshot().loader_played);
    }

    #[test]
    fn test_clear_flag() {
        let store = SessionStore::in_memory(IDLE);
        store.mark_loader_played(at(0));
        store.clear_loader_flag();
        assert!(!store.loader_already_played(at(1)));
    }

    #[test]
    fn test_state_survives_reopen_of_same_storage() {
        let mut record = SessionRecord::new();
        record.loader_played = true;
        record.last_activity = Some(at(0));
        let id = record.session_id;

        let store = SessionStore::open(Box::new(MemorySessionStorage::with_record(record)), IDLE);
        assert_eq!(store.session_id(), id);
        assert!(store.loader_already_played(at(10)));
    }
}
