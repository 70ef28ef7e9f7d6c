//! Session Store
//!
//! Per-browser form state, keyed by a UUID carried in a cookie.
//! DashMap gives concurrent access across sessions without a global lock;
//! each session's state is only touched under its own entry guard.
//!
//! Features:
//! - Idle TTL (30 minutes default), refreshed on every access
//! - Periodic sweep of expired sessions
//! - Unknown or malformed ids start a fresh session

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::form::FormSession;
use crate::models::config::DEFAULT_SESSION_TTL_SECS;

/// Name of the cookie holding the session id
pub const SESSION_COOKIE: &str = "predictor_session";

/// Form state plus last access time
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub form: FormSession,
    pub touched_at: Instant,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            form: FormSession::new(),
            touched_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.touched_at.elapsed() > ttl
    }
}

#[derive(Clone)]
pub struct SessionStore {
    store: Arc<DashMap<String, SessionEntry>>,
    ttl: Duration,
    created: Arc<AtomicU64>,
    expired: Arc<AtomicU64>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_SESSION_TTL_SECS))
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            ttl,
            created: Arc::new(AtomicU64::new(0)),
            expired: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Id to use for this request: the presented one if it is live,
    /// otherwise a fresh one. The flag is true for fresh ids.
    pub fn resolve(&self, presented: Option<&str>) -> (String, bool) {
        if let Some(id) = presented {
            let live = self
                .store
                .get(id)
                .map(|entry| !entry.is_expired(self.ttl))
                .unwrap_or(false);
            if live {
                return (id.to_string(), false);
            }
        }
        (Uuid::new_v4().to_string(), true)
    }

    /// Run `f` on the session's form, creating the session if needed
    pub fn with_session<R>(&self, id: &str, f: impl FnOnce(&mut FormSession) -> R) -> R {
        let mut entry = self.store.entry(id.to_string()).or_insert_with(|| {
            self.created.fetch_add(1, Ordering::Relaxed);
            debug!("🆕 Session created: {}", id);
            SessionEntry::new()
        });

        if entry.is_expired(self.ttl) {
            self.expired.fetch_add(1, Ordering::Relaxed);
            debug!("⌛ Session expired, starting over: {}", id);
            entry.form = FormSession::new();
        }
        entry.touched_at = Instant::now();

        f(&mut entry.form)
    }

    /// Copy of the session's form, if it exists and is live
    pub fn get(&self, id: &str) -> Option<FormSession> {
        self.store
            .get(id)
            .filter(|entry| !entry.is_expired(self.ttl))
            .map(|entry| entry.form.clone())
    }

    /// Drop every session idle longer than the TTL
    pub fn cleanup_expired(&self) -> usize {
        let before = self.store.len();
        self.store.retain(|_, entry| !entry.is_expired(self.ttl));
        let removed = before.saturating_sub(self.store.len());
        if removed > 0 {
            self.expired.fetch_add(removed as u64, Ordering::Relaxed);
            info!("🧹 SESSION CLEANUP: {} expired sessions removed", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            active: self.store.len(),
            created: self.created.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            ttl_secs: self.ttl.as_secs(),
        }
    }
}

/// Session counters for monitoring
#[derive(Debug, Clone)]
pub struct SessionStats {
    pub active: usize,
    pub created: u64,
    pub expired: u64,
    pub ttl_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::form::FormPhase;
    use crate::core::registry::ModelRegistry;
    use crate::models::types::Disease;

    #[test]
    fn test_resolve_issues_fresh_ids() {
        let store = SessionStore::default();
        let (id, fresh) = store.resolve(None);
        assert!(fresh);
        assert!(Uuid::parse_str(&id).is_ok());

        // unknown ids are never adopted
        let (other, fresh) = store.resolve(Some("made-up"));
        assert!(fresh);
        assert_ne!(other, "made-up");
    }

    #[test]
    fn test_sessions_are_independent() {
        let store = SessionStore::default();
        let registry = ModelRegistry::builder().build();

        let (a, _) = store.resolve(None);
        let (b, _) = store.resolve(None);
        store.with_session(&a, |form| form.select(Disease::Parkinsons, &registry));
        store.with_session(&b, |form| form.select(Disease::LungCancer, &registry));

        assert_eq!(store.get(&a).unwrap().disease(), Some(Disease::Parkinsons));
        assert_eq!(store.get(&b).unwrap().disease(), Some(Disease::LungCancer));
        assert_eq!(store.resolve(Some(&a)), (a.clone(), false));
        assert_eq!(store.stats().created, 2);
    }

    #[test]
    fn test_expired_sessions_start_over() {
        let store = SessionStore::new(Duration::ZERO);
        let registry = ModelRegistry::builder().build();
        let (id, _) = store.resolve(None);
        store.with_session(&id, |form| form.select(Disease::HeartDisease, &registry));

        std::thread::sleep(Duration::from_millis(5));
        assert!(store.get(&id).is_none());
        let phase = store.with_session(&id, |form| form.phase());
        assert_eq!(phase, FormPhase::AwaitingSelection);
    }

    #[test]
    fn test_cleanup_expired() {
        let store = SessionStore::new(Duration::ZERO);
        store.with_session("one", |_| ());
        store.with_session("two", |_| ());
        std::thread::sleep(Duration::from_millis(5));

        assert_eq!(store.cleanup_expired(), 2);
        assert!(store.is_empty());
    }
}
