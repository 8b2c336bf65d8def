use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;

use crate::analytics::AnalyticsState;
use crate::classify::ClassificationResult;
use crate::error::AnalyzeError;

/// Everything one user accumulates between creating and ending a session.
#[derive(Clone, Debug)]
pub struct Session {
    pub analytics: AnalyticsState,
    pub last_input: Option<String>,
    pub last_result: Option<ClassificationResult>,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl Session {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            analytics: AnalyticsState::new(),
            last_input: None,
            last_result: None,
            created_at: now,
            last_seen: now,
        }
    }
}

/// Sessions keyed by id. Mutations of one session run under that entry's
/// write lock, so record-and-evict is atomic per session.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, Session>>,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            max_sessions,
        }
    }

    pub fn create(&self) -> Result<String, AnalyzeError> {
        if self.sessions.len() >= self.max_sessions {
            return Err(AnalyzeError::SessionLimit);
        }
        let id = uuid::Uuid::new_v4().to_string();
        self.sessions.insert(id.clone(), Session::new());
        Ok(id)
    }

    /// Run `f` with exclusive access to the session, marking it as active.
    pub fn with_session<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Result<R, AnalyzeError> {
        let mut entry = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| AnalyzeError::SessionNotFound(id.to_string()))?;
        let session = entry.value_mut();
        session.last_seen = Utc::now();
        Ok(f(session))
    }

    pub fn exists(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    /// Record a finished analysis as the session's latest.
    pub fn record(
        &self,
        id: &str,
        text: String,
        result: ClassificationResult,
    ) -> Result<(), AnalyzeError> {
        self.with_session(id, |session| {
            session.analytics.record(result.clone());
            session.last_input = Some(text);
            session.last_result = Some(result);
        })
    }

    /// Forget the current input and result; analytics are kept.
    pub fn clear(&self, id: &str) -> Result<(), AnalyzeError> {
        self.with_session(id, |session| {
            session.last_input = None;
            session.last_result = None;
        })
    }

    /// End the session, dropping its analytics.
    pub fn end(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// End sessions idle for longer than `max_idle`.
    pub fn cleanup_idle(&self, max_idle: std::time::Duration) -> usize {
        let Ok(max_idle) = chrono::Duration::from_std(max_idle) else {
            return 0;
        };
        let Some(cutoff) = Utc::now().checked_sub_signed(max_idle) else {
            return 0;
        };
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.last_seen > cutoff);
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            info!("[riskscan] Ended {} idle sessions", removed);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn result(p: f32) -> ClassificationResult {
        let labels = ["neg".to_string(), "pos".to_string()];
        ClassificationResult::new(p, "some text", &labels, 0.0)
    }

    #[test]
    fn sessions_are_isolated() {
        let store = SessionStore::new(8);
        let a = store.create().unwrap();
        let b = store.create().unwrap();
        assert_ne!(a, b);

        store.record(&a, "one".into(), result(0.9)).unwrap();
        store.record(&a, "two".into(), result(0.1)).unwrap();
        store.record(&b, "three".into(), result(0.3)).unwrap();

        let (total_a, neg_a) = store
            .with_session(&a, |s| (s.analytics.total, s.analytics.negative))
            .unwrap();
        let (total_b, neg_b) = store
            .with_session(&b, |s| (s.analytics.total, s.analytics.negative))
            .unwrap();
        assert_eq!((total_a, neg_a), (2, 1));
        assert_eq!((total_b, neg_b), (1, 1));
    }

    #[test]
    fn clear_keeps_analytics() {
        let store = SessionStore::new(8);
        let id = store.create().unwrap();
        store.record(&id, "hello".into(), result(0.9)).unwrap();
        store.clear(&id).unwrap();
        let (input, last, total) = store
            .with_session(&id, |s| {
                (s.last_input.clone(), s.last_result.is_some(), s.analytics.total)
            })
            .unwrap();
        assert_eq!(input, None);
        assert!(!last);
        assert_eq!(total, 1);
    }

    #[test]
    fn ending_drops_state() {
        let store = SessionStore::new(8);
        let id = store.create().unwrap();
        store.record(&id, "hello".into(), result(0.9)).unwrap();
        assert!(store.end(&id));
        assert!(!store.end(&id));
        assert!(matches!(
            store.record(&id, "again".into(), result(0.9)),
            Err(AnalyzeError::SessionNotFound(_))
        ));
    }

    #[test]
    fn session_limit_is_enforced() {
        let store = SessionStore::new(2);
        store.create().unwrap();
        store.create().unwrap();
        assert!(matches!(store.create(), Err(AnalyzeError::SessionLimit)));
    }

    #[test]
    fn idle_sessions_are_swept() {
        let store = SessionStore::new(8);
        let stale = store.create().unwrap();
        let fresh = store.create().unwrap();
        store
            .with_session(&stale, |s| s.last_seen = Utc::now() - chrono::Duration::hours(2))
            .unwrap();

        assert_eq!(store.cleanup_idle(Duration::from_secs(3600)), 1);
        assert!(!store.exists(&stale));
        assert!(store.exists(&fresh));
    }

    #[test]
    fn huge_ttl_sweeps_nothing() {
        let store = SessionStore::new(8);
        let id = store.create().unwrap();
        store
            .with_session(&id, |s| s.last_seen = Utc::now() - chrono::Duration::days(365))
            .unwrap();

        // Far enough back to fall outside chrono's date range.
        assert_eq!(store.cleanup_idle(Duration::from_secs(9_000_000_000_000)), 0);
        assert!(store.exists(&id));
        assert_eq!(store.cleanup_idle(Duration::from_secs(u64::MAX)), 0);
    }

    #[test]
    fn concurrent_records_keep_invariants() {
        let store = SessionStore::new(8);
        let id = store.create().unwrap();
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                let id = id.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        let p = if (t + i) % 2 == 0 { 0.9 } else { 0.1 };
                        store.record(&id, format!("{t}-{i}"), result(p)).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        store
            .with_session(&id, |s| {
                assert_eq!(s.analytics.total, 200);
                assert_eq!(s.analytics.positive + s.analytics.negative, 200);
                assert_eq!(s.analytics.history().count(), 10);
            })
            .unwrap();
    }
}
