//! Shared session table.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use pulse_core::{FormSession, UserId};

struct Entry {
    session: FormSession,
    touched: Instant,
}

/// Session table shared by all connection tasks.
///
/// Cheap to clone. Each entry is owned by its user's connection task for
/// the duration of one event, so the map lock is only held for the lookup
/// or write itself, never across an await.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<UserId, Entry>>>,
    ttl: Option<Duration>,
}

impl SessionStore {
    /// Create a store. Sessions idle longer than `ttl` are treated as
    /// absent; `None` disables expiry.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Fetch the live session for a user. An expired session is dropped
    /// and reported as absent.
    pub async fn get(&self, user: UserId) -> Option<FormSession> {
        let mut map = self.inner.lock().await;
        match map.get(&user) {
            Some(entry) if self.expired(entry) => {
                map.remove(&user);
                None
            }
            Some(entry) => Some(entry.session.clone()),
            None => None,
        }
    }

    /// Store a user's session, replacing any previous one.
    ///
    /// Overwriting is the documented restart semantic: a repeated begin
    /// command discards the in-progress form without notice.
    pub async fn put(&self, session: FormSession) {
        let mut map = self.inner.lock().await;
        map.insert(
            session.user,
            Entry {
                session,
                touched: Instant::now(),
            },
        );
    }

    /// Destroy a user's session, if any.
    pub async fn clear(&self, user: UserId) {
        self.inner.lock().await.remove(&user);
    }

    /// Drop every expired session and return how many were evicted.
    /// No-op without a TTL.
    pub async fn purge_expired(&self) -> usize {
        let Some(ttl) = self.ttl else { return 0 };
        let mut map = self.inner.lock().await;
        let before = map.len();
        map.retain(|_, entry| entry.touched.elapsed() <= ttl);
        before - map.len()
    }

    /// Number of live sessions (expired entries included until swept).
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    fn expired(&self, entry: &Entry) -> bool {
        self.ttl.is_some_and(|ttl| entry.touched.elapsed() > ttl)
    }
}
