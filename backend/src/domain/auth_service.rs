//! Anonymous sessions.
//!
//! Clients sign in without credentials and receive an opaque uid. When
//! session checking is enabled, the uid must accompany every API call.
//! Sessions expire after a fixed lifetime, and the oldest are dropped once
//! the store is full.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub uid: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at >= ttl
    }
}

#[derive(Clone)]
pub struct AuthService {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
    max_sessions: usize,
}

impl AuthService {
    pub fn new() -> Self {
        Self::with_limits(Duration::hours(DEFAULT_SESSION_TTL_HOURS), DEFAULT_MAX_SESSIONS)
    }

    /// Sessions live for `ttl`; at most `max_sessions` are kept (at least one)
    pub fn with_limits(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    pub async fn sign_in_anonymously(&self) -> Session {
        self.sign_in_at(Utc::now()).await
    }

    async fn sign_in_at(&self, now: DateTime<Utc>) -> Session {
        let session = Session {
            uid: Uuid::new_v4().simple().to_string(),
            created_at: now,
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, existing| !existing.is_expired(now, self.ttl));
        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .values()
                .min_by_key(|existing| existing.created_at)
                .map(|existing| existing.uid.clone());
            match oldest {
                Some(uid) => {
                    sessions.remove(&uid);
                }
                None => break,
            }
        }
        if sessions.len() < before {
            debug!("Evicted {} anonymous sessions", before - sessions.len());
        }
        sessions.insert(session.uid.clone(), session.clone());
        drop(sessions);

        info!("Issued anonymous session {}", session.uid);
        session
    }

    pub async fn is_valid_session(&self, uid: &str) -> bool {
        self.is_valid_at(uid, Utc::now()).await
    }

    async fn is_valid_at(&self, uid: &str, now: DateTime<Utc>) -> bool {
        self.sessions
            .read()
            .await
            .get(uid)
            .map_or(false, |session| !session.is_expired(now, self.ttl))
    }

    #[cfg(test)]
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for AuthService {
    fn default() -> Self {
        Self::new()
    }
}
