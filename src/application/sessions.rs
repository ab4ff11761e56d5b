use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::error::{Error, Result};
use crate::domain::user::UserId;

/// In-memory session store, constructed in `main` and handed to the
/// services by reference rather than reached for as a global. Restarting
/// the process clears all sessions; users log in again.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<Mutex<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

#[derive(Debug, Clone)]
struct SessionEntry {
    user_id: UserId,
    created_at: DateTime<Utc>,
}

impl SessionRegistry {
    /// Sessions expire a fixed hour after creation; no sliding renewal.
    pub fn new() -> Self {
        Self::with_ttl(Duration::hours(1))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { inner: Arc::new(Mutex::new(HashMap::new())), ttl }
    }

    /// Issues an opaque token for `user_id`.
    pub fn create(&self, user_id: UserId) -> String {
        let token = Uuid::new_v4().to_string();
        let entry = SessionEntry { user_id, created_at: Utc::now() };
        self.inner.lock().unwrap().insert(token.clone(), entry);
        token
    }

    /// Maps a token back to its user. An entry past its TTL is removed on
    /// the spot, so a later resolve of the same token also fails.
    pub fn resolve(&self, token: &str) -> Result<UserId> {
        let mut sessions = self.inner.lock().unwrap();
        match sessions.get(token) {
            None => Err(Error::Unauthorized),
            Some(entry) if Utc::now() - entry.created_at > self.ttl => {
                sessions.remove(token);
                Err(Error::Unauthorized)
            }
            Some(entry) => Ok(entry.user_id),
        }
    }

    /// Logout. Revoking an unknown token is a no-op.
    pub fn revoke(&self, token: &str) {
        self.inner.lock().unwrap().remove(token);
    }

    /// Drops every session belonging to `user_id` (account deletion).
    pub fn revoke_user(&self, user_id: UserId) {
        self.inner
            .lock()
            .unwrap()
            .retain(|_, entry| entry.user_id != user_id);
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
