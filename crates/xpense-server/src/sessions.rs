//! In-memory login sessions
//!
//! A successful login yields a random bearer token. Tokens expire after a
//! period of inactivity and follow their user through a rename.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use argon2::password_hash::rand_core::{OsRng, RngCore};
use tokio::sync::RwLock;

/// Default idle timeout for a session (12 hours)
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(12 * 60 * 60);

/// Random bytes per token (hex-encoded to 64 characters)
const TOKEN_BYTES: usize = 32;

/// The authenticated caller, resolved by the auth middleware for each request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub username: String,
    pub token: String,
}

struct Session {
    username: String,
    last_activity: Instant,
}

impl Session {
    fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.elapsed() > timeout
    }
}

/// Manages bearer-token sessions
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Session>>,
    timeout: Duration,
}

impl SessionManager {
    pub fn new(timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            timeout,
        }
    }

    /// Token from the OS CSPRNG; carries nothing about the user or the time
    fn generate_token() -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Start a session for `username` and return its token
    pub async fn create_session(&self, username: &str) -> String {
        let token = Self::generate_token();
        let mut sessions = self.sessions.write().await;

        // Clean up expired sessions while we're here
        let timeout = self.timeout;
        sessions.retain(|_, s| !s.is_expired(timeout));

        sessions.insert(
            token.clone(),
            Session {
                username: username.to_string(),
                last_activity: Instant::now(),
            },
        );
        token
    }

    /// Look up a token, refreshing its idle timer
    pub async fn resolve(&self, token: &str) -> Option<SessionContext> {
        let mut sessions = self.sessions.write().await;
        let expired = match sessions.get_mut(token) {
            None => return None,
            Some(session) if session.is_expired(self.timeout) => true,
            Some(session) => {
                session.last_activity = Instant::now();
                false
            }
        };

        if expired {
            sessions.remove(token);
            return None;
        }

        sessions.get(token).map(|s| SessionContext {
            username: s.username.clone(),
            token: token.to_string(),
        })
    }

    /// End one session
    pub async fn end_session(&self, token: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token).is_some()
    }

    /// End every session belonging to `username`
    pub async fn end_user_sessions(&self, username: &str) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.username != username);
        before - sessions.len()
    }

    /// Point live sessions of `old` at `new` after a rename
    pub async fn rename_user(&self, old: &str, new: &str) -> usize {
        let mut sessions = self.sessions.write().await;
        let mut renamed = 0;
        for session in sessions.values_mut().filter(|s| s.username == old) {
            session.username = new.to_string();
            renamed += 1;
        }
        renamed
    }

    /// Number of sessions that have not expired
    pub async fn active_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions
            .values()
            .filter(|s| !s.is_expired(self.timeout))
            .count()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TIMEOUT)
    }
}
