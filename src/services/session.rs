//! Per-browser session state.
//!
//! ARCHITECTURE
//! ============
//! A browser session is identified by an opaque random cookie value. Each one
//! maps to a `SessionState` value holding at most the decoded identity and the
//! raw token bundle. Nothing here is persisted: a process restart logs
//! everybody out, and sessions idle for `SESSION_IDLE_TTL` are pruned on the
//! next write.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

// =============================================================================
// IDENTITY + TOKENS
// =============================================================================

/// Identity decoded from the ID token payload.
///
/// These values are client-asserted: the token signature is not verified, so
/// `email` must not be treated as attested identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub subject: Option<String>,
}

impl IdentityClaims {
    /// Name shown in the welcome line.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("User")
    }
}

/// Token endpoint response, kept opaque apart from the few fields we read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenBundle(Map<String, Value>);

impl TokenBundle {
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    fn string_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    /// Non-empty `id_token`, if present.
    #[must_use]
    pub fn id_token(&self) -> Option<&str> {
        self.string_field("id_token")
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.string_field("access_token")
    }

    #[cfg(test)]
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

// =============================================================================
// SESSION STATE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    LoggedOut,
    LoggedIn,
}

/// State owned by one browser session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Present iff a decode succeeded since the last logout.
    pub user_info: Option<IdentityClaims>,
    /// May be set without `user_info` after a partially failed login.
    pub token: Option<TokenBundle>,
}

impl SessionState {
    #[must_use]
    pub fn phase(&self) -> AuthPhase {
        if self.user_info.is_some() { AuthPhase::LoggedIn } else { AuthPhase::LoggedOut }
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.phase() == AuthPhase::LoggedIn
    }

    /// Drop both entries.
    pub fn clear(&mut self) {
        self.user_info = None;
        self.token = None;
    }
}

// =============================================================================
// SESSION STORE
// =============================================================================

/// Sessions untouched for this long are dropped. The session cookie carries
/// the same max-age.
pub const SESSION_IDLE_TTL: Duration = Duration::hours(24);

#[derive(Debug, Clone)]
struct Entry {
    state: SessionState,
    last_seen: OffsetDateTime,
}

impl Entry {
    fn is_idle(&self, now: OffsetDateTime) -> bool {
        now - self.last_seen >= SESSION_IDLE_TTL
    }
}

/// Process-local map of browser session id to `SessionState`.
/// Clone is cheap; all clones share the same map.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Entry>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a session, marking it as seen. Unknown or idle ids yield
    /// an empty state.
    pub async fn load(&self, id: &str) -> SessionState {
        self.load_at(id, OffsetDateTime::now_utc()).await
    }

    async fn load_at(&self, id: &str, now: OffsetDateTime) -> SessionState {
        let mut sessions = self.sessions.write().await;
        if sessions.get(id).is_some_and(|entry| entry.is_idle(now)) {
            sessions.remove(id);
        }
        sessions
            .get_mut(id)
            .map(|entry| {
                entry.last_seen = now;
                entry.state.clone()
            })
            .unwrap_or_default()
    }

    /// Run one state transition under the write lock.
    ///
    /// Idle sessions are pruned first. An empty resulting state removes the
    /// entry, anything else is stored as seen now.
    pub async fn update<R>(&self, id: &str, f: impl FnOnce(&mut SessionState) -> R) -> R {
        self.update_at(id, OffsetDateTime::now_utc(), f).await
    }

    async fn update_at<R>(&self, id: &str, now: OffsetDateTime, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, entry| !entry.is_idle(now));

        let mut state = sessions.remove(id).map(|entry| entry.state).unwrap_or_default();
        let out = f(&mut state);
        if state != SessionState::default() {
            sessions.insert(id.to_owned(), Entry { state, last_seen: now });
        }
        out
    }

    /// Replace a session's state outright.
    #[cfg(test)]
    pub async fn save(&self, id: &str, state: SessionState) {
        self.update(id, |s| *s = state).await;
    }

    /// Number of sessions currently holding any state.
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
