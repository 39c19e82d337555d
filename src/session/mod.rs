use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config;

/// Server-side session state for an authenticated back-office operator.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub user_id: i64,
    pub user_type: String,
    pub login_time: DateTime<Utc>,
    pub csrf_token: String,
}

impl AdminSession {
    pub fn new(user_id: i64, user_type: impl Into<String>) -> Self {
        Self {
            user_id,
            user_type: user_type.into(),
            login_time: Utc::now(),
            csrf_token: generate_token(),
        }
    }

    /// Hard 8-hour lifetime measured from login, not last activity.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let timeout = Duration::hours(config::config().session.timeout_hours as i64);
        now - self.login_time > timeout
    }

    pub fn has_allowed_role(&self) -> bool {
        config::config()
            .session
            .allowed_roles
            .iter()
            .any(|r| r == &self.user_type)
    }
}

/// In-memory session store keyed by the opaque cookie value.
///
/// Sessions are request-scoped reads and rare writes (login, logout,
/// timeout teardown), so a single RwLock-guarded map is sufficient.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, AdminSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session and return its opaque id for the cookie.
    ///
    /// Logins also sweep out expired entries, so abandoned sessions whose
    /// cookies are never presented again do not accumulate in the map.
    pub async fn create(&self, session: AdminSession) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| !s.is_expired(now));
        sessions.insert(id, session);
        id
    }

    pub async fn get(&self, id: &Uuid) -> Option<AdminSession> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Full teardown: the id becomes invalid immediately.
    pub async fn destroy(&self, id: &Uuid) {
        self.sessions.write().await.remove(id);
    }
}

/// 32 random bytes, hex-encoded: 256 bits of entropy per token.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Constant-time CSRF token comparison. Length mismatch compares unequal
/// without early exit inside subtle.
pub fn verify_csrf(expected: &str, supplied: &str) -> bool {
    expected.as_bytes().ct_eq(supplied.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_unique_and_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn verify_csrf_accepts_exact_match_only() {
        let token = generate_token();
        assert!(verify_csrf(&token, &token));
        assert!(!verify_csrf(&token, ""));
        assert!(!verify_csrf(&token, &token[..63]));
        let mut flipped = token.clone();
        flipped.replace_range(0..1, if token.starts_with('0') { "1" } else { "0" });
        assert!(!verify_csrf(&token, &flipped));
    }

    #[test]
    fn session_expiry_is_measured_from_login() {
        let mut session = AdminSession::new(1, "admin");
        let now = Utc::now();
        assert!(!session.is_expired(now));

        session.login_time = now - Duration::hours(9);
        assert!(session.is_expired(now));

        // Boundary: exactly 8h old is still valid
        session.login_time = now - Duration::hours(8);
        assert!(!session.is_expired(now));
    }

    #[tokio::test]
    async fn store_create_get_destroy_roundtrip() {
        let store = SessionStore::new();
        let id = store.create(AdminSession::new(7, "admin")).await;

        let found = store.get(&id).await.expect("session should exist");
        assert_eq!(found.user_id, 7);
        assert_eq!(found.user_type, "admin");

        store.destroy(&id).await;
        assert!(store.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn create_sweeps_expired_sessions() {
        let store = SessionStore::new();

        let mut stale = AdminSession::new(1, "admin");
        stale.login_time = Utc::now() - Duration::hours(9);
        let stale_id = store.create(stale).await;
        assert!(store.get(&stale_id).await.is_some());

        // A later login evicts the abandoned session without its cookie
        // ever coming back.
        let fresh_id = store.create(AdminSession::new(2, "admin")).await;
        assert!(store.get(&stale_id).await.is_none());
        assert!(store.get(&fresh_id).await.is_some());
    }
}
