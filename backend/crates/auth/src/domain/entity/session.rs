//! Session Entity
//!
//! Server-side session. Exists before authentication (anonymous) and is
//! upgraded in place once a subject is bound to it.

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::{
    csrf_token::CsrfToken, session_id::SessionId, user_id::UserId,
};

/// Session entity
#[derive(Debug, Clone)]
pub struct Session {
    /// Session ID (UUID v4)
    pub session_id: SessionId,
    /// Authenticated subject, `None` while anonymous
    pub user_id: Option<UserId>,
    /// Anti-forgery token, fixed for the session's lifetime
    pub csrf_token: CsrfToken,
    /// Session expiration (Unix timestamp ms)
    pub expires_at_ms: i64,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last activity timestamp
    pub last_activity_at: DateTime<Utc>,
}

impl Session {
    /// Create a fresh anonymous session
    ///
    /// TTL is provided by the application layer (config), not hard-coded here.
    pub fn new_anonymous(ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            session_id: SessionId::new(),
            user_id: None,
            csrf_token: CsrfToken::generate(),
            expires_at_ms: (now + ttl).timestamp_millis(),
            created_at: now,
            last_activity_at: now,
        }
    }

    /// Check if session has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() >= self.expires_at_ms
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// Bound subject, if any
    pub fn subject(&self) -> Option<UserId> {
        self.user_id
    }

    /// Anonymous -> Authenticated, keeping id and CSRF token
    pub fn bind(&mut self, user_id: UserId) {
        self.user_id = Some(user_id);
        self.touch();
    }

    /// Back to anonymous
    pub fn unbind(&mut self) {
        self.user_id = None;
        self.touch();
    }

    /// Copy under a new session id; subject, CSRF token and expiry carry over
    pub fn rotated(&self) -> Self {
        Self {
            session_id: SessionId::new(),
            last_activity_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Update last activity timestamp
    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    /// Get remaining time until expiration
    pub fn remaining_ms(&self) -> i64 {
        let now_ms = Utc::now().timestamp_millis();
        (self.expires_at_ms - now_ms).max(0)
    }
}
