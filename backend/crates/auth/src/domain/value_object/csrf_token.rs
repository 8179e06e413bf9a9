//! CSRF Token Value Object
//!
//! One unguessable token per session, fixed for the session's lifetime.

use std::fmt;

use platform::crypto::{constant_time_eq, random_token};

/// Random bytes behind a token (256 bits)
const CSRF_TOKEN_BYTES: usize = 32;

/// Anti-forgery token bound to a session
#[derive(Clone)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// Generate a fresh random token
    pub fn generate() -> Self {
        Self(random_token(CSRF_TOKEN_BYTES))
    }

    /// Create from database value
    pub fn from_db(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constant-time comparison against a submitted token
    pub fn matches(&self, submitted: &str) -> bool {
        !submitted.is_empty() && constant_time_eq(self.0.as_bytes(), submitted.as_bytes())
    }
}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CsrfToken").field(&"[REDACTED]").finish()
    }
}
