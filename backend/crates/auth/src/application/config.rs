//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::fmt;
use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::password::PasswordCost;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// Session secret key for HMAC signing (32 bytes)
    pub session_secret: [u8; 32],
    /// Absolute session lifetime (12 hours)
    pub session_ttl: Duration,
    /// Minimum gap between request-triggered purges of expired sessions
    pub session_sweep_interval: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Argon2id cost, fixed per deployment
    pub password_cost: PasswordCost,
    /// Issue a new session id when a subject is bound
    pub rotate_session_on_sign_in: bool,
    /// Where anonymous requests to protected routes are sent
    pub login_path: String,
    /// Where a successful login lands
    pub after_login_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "session".to_string(),
            session_secret: [0u8; 32],
            session_ttl: Duration::from_secs(12 * 3600), // 12 hours
            session_sweep_interval: Duration::from_secs(60),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
            password_cost: PasswordCost::default(),
            rotate_session_on_sign_in: false,
            login_path: "/user/login".to_string(),
            after_login_path: "/".to_string(),
        }
    }
}

impl AuthConfig {
    /// Create config with a random session secret (for development)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            session_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Session TTL as a chrono duration for entity timestamps
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.session_ttl.as_millis() as i64)
    }

    /// Session cookie attributes
    pub fn cookie_config(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.session_ttl.as_secs() as i64),
        }
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("session_cookie_name", &self.session_cookie_name)
            .field("session_secret", &"[REDACTED]")
            .field("session_ttl", &self.session_ttl)
            .field("session_sweep_interval", &self.session_sweep_interval)
            .field("cookie_secure", &self.cookie_secure)
            .field("cookie_same_site", &self.cookie_same_site)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "[REDACTED]"))
            .field("password_cost", &self.password_cost)
            .field("rotate_session_on_sign_in", &self.rotate_session_on_sign_in)
            .field("login_path", &self.login_path)
            .field("after_login_path", &self.after_login_path)
            .finish()
    }
}
