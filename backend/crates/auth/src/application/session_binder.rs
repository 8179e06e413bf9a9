//! Session Binder
//!
//! Session lifecycle: `Anonymous -> Authenticated -> Anonymous`.
//! Sessions are referenced from the cookie by a signed token
//! `"<session_id>.<base64url(HMAC-SHA256(secret, session_id))>"`.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::Utc;
use hmac::{Hmac, Mac};
use platform::crypto::{from_base64_url, to_base64_url};
use sha2::Sha256;

use crate::application::config::AuthConfig;
use crate::domain::entity::session::Session;
use crate::domain::repository::SessionRepository;
use crate::domain::value_object::{
    session_id::{SessionId, parse_session_id},
    user_id::UserId,
};
use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Session resolved for the current request
#[derive(Debug, Clone)]
pub struct LoadedSession {
    pub session: Session,
    /// A new session was started; the client needs a fresh cookie
    pub issued: bool,
}

/// Purges expired sessions from [`SessionBinder::start`], at most once per
/// interval across all clones
#[derive(Debug)]
pub struct ExpirySweeper {
    interval_ms: i64,
    last_sweep_ms: AtomicI64,
}

impl ExpirySweeper {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_ms: i64::try_from(interval.as_millis()).unwrap_or(i64::MAX),
            last_sweep_ms: AtomicI64::new(0),
        }
    }

    /// Take the sweep slot if the interval has passed; one caller wins
    fn claim(&self, now_ms: i64) -> bool {
        let last = self.last_sweep_ms.load(Ordering::Acquire);
        if now_ms.saturating_sub(last) < self.interval_ms {
            return false;
        }
        self.last_sweep_ms
            .compare_exchange(last, now_ms, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

pub struct SessionBinder<R> {
    repo: Arc<R>,
    config: Arc<AuthConfig>,
    sweeper: Option<Arc<ExpirySweeper>>,
}

impl<R> SessionBinder<R>
where
    R: SessionRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            config,
            sweeper: None,
        }
    }

    /// Sweep expired sessions whenever a new one is started (throttled)
    pub fn with_sweeper(mut self, sweeper: Arc<ExpirySweeper>) -> Self {
        self.sweeper = Some(sweeper);
        self
    }

    /// Start a fresh anonymous session
    pub async fn start(&self) -> AuthResult<Session> {
        self.sweep_expired().await;

        let session = Session::new_anonymous(self.config.session_ttl());
        self.repo.create_session(&session).await?;

        tracing::debug!(session_id = %session.session_id, "Session started");

        Ok(session)
    }

    /// A failed sweep never fails the request
    async fn sweep_expired(&self) {
        let Some(sweeper) = &self.sweeper else {
            return;
        };
        if !sweeper.claim(Utc::now().timestamp_millis()) {
            return;
        }

        match self.repo.cleanup_expired_sessions().await {
            Ok(deleted) => {
                tracing::debug!(sessions_deleted = deleted, "Expired sessions swept");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Expired session sweep failed");
            }
        }
    }

    /// Load the session named by the cookie token, or start a new one
    ///
    /// Missing, tampered, unknown and expired tokens all end in a new
    /// anonymous session. Expired records are deleted.
    pub async fn resume_or_start(&self, token: Option<&str>) -> AuthResult<LoadedSession> {
        if let Some(session_id) = token.and_then(|t| self.parse_token(t)) {
            if let Some(session) = self.repo.find_session(session_id).await? {
                if !session.is_expired() {
                    return Ok(LoadedSession {
                        session,
                        issued: false,
                    });
                }

                self.repo.delete_session(session_id).await?;
                tracing::debug!(session_id = %session_id, "Expired session discarded");
            }
        }

        Ok(LoadedSession {
            session: self.start().await?,
            issued: true,
        })
    }

    /// Subject bound to the session; expired sessions are anonymous
    pub fn resolve(&self, session: &Session) -> Option<UserId> {
        if session.is_expired() {
            return None;
        }
        session.subject()
    }

    /// Bind a subject to the session
    ///
    /// Returns `true` when the session id was rotated and the cookie must
    /// be reissued. The CSRF token is kept either way.
    pub async fn bind(&self, session: &mut Session, user_id: UserId) -> AuthResult<bool> {
        if self.config.rotate_session_on_sign_in {
            let old = session.session_id;
            let mut rotated = session.rotated();
            rotated.bind(user_id);
            self.repo.replace_session(old, &rotated).await?;

            tracing::info!(
                user_id = %user_id,
                session_id = %rotated.session_id,
                "Session bound (rotated)"
            );

            *session = rotated;
            return Ok(true);
        }

        self.repo
            .set_session_subject(session.session_id, Some(user_id))
            .await?;
        session.bind(user_id);

        tracing::info!(user_id = %user_id, session_id = %session.session_id, "Session bound");

        Ok(false)
    }

    /// Clear the subject; the session stays alive as anonymous
    pub async fn unbind(&self, session: &mut Session) -> AuthResult<()> {
        self.repo
            .set_session_subject(session.session_id, None)
            .await?;

        tracing::info!(
            user_id = ?session.subject(),
            session_id = %session.session_id,
            "Session unbound"
        );

        session.unbind();
        Ok(())
    }

    /// Signed cookie value for a session id
    pub fn issue_token(&self, session_id: SessionId) -> AuthResult<String> {
        let session_id = session_id.to_string();
        let mut mac = self.mac()?;
        mac.update(session_id.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!("{}.{}", session_id, to_base64_url(&signature)))
    }

    /// Verify a cookie value and extract the session id
    pub fn parse_token(&self, token: &str) -> Option<SessionId> {
        let (session_id, signature_b64) = token.split_once('.')?;

        let signature = from_base64_url(signature_b64).ok()?;
        let mut mac = self.mac().ok()?;
        mac.update(session_id.as_bytes());
        // Constant-time comparison
        mac.verify_slice(&signature).ok()?;

        parse_session_id(session_id)
    }

    fn mac(&self) -> AuthResult<HmacSha256> {
        HmacSha256::new_from_slice(&self.config.session_secret)
            .map_err(|e| AuthError::Internal(format!("Invalid session secret: {e}")))
    }
}
