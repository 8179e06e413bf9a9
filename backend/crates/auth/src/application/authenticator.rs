//! Authenticator
//!
//! Verifies (email, password) against stored credentials. Every way of
//! failing looks the same to the caller: `InvalidCredentials`.

use std::sync::Arc;

use platform::password::CredentialHasher;

use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_id::UserId, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

pub struct Authenticator<R> {
    repo: Arc<R>,
    hasher: Arc<CredentialHasher>,
}

impl<R> Authenticator<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, hasher: Arc<CredentialHasher>) -> Self {
        Self { repo, hasher }
    }

    /// Return the subject id for valid credentials
    ///
    /// Unknown, inactive and malformed emails still pay for one hash
    /// verification against the dummy hash. So does a record whose stored
    /// hash cannot be read.
    pub async fn authenticate(&self, email: &str, password: RawPassword) -> AuthResult<UserId> {
        let user = match Email::new(email) {
            Ok(email) => match self.repo.find_active_user_by_email(&email).await {
                Ok(user) => user,
                Err(AuthError::CorruptPasswordHash(user_id)) => {
                    tracing::error!(user_id, "Stored password hash unreadable");
                    None
                }
                Err(e) => return Err(e),
            },
            Err(_) => None,
        };

        let hasher = self.hasher.clone();

        let Some(user) = user else {
            tokio::task::spawn_blocking(move || hasher.verify_dummy(password.inner())).await?;
            return Err(AuthError::InvalidCredentials);
        };

        let stored = user.password.clone();
        let verified =
            tokio::task::spawn_blocking(move || hasher.verify(stored.as_hashed(), password.inner()))
                .await?;

        if !verified || !user.can_login() {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user.user_id)
    }
}
