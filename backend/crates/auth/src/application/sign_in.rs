//! Sign In Use Case
//!
//! Authenticates a user and binds the subject to the current session.

use std::sync::Arc;

use platform::password::CredentialHasher;

use crate::application::authenticator::Authenticator;
use crate::application::config::AuthConfig;
use crate::application::session_binder::SessionBinder;
use crate::domain::entity::session::Session;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{user_id::UserId, user_password::RawPassword};
use crate::error::AuthResult;

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Sign in output
pub struct SignInOutput {
    pub user_id: UserId,
    /// Session id changed; the cookie must be reissued
    pub session_rotated: bool,
}

/// Sign in use case
pub struct SignInUseCase<R> {
    authenticator: Authenticator<R>,
    binder: SessionBinder<R>,
}

impl<R> SignInUseCase<R>
where
    R: UserRepository + SessionRepository,
{
    pub fn new(repo: Arc<R>, hasher: Arc<CredentialHasher>, config: Arc<AuthConfig>) -> Self {
        Self {
            authenticator: Authenticator::new(repo.clone(), hasher),
            binder: SessionBinder::new(repo, config),
        }
    }

    pub async fn execute(
        &self,
        session: &mut Session,
        input: SignInInput,
    ) -> AuthResult<SignInOutput> {
        let password = RawPassword::for_verification(input.password);
        let user_id = self
            .authenticator
            .authenticate(&input.email, password)
            .await?;

        let session_rotated = self.binder.bind(session, user_id).await?;

        tracing::info!(
            user_id = %user_id,
            session_id = %session.session_id,
            "User signed in"
        );

        Ok(SignInOutput {
            user_id,
            session_rotated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use crate::infra::memory::InMemoryAuthRepository;
    use crate::test_support::{seeded_user, test_config, test_hasher};

    fn setup() -> (InMemoryAuthRepository, SignInUseCase<InMemoryAuthRepository>) {
        let repo = InMemoryAuthRepository::with_users(vec![seeded_user(
            1,
            "test@mail.com",
            "validPa$$word",
        )]);
        let use_case = SignInUseCase::new(
            Arc::new(repo.clone()),
            test_hasher(),
            Arc::new(test_config()),
        );
        (repo, use_case)
    }

    fn input(email: &str, password: &str) -> SignInInput {
        SignInInput {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_sign_in_binds_session() {
        let (repo, use_case) = setup();
        let mut session = Session::new_anonymous(chrono::Duration::hours(1));
        repo.create_session(&session).await.unwrap();

        let output = use_case
            .execute(&mut session, input("test@mail.com", "validPa$$word"))
            .await
            .unwrap();

        assert_eq!(output.user_id, UserId::from_i64(1));
        assert!(!output.session_rotated);
        assert_eq!(session.subject(), Some(UserId::from_i64(1)));
    }

    #[tokio::test]
    async fn test_wrong_password_leaves_session_anonymous() {
        let (repo, use_case) = setup();
        let mut session = Session::new_anonymous(chrono::Duration::hours(1));
        repo.create_session(&session).await.unwrap();

        let result = use_case
            .execute(&mut session, input("test@mail.com", "wrongPa$$word"))
            .await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert!(!session.is_authenticated());
        let stored = repo.find_session(session.session_id).await.unwrap().unwrap();
        assert!(!stored.is_authenticated());
    }
}
