//! Sign Out Use Case
//!
//! Returns the current session to anonymous.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session_binder::SessionBinder;
use crate::domain::entity::session::Session;
use crate::domain::repository::SessionRepository;
use crate::error::AuthResult;

/// Sign out use case
pub struct SignOutUseCase<R> {
    binder: SessionBinder<R>,
}

impl<R> SignOutUseCase<R>
where
    R: SessionRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self {
            binder: SessionBinder::new(repo, config),
        }
    }

    /// Sign out from current session
    pub async fn execute(&self, session: &mut Session) -> AuthResult<()> {
        let user_id = session.subject();
        self.binder.unbind(session).await?;

        tracing::info!(user_id = ?user_id, "User signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_id::UserId;
    use crate::infra::memory::InMemoryAuthRepository;
    use crate::test_support::test_config;

    #[tokio::test]
    async fn test_sign_out_keeps_session_and_token() {
        let repo = InMemoryAuthRepository::new();
        let mut session = Session::new_anonymous(chrono::Duration::hours(1));
        session.bind(UserId::from_i64(1));
        repo.create_session(&session).await.unwrap();
        let csrf = session.csrf_token.as_str().to_string();

        SignOutUseCase::new(Arc::new(repo.clone()), Arc::new(test_config()))
            .execute(&mut session)
            .await
            .unwrap();

        assert!(!session.is_authenticated());
        assert_eq!(session.csrf_token.as_str(), csrf);
        let stored = repo.find_session(session.session_id).await.unwrap().unwrap();
        assert!(!stored.is_authenticated());
    }
}
