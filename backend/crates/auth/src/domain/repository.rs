//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entity::{
    session::Session,
    user::{NewUser, User},
};
use crate::domain::value_object::{email::Email, session_id::SessionId, user_id::UserId};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user and return its assigned id
    ///
    /// Must fail with `AuthError::DuplicateEmail` when the email is taken,
    /// decided atomically by the store.
    async fn insert_user(&self, user: &NewUser) -> AuthResult<UserId>;

    /// Find user by ID
    async fn find_user_by_id(&self, user_id: UserId) -> AuthResult<Option<User>>;

    /// Find an active user by exact email
    async fn find_active_user_by_email(&self, email: &Email) -> AuthResult<Option<User>>;
}

/// Session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Create a new session
    async fn create_session(&self, session: &Session) -> AuthResult<()>;

    /// Find session by ID, expired or not
    async fn find_session(&self, session_id: SessionId) -> AuthResult<Option<Session>>;

    /// Set or clear the bound subject
    async fn set_session_subject(
        &self,
        session_id: SessionId,
        user_id: Option<UserId>,
    ) -> AuthResult<()>;

    /// Replace `old` with `session` in one step
    async fn replace_session(&self, old: SessionId, session: &Session) -> AuthResult<()>;

    /// Delete a session
    async fn delete_session(&self, session_id: SessionId) -> AuthResult<()>;

    /// Clean up expired sessions
    async fn cleanup_expired_sessions(&self) -> AuthResult<u64>;
}

/// Everything the HTTP layer needs from storage
pub trait AuthRepository:
    UserRepository + SessionRepository + Clone + Send + Sync + 'static
{
}

impl<T> AuthRepository for T where
    T: UserRepository + SessionRepository + Clone + Send + Sync + 'static
{
}
