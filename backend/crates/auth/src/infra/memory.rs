//! In-Memory Repository
//!
//! Deterministic store for tests and local runs. Fixture users are passed
//! to the constructor; clones share the same state.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::entity::{
    session::Session,
    user::{NewUser, User},
};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{email::Email, session_id::SessionId, user_id::UserId};
use crate::error::{AuthError, AuthResult};

struct State {
    users: BTreeMap<UserId, User>,
    next_user_id: i64,
    sessions: HashMap<SessionId, Session>,
}

/// In-memory auth repository
#[derive(Clone)]
pub struct InMemoryAuthRepository {
    state: Arc<RwLock<State>>,
}

impl Default for InMemoryAuthRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAuthRepository {
    pub fn new() -> Self {
        Self::with_users(Vec::new())
    }

    /// Seed with existing users; new ids continue after the largest seeded id
    pub fn with_users(users: Vec<User>) -> Self {
        let users: BTreeMap<UserId, User> = users.into_iter().map(|u| (u.user_id, u)).collect();
        let next_user_id = users.keys().next_back().map_or(1, |id| id.as_i64() + 1);

        Self {
            state: Arc::new(RwLock::new(State {
                users,
                next_user_id,
                sessions: HashMap::new(),
            })),
        }
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }

    /// Number of stored users with exactly this email
    pub async fn count_by_email(&self, email: &str) -> usize {
        self.state
            .read()
            .await
            .users
            .values()
            .filter(|u| u.email.as_str() == email)
            .count()
    }

    pub async fn session_count(&self) -> usize {
        self.state.read().await.sessions.len()
    }
}

impl UserRepository for InMemoryAuthRepository {
    async fn insert_user(&self, user: &NewUser) -> AuthResult<UserId> {
        // Check and insert under one write lock
        let mut state = self.state.write().await;

        if state.users.values().any(|u| u.email == user.email) {
            return Err(AuthError::DuplicateEmail);
        }

        let user_id = UserId::from_i64(state.next_user_id);
        state.next_user_id += 1;
        state.users.insert(user_id, user.clone().into_user(user_id));

        Ok(user_id)
    }

    async fn find_user_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn find_active_user_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|u| u.active && &u.email == email)
            .cloned())
    }
}

impl SessionRepository for InMemoryAuthRepository {
    async fn create_session(&self, session: &Session) -> AuthResult<()> {
        self.state
            .write()
            .await
            .sessions
            .insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_session(&self, session_id: SessionId) -> AuthResult<Option<Session>> {
        Ok(self.state.read().await.sessions.get(&session_id).cloned())
    }

    async fn set_session_subject(
        &self,
        session_id: SessionId,
        user_id: Option<UserId>,
    ) -> AuthResult<()> {
        let mut state = self.state.write().await;
        let session = state
            .sessions
            .get_mut(&session_id)
            .ok_or(AuthError::SessionInvalid)?;
        session.user_id = user_id;
        session.last_activity_at = Utc::now();
        Ok(())
    }

    async fn replace_session(&self, old: SessionId, session: &Session) -> AuthResult<()> {
        let mut state = self.state.write().await;
        state.sessions.remove(&old);
        state.sessions.insert(session.session_id, session.clone());
        Ok(())
    }

    async fn delete_session(&self, session_id: SessionId) -> AuthResult<()> {
        self.state.write().await.sessions.remove(&session_id);
        Ok(())
    }

    async fn cleanup_expired_sessions(&self) -> AuthResult<u64> {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| !s.is_expired());
        Ok((before - state.sessions.len()) as u64)
    }
}
