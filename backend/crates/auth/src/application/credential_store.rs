//! Credential Store
//!
//! Persists identity records with hashed secrets. Uniqueness of email is
//! decided by the repository in a single atomic step.

use std::sync::Arc;

use platform::password::CredentialHasher;

use crate::domain::entity::user::{NewUser, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    display_name::DisplayName,
    email::Email,
    user_id::UserId,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

pub struct CredentialStore<R> {
    repo: Arc<R>,
    hasher: Arc<CredentialHasher>,
}

impl<R> CredentialStore<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, hasher: Arc<CredentialHasher>) -> Self {
        Self { repo, hasher }
    }

    /// Hash the password and insert a new user
    ///
    /// Fails with `DuplicateEmail` if the email is taken; nothing is stored
    /// in that case.
    pub async fn insert(
        &self,
        name: DisplayName,
        email: Email,
        password: RawPassword,
    ) -> AuthResult<UserId> {
        let hasher = self.hasher.clone();
        let hashed = tokio::task::spawn_blocking(move || hasher.hash(password.inner())).await??;

        let new_user = NewUser::new(name, email, UserPassword::from_hashed(hashed));
        let user_id = self.repo.insert_user(&new_user).await?;

        tracing::info!(user_id = %user_id, "User created");

        Ok(user_id)
    }

    /// Fetch a user by id
    pub async fn get(&self, user_id: UserId) -> AuthResult<User> {
        self.repo
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}
