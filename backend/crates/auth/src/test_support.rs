//! Shared fixtures for unit and router tests

use std::sync::{Arc, OnceLock};

use chrono::Utc;
use platform::password::{ClearTextPassword, CredentialHasher, PasswordCost};

use crate::application::config::AuthConfig;
use crate::domain::entity::user::{NewUser, User};
use crate::domain::value_object::{
    display_name::DisplayName, email::Email, user_id::UserId, user_password::UserPassword,
};

/// Cheapest Argon2 parameters, shared across tests
pub fn test_hasher() -> Arc<CredentialHasher> {
    static HASHER: OnceLock<Arc<CredentialHasher>> = OnceLock::new();
    HASHER
        .get_or_init(|| Arc::new(CredentialHasher::new(PasswordCost::minimal(), None).unwrap()))
        .clone()
}

pub fn test_config() -> AuthConfig {
    AuthConfig {
        password_cost: PasswordCost::minimal(),
        ..AuthConfig::development()
    }
}

fn hashed(password: &str) -> UserPassword {
    let clear = ClearTextPassword::for_verification(password.to_string());
    UserPassword::from_hashed(test_hasher().hash(&clear).unwrap())
}

/// Active stored user with a real hash of `password`
pub fn seeded_user(id: i64, email: &str, password: &str) -> User {
    User {
        user_id: UserId::from_i64(id),
        name: DisplayName::new("Test User").unwrap(),
        email: Email::new(email).unwrap(),
        password: hashed(password),
        created_at: Utc::now(),
        active: true,
    }
}

pub fn new_user(name: &str, email: &str, password: &str) -> NewUser {
    NewUser::new(
        DisplayName::new(name).unwrap(),
        Email::new(email).unwrap(),
        hashed(password),
    )
}
