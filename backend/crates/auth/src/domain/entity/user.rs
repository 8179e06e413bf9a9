//! User Entity
//!
//! Identity record: created on signup, never updated or deleted here.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    display_name::DisplayName, email::Email, user_id::UserId, user_password::UserPassword,
};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// Database-assigned identifier
    pub user_id: UserId,
    /// Display name (not unique)
    pub name: DisplayName,
    /// Login identity (unique, case-sensitive)
    pub email: Email,
    /// Argon2id hash of the password
    pub password: UserPassword,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Only active users can authenticate
    pub active: bool,
}

impl User {
    /// Check if user can login
    pub fn can_login(&self) -> bool {
        self.active
    }
}

/// User about to be inserted; the id comes back from storage
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: DisplayName,
    pub email: Email,
    pub password: UserPassword,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    pub fn new(name: DisplayName, email: Email, password: UserPassword) -> Self {
        Self {
            name,
            email,
            password,
            created_at: Utc::now(),
        }
    }

    /// The stored record once storage has assigned `user_id`
    pub fn into_user(self, user_id: UserId) -> User {
        User {
            user_id,
            name: self.name,
            email: self.email,
            password: self.password,
            created_at: self.created_at,
            active: true,
        }
    }
}
