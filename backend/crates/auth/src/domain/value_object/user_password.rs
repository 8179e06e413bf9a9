//! User Password Value Object
//!
//! Domain value objects for user passwords.
//! Delegates to `platform::password` for cryptographic operations.
//!
//! ## Security Features
//! - Argon2id hashing (memory-hard), done by `CredentialHasher`
//! - Automatic memory zeroization
//! - Unicode NFKC normalization

use platform::password::{
    ClearTextPassword, HashedPassword, PasswordHashError, PasswordPolicyError,
};
use std::fmt;


// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input
///
/// Wrapper around `ClearTextPassword`.
/// Memory is automatically zeroized when dropped.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Create a new raw password for a new account, enforcing the policy
    ///
    /// - Minimum 10 characters, maximum 128
    /// - No control characters
    /// - No common patterns (sequential, keyboard, dictionary)
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        ClearTextPassword::new(raw).map(Self)
    }

    /// Wrap a password submitted at login; no policy applied
    pub fn for_verification(raw: String) -> Self {
        Self(ClearTextPassword::for_verification(raw))
    }

    /// Access the inner ClearTextPassword
    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Hashed user password for database storage
///
/// Stores password in Argon2id PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    pub fn from_hashed(hashed: HashedPassword) -> Self {
        Self(hashed)
    }

    /// Create from database value
    ///
    /// A value that is not a PHC string means the row is corrupt.
    pub fn from_db(hash: String) -> Result<Self, PasswordHashError> {
        HashedPassword::from_phc_string(hash).map(Self)
    }

    /// Get the PHC string for storage
    pub fn as_str(&self) -> &str {
        self.0.as_phc_string()
    }

    pub fn as_hashed(&self) -> &HashedPassword {
        &self.0
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserPassword").field(&"[HASH]").finish()
    }
}
