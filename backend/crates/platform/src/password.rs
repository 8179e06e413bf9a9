//! Password Hashing and Verification
//!
//! - Argon2id hashing with cost parameters fixed per deployment
//! - Zeroization of clear-text secrets
//! - Constant-shape verification: a precomputed dummy hash lets callers
//!   spend the same work when no stored hash exists
//!
//! ## Security Features
//! - Memory-hard hashing prevents GPU/ASIC attacks
//! - Zeroization prevents memory inspection attacks
//! - Pepper support for additional security layer

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

// ============================================================================
// Constants
// ============================================================================

/// Minimum password length (in Unicode code points)
pub const MIN_PASSWORD_LENGTH: usize = 10;

/// Maximum password length (in Unicode code points)
pub const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    /// Password is too short
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    /// Password is too long
    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    /// Password contains only whitespace
    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    /// Password contains invalid characters (control characters)
    #[error("Password contains invalid control characters")]
    InvalidCharacter,

    /// Password matches common patterns (sequential, repeated)
    #[error("Password is too common or follows a predictable pattern")]
    CommonPattern,
}

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Hashing operation failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Invalid hash format
    #[error("Invalid password hash format")]
    InvalidHashFormat,

    /// Cost parameters rejected by Argon2
    #[error("Invalid password hashing cost: {0}")]
    InvalidCost(String),
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// ## Security
/// - Implements `Zeroize` and `ZeroizeOnDrop`
/// - Does not implement `Clone` to prevent accidental copies
/// - Debug output is redacted
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Create a new clear text password for storage, enforcing the policy
    ///
    /// - At least [`MIN_PASSWORD_LENGTH`] and at most [`MAX_PASSWORD_LENGTH`] code points
    /// - No control characters
    /// - Not empty/whitespace only
    /// - Not a common or predictable password
    ///
    /// Unicode is normalized using NFKC before validation.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let password = Self::for_verification(raw);
        let normalized = password.0.as_str();

        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        let char_count = normalized.chars().count();

        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        // Space, tab and newline are allowed
        if normalized
            .chars()
            .any(|ch| ch.is_control() && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        if is_common_pattern(normalized) {
            return Err(PasswordPolicyError::CommonPattern);
        }

        Ok(password)
    }

    /// Wrap a submitted password for verification only
    ///
    /// No policy is applied: a login attempt must reach the hash comparison
    /// whatever it contains. The same NFKC normalization as [`Self::new`] is
    /// applied so both sides hash identical bytes.
    pub fn for_verification(raw: String) -> Self {
        let mut raw = raw;
        let normalized: String = raw.nfkc().collect();
        raw.zeroize();
        Self(normalized)
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Hashed password in PHC string format
///
/// The PHC string embeds algorithm, version, cost parameters and salt, so a
/// hash stays verifiable after the configured cost changes.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Create from PHC string (e.g., from database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    /// Get the PHC string for storage
    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Cost parameters
// ============================================================================

/// Argon2id cost parameters
///
/// Fixed for the lifetime of a deployment. Every new hash and the dummy hash
/// use the same values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordCost {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for PasswordCost {
    /// OWASP recommended Argon2id parameters: m=19456 (19 MiB), t=2, p=1
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl PasswordCost {
    /// Smallest cost Argon2 accepts. Only for tests.
    pub const fn minimal() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: 1,
            parallelism: 1,
        }
    }

    fn params(&self) -> Result<Params, PasswordHashError> {
        Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| PasswordHashError::InvalidCost(e.to_string()))
    }
}

// ============================================================================
// Credential Hasher
// ============================================================================

/// Hashes and verifies passwords with a fixed Argon2id configuration
///
/// Holds a dummy hash computed at construction so that verifying against a
/// missing record costs the same as verifying against a real one.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    pepper: Option<Zeroizing<Vec<u8>>>,
    dummy: HashedPassword,
}

impl CredentialHasher {
    pub fn new(cost: PasswordCost, pepper: Option<&[u8]>) -> Result<Self, PasswordHashError> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, cost.params()?);
        let pepper = pepper.map(|p| Zeroizing::new(p.to_vec()));

        let dummy_secret = ClearTextPassword(crate::crypto::random_token(32));
        let dummy = hash_with(&argon2, pepper.as_deref().map(|p| p.as_slice()), &dummy_secret)?;

        Ok(Self {
            argon2,
            pepper,
            dummy,
        })
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &ClearTextPassword) -> Result<HashedPassword, PasswordHashError> {
        hash_with(&self.argon2, self.pepper(), password)
    }

    /// Verify a password against a stored hash
    ///
    /// Argon2 compares the derived hash in constant time. A malformed stored
    /// hash verifies as `false`.
    pub fn verify(&self, hashed: &HashedPassword, password: &ClearTextPassword) -> bool {
        let Ok(parsed) = PasswordHash::new(hashed.as_phc_string()) else {
            return false;
        };
        let input = peppered(password, self.pepper());
        self.argon2.verify_password(&input, &parsed).is_ok()
    }

    /// Spend one verification against the dummy hash
    ///
    /// Always `false` in practice: the dummy secret is random and never leaves
    /// this struct.
    pub fn verify_dummy(&self, password: &ClearTextPassword) -> bool {
        self.verify(&self.dummy, password)
    }

    fn pepper(&self) -> Option<&[u8]> {
        self.pepper.as_deref().map(|p| p.as_slice())
    }
}

impl fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

fn hash_with(
    argon2: &Argon2<'static>,
    pepper: Option<&[u8]>,
    password: &ClearTextPassword,
) -> Result<HashedPassword, PasswordHashError> {
    let input = peppered(password, pepper);

    // 128-bit random salt
    let salt = SaltString::generate(&mut OsRng);

    let hash = argon2
        .hash_password(&input, &salt)
        .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

    Ok(HashedPassword {
        hash: hash.to_string(),
    })
}

fn peppered(password: &ClearTextPassword, pepper: Option<&[u8]>) -> Zeroizing<Vec<u8>> {
    let mut combined = password.as_bytes().to_vec();
    if let Some(p) = pepper {
        combined.extend_from_slice(p);
    }
    Zeroizing::new(combined)
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Check for common weak patterns
fn is_common_pattern(password: &str) -> bool {
    let lower = password.to_lowercase();

    // All same character (e.g., "aaaaaaaaaa")
    let mut chars = lower.chars();
    if let Some(first) = chars.next() {
        if chars.all(|c| c == first) {
            return true;
        }
    }

    if is_sequential_numbers(&lower) {
        return true;
    }

    const KEYBOARD_PATTERNS: &[&str] = &[
        "qwerty",
        "asdfgh",
        "zxcvbn",
        "qazwsx",
        "1qaz2wsx",
    ];

    if KEYBOARD_PATTERNS.iter().any(|p| lower.contains(p)) {
        return true;
    }

    const COMMON_PASSWORDS: &[&str] = &[
        "password123",
        "password1234",
        "1234567890",
        "abcdefghij",
        "iloveyou123",
        "letmein123",
        "welcome123",
        "admin12345",
        "trustno1234",
        "passw0rd123",
    ];

    COMMON_PASSWORDS.contains(&lower.as_str())
}

/// Check if string consists of a run of sequential digits
fn is_sequential_numbers(s: &str) -> bool {
    if !s.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let digits: Vec<u32> = s.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() < 4 {
        return false;
    }

    let is_ascending = digits
        .windows(2)
        .all(|w| w[1] == w[0] + 1 || (w[0] == 9 && w[1] == 0));

    let is_descending = digits
        .windows(2)
        .all(|w| w[0] == w[1] + 1 || (w[0] == 0 && w[1] == 9));

    is_ascending || is_descending
}

// ============================================================================
// Tests
// ============================================================================
