//! Email Value Object
//!
//! Represents a validated email address used as the login identity.
//! Stored exactly as entered (after trimming); lookups are case-sensitive.

use std::fmt;
use std::str::FromStr;

/// Maximum email length (per RFC 5321)
pub const EMAIL_MAX_LENGTH: usize = 254;

/// Error returned when email validation fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// Empty after trimming
    Blank,

    /// Longer than EMAIL_MAX_LENGTH bytes
    TooLong { max: usize },

    /// Not shaped like `local@domain.tld`
    InvalidFormat,
}

impl fmt::Display for EmailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => write!(f, "Email cannot be empty"),
            Self::TooLong { max } => write!(f, "Email must be at most {max} characters"),
            Self::InvalidFormat => write!(f, "Invalid email format"),
        }
    }
}

impl std::error::Error for EmailError {}

/// Email address value object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Create a new email with validation
    pub fn new(email: impl AsRef<str>) -> Result<Self, EmailError> {
        let email = email.as_ref().trim();

        if email.is_empty() {
            return Err(EmailError::Blank);
        }

        if email.len() > EMAIL_MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: EMAIL_MAX_LENGTH,
            });
        }

        if !Self::is_valid_format(email) {
            return Err(EmailError::InvalidFormat);
        }

        Ok(Self(email.to_string()))
    }

    /// Basic email format validation
    fn is_valid_format(email: &str) -> bool {
        // Must contain exactly one @
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };
        if domain.contains('@') {
            return false;
        }

        // Local part checks
        if local.is_empty() || local.len() > 64 {
            return false;
        }
        if local.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return false;
        }

        // Domain checks
        if domain.is_empty() || !domain.contains('.') {
            return false;
        }

        // Check domain has valid characters
        if !domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return false;
        }

        // Every label non-empty and not hyphen-bounded
        domain
            .split('.')
            .all(|label| !label.is_empty() && !label.starts_with('-') && !label.ends_with('-'))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    /// Get the email as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, EmailError> {
        Email::new(s)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_valid() {
        assert!(Email::new("bob@example.com").is_ok());
        assert!(Email::new("user.name@example.co.jp").is_ok());
        assert!(Email::new("user+tag@example.com").is_ok());
        assert!(Email::new("  test@mail.com ").is_ok());
    }

    #[test]
    fn test_email_invalid() {
        assert_eq!(Email::new(""), Err(EmailError::Blank));
        assert_eq!(Email::new("   "), Err(EmailError::Blank));
        for raw in [
            "bob@example.",
            "bobexample.com",
            "@example.com",
            "user@",
            "user@@example.com",
            "user@example",
            "user@.example.com",
            "user@example..com",
            "us er@example.com",
        ] {
            assert_eq!(Email::new(raw), Err(EmailError::InvalidFormat), "{raw}");
        }
    }

    #[test]
    fn test_email_too_long() {
        let raw = format!("{}@{}.com", "a".repeat(60), "b".repeat(200));
        assert_eq!(
            Email::new(raw),
            Err(EmailError::TooLong {
                max: EMAIL_MAX_LENGTH
            })
        );
    }

    #[test]
    fn test_email_case_is_preserved() {
        let email = Email::new("Bob@Example.COM").unwrap();
        assert_eq!(email.as_str(), "Bob@Example.COM");
        assert_ne!(email, Email::new("bob@example.com").unwrap());
    }
}
