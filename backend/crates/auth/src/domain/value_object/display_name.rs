//! Display Name Value Object
//!
//! 表示名は画面に表示するための自由入力の名前。
//! 識別子ではないため一意性は要求しない。
//!
//! ## 不変条件
//! - NFC正規化・前後空白除去後に空でない
//! - 長さ: 最大255文字（正規化後）

use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// Maximum length for display name (in characters)
pub const DISPLAY_NAME_MAX_LENGTH: usize = 255;

/// Error returned when display name validation fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayNameError {
    /// Empty after normalization
    Blank,

    /// Longer than DISPLAY_NAME_MAX_LENGTH
    TooLong { length: usize, max: usize },
}

impl fmt::Display for DisplayNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => write!(f, "Name cannot be blank"),
            Self::TooLong { length, max } => {
                write!(f, "Name is too long ({length} chars, maximum {max})")
            }
        }
    }
}

impl std::error::Error for DisplayNameError {}

/// Validated, normalized display name
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DisplayName(String);

impl DisplayName {
    /// Create a new DisplayName from raw input (NFC, trim, validate)
    pub fn new(input: impl AsRef<str>) -> Result<Self, DisplayNameError> {
        let normalized: String = input.as_ref().nfc().collect::<String>().trim().to_string();

        if normalized.is_empty() {
            return Err(DisplayNameError::Blank);
        }

        let length = normalized.chars().count();
        if length > DISPLAY_NAME_MAX_LENGTH {
            return Err(DisplayNameError::TooLong {
                length,
                max: DISPLAY_NAME_MAX_LENGTH,
            });
        }

        Ok(Self(normalized))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DisplayName").field(&self.0).finish()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
