//! HTTP DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::user::User;
use crate::error::FieldErrors;

// ============================================================================
// Forms (application/x-www-form-urlencoded)
// ============================================================================

/// Sign up form
///
/// Missing fields deserialize as empty strings and are reported as blank.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

// ============================================================================
// Form page
// ============================================================================

/// Data for rendering the signup/login form
///
/// Echoes back non-secret input; the password is never returned.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPage {
    pub csrf_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub field_errors: FieldErrors,
    pub non_field_errors: Vec<String>,
}

impl FormPage {
    pub fn blank(csrf_token: impl Into<String>) -> Self {
        Self {
            csrf_token: csrf_token.into(),
            name: None,
            email: None,
            field_errors: FieldErrors::new(),
            non_field_errors: Vec::new(),
        }
    }
}

// ============================================================================
// Session Status
// ============================================================================

/// Session status response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub csrf_token: String,
}

// ============================================================================
// User Info (for authenticated users)
// ============================================================================

/// Current user info response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResponse {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub created: DateTime<Utc>,
    pub active: bool,
}

impl From<&User> for UserInfoResponse {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id.as_i64(),
            name: user.name.as_str().to_string(),
            email: user.email.as_str().to_string(),
            created: user.created_at,
            active: user.active,
        }
    }
}
