//! CSRF Guard
//!
//! State-changing requests must echo the session's anti-forgery token.

use axum::http::Method;

use crate::domain::value_object::csrf_token::CsrfToken;
use crate::error::{AuthError, AuthResult};

/// Form field carrying the token
pub const CSRF_FORM_FIELD: &str = "csrf_token";

/// Header carrying the token for non-form clients
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Whether requests with this method must pass the check
pub fn requires_check(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Compare the submitted token with the session's
pub fn verify(expected: &CsrfToken, submitted: Option<&str>) -> AuthResult<()> {
    match submitted {
        Some(token) if expected.matches(token) => Ok(()),
        _ => Err(AuthError::CsrfMismatch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_check() {
        assert!(requires_check(&Method::POST));
        assert!(requires_check(&Method::PUT));
        assert!(requires_check(&Method::PATCH));
        assert!(requires_check(&Method::DELETE));
        assert!(!requires_check(&Method::GET));
        assert!(!requires_check(&Method::HEAD));
        assert!(!requires_check(&Method::OPTIONS));
    }

    #[test]
    fn test_verify() {
        let token = CsrfToken::generate();
        assert!(verify(&token, Some(token.as_str())).is_ok());
        assert!(matches!(
            verify(&token, Some("wrongToken")),
            Err(AuthError::CsrfMismatch)
        ));
        assert!(matches!(verify(&token, None), Err(AuthError::CsrfMismatch)));
    }
}
