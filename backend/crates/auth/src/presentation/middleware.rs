//! Auth Middleware
//!
//! Applied in this order on every auth route:
//! load session -> CSRF guard -> require authentication (protected routes) -> handler.

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use platform::cookie::{extract_cookie, has_set_cookie};

use crate::application::csrf_guard::{self, CSRF_FORM_FIELD, CSRF_HEADER};
use crate::domain::entity::{session::Session, user::User};
use crate::domain::repository::AuthRepository;
use crate::domain::value_object::csrf_token::CsrfToken;
use crate::error::AuthError;
use crate::presentation::handlers::AuthAppState;

/// Largest form body buffered for the CSRF check (64 KiB)
const MAX_FORM_BYTES: usize = 64 * 1024;

/// Session of the current request, set by [`load_session`]
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

/// Authenticated user, set by [`require_authentication`]
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Resume the session named by the cookie or start an anonymous one
///
/// A newly started session gets its cookie on the way out, unless the
/// handler already set one.
pub async fn load_session<R>(
    State(state): State<AuthAppState<R>>,
    mut req: Request,
    next: Next,
) -> Response
where
    R: AuthRepository,
{
    let token = extract_cookie(req.headers(), &state.config.session_cookie_name);

    let loaded = match state.binder().resume_or_start(token.as_deref()).await {
        Ok(loaded) => loaded,
        Err(e) => return e.into_response(),
    };

    let session_id = loaded.session.session_id;
    req.extensions_mut().insert(CurrentSession(loaded.session));

    let mut response = next.run(req).await;

    if loaded.issued && !has_set_cookie(response.headers(), &state.config.session_cookie_name) {
        match state.session_cookie(session_id) {
            Ok(cookie) => {
                response.headers_mut().append(header::SET_COOKIE, cookie);
            }
            Err(e) => return e.into_response(),
        }
    }

    response
}

/// Reject state-changing requests without the session's CSRF token
///
/// The token is read from the `X-CSRF-Token` header, or else from the
/// `csrf_token` field of a urlencoded body. The body is buffered and handed
/// on unchanged.
pub async fn csrf_protect(req: Request, next: Next) -> Response {
    if !csrf_guard::requires_check(req.method()) {
        return next.run(req).await;
    }

    let Some(expected) = req
        .extensions()
        .get::<CurrentSession>()
        .map(|s| s.0.csrf_token.clone())
    else {
        return AuthError::Internal("CSRF guard installed without session layer".into())
            .into_response();
    };

    let header_check = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|token| csrf_guard::verify(&expected, Some(token)));

    if let Some(result) = header_check {
        return match result {
            Ok(()) => next.run(req).await,
            Err(e) => e.into_response(),
        };
    }

    let (parts, body) = req.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_FORM_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::PAYLOAD_TOO_LARGE.into_response(),
    };

    if let Err(e) = verify_form_token(&expected, &bytes) {
        return e.into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn verify_form_token(expected: &CsrfToken, body: &Bytes) -> Result<(), AuthError> {
    let submitted = url::form_urlencoded::parse(body)
        .find(|(key, _)| key == CSRF_FORM_FIELD)
        .map(|(_, value)| value.into_owned());

    csrf_guard::verify(expected, submitted.as_deref())
}

/// Only let authenticated, active users through
///
/// Anonymous sessions are sent to the login page with `303 See Other`.
/// Responses are marked `Cache-Control: no-store`.
pub async fn require_authentication<R>(
    State(state): State<AuthAppState<R>>,
    mut req: Request,
    next: Next,
) -> Response
where
    R: AuthRepository,
{
    let subject = req
        .extensions()
        .get::<CurrentSession>()
        .and_then(|s| state.binder().resolve(&s.0));

    let user = match subject {
        Some(user_id) => match state.repo.find_user_by_id(user_id).await {
            Ok(user) => user.filter(User::can_login),
            Err(e) => return e.into_response(),
        },
        None => None,
    };

    let Some(user) = user else {
        return Redirect::to(&state.config.login_path).into_response();
    };

    req.extensions_mut().insert(CurrentUser(user));

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_form_token() {
        let token = CsrfToken::from_db("abc-123_x");
        let ok = Bytes::from("name=Bob&csrf_token=abc-123_x&password=p");
        assert!(verify_form_token(&token, &ok).is_ok());

        let wrong = Bytes::from("name=Bob&csrf_token=wrongToken");
        assert!(matches!(
            verify_form_token(&token, &wrong),
            Err(AuthError::CsrfMismatch)
        ));

        let missing = Bytes::from("name=Bob");
        assert!(verify_form_token(&token, &missing).is_err());
    }

    #[test]
    fn test_form_token_is_url_decoded() {
        let token = CsrfToken::from_db("a b+c");
        let body = Bytes::from("csrf_token=a+b%2Bc");
        assert!(verify_form_token(&token, &body).is_ok());
    }
}
