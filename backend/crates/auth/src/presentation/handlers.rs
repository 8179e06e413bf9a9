//! HTTP Handlers

use axum::extract::{Extension, Form, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use platform::cookie::set_cookie_header;
use platform::password::CredentialHasher;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::sign_up::duplicate_email_errors;
use crate::application::{
    ExpirySweeper, SessionBinder, SignInInput, SignInUseCase, SignOutUseCase, SignUpInput, SignUpUseCase,
};
use crate::domain::repository::AuthRepository;
use crate::domain::value_object::session_id::SessionId;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    FormPage, SignInForm, SignUpForm, StatusResponse, UserInfoResponse,
};
use crate::presentation::middleware::{CurrentSession, CurrentUser};

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: AuthRepository,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
    pub hasher: Arc<CredentialHasher>,
    pub sweeper: Arc<ExpirySweeper>,
}

impl<R> AuthAppState<R>
where
    R: AuthRepository,
{
    /// Build state; the password hasher (and its dummy hash) is set up here
    pub fn new(repo: R, config: AuthConfig) -> AuthResult<Self> {
        let hasher = CredentialHasher::new(config.password_cost, config.pepper())?;
        let sweeper = ExpirySweeper::new(config.session_sweep_interval);

        Ok(Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
            hasher: Arc::new(hasher),
            sweeper: Arc::new(sweeper),
        })
    }

    pub fn binder(&self) -> SessionBinder<R> {
        SessionBinder::new(self.repo.clone(), self.config.clone())
            .with_sweeper(self.sweeper.clone())
    }

    /// `Set-Cookie` value referencing `session_id`
    pub fn session_cookie(&self, session_id: SessionId) -> AuthResult<HeaderValue> {
        let token = self.binder().issue_token(session_id)?;
        set_cookie_header(&self.config.cookie_config(), &token)
            .map_err(|e| AuthError::Internal(format!("Invalid session cookie: {e}")))
    }
}

// ============================================================================
// Sign Up
// ============================================================================

/// GET /user/signup
pub async fn sign_up_form(
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> Json<FormPage> {
    Json(FormPage::blank(session.csrf_token.as_str()))
}

/// POST /user/signup
///
/// 303 to the login page on success. Validation problems and a taken email
/// re-render the form (200) with field errors.
pub async fn sign_up<R>(
    State(state): State<AuthAppState<R>>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    Form(form): Form<SignUpForm>,
) -> AuthResult<Response>
where
    R: AuthRepository,
{
    let use_case = SignUpUseCase::new(state.repo.clone(), state.hasher.clone());

    let SignUpForm {
        name,
        email,
        password,
    } = form;

    let input = SignUpInput {
        name: name.clone(),
        email: email.clone(),
        password,
    };

    let field_errors = match use_case.execute(input).await {
        Ok(_) => return Ok(Redirect::to(&state.config.login_path).into_response()),
        Err(AuthError::Validation(errors)) => errors,
        Err(AuthError::DuplicateEmail) => duplicate_email_errors(),
        Err(e) => return Err(e),
    };

    let page = FormPage {
        name: Some(name),
        email: Some(email),
        field_errors,
        ..FormPage::blank(session.csrf_token.as_str())
    };

    Ok((StatusCode::OK, Json(page)).into_response())
}

// ============================================================================
// Sign In
// ============================================================================

/// GET /user/login
pub async fn sign_in_form(
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> Json<FormPage> {
    Json(FormPage::blank(session.csrf_token.as_str()))
}

/// POST /user/login
///
/// 303 to the post-login page on success; 401 with one generic message
/// otherwise.
pub async fn sign_in<R>(
    State(state): State<AuthAppState<R>>,
    Extension(CurrentSession(mut session)): Extension<CurrentSession>,
    Form(form): Form<SignInForm>,
) -> AuthResult<Response>
where
    R: AuthRepository,
{
    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.hasher.clone(),
        state.config.clone(),
    );

    // form のムーブ後もフォーム再表示に使えるように email を退避
    let email = form.email.clone();

    let input = SignInInput {
        email: form.email,
        password: form.password,
    };

    match use_case.execute(&mut session, input).await {
        Ok(output) => {
            let mut response = Redirect::to(&state.config.after_login_path).into_response();
            if output.session_rotated {
                let cookie = state.session_cookie(session.session_id)?;
                response.headers_mut().append(header::SET_COOKIE, cookie);
            }
            Ok(response)
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("Invalid login attempt");

            let page = FormPage {
                email: Some(email),
                non_field_errors: vec![AuthError::InvalidCredentials.to_string()],
                ..FormPage::blank(session.csrf_token.as_str())
            };
            Ok((StatusCode::UNAUTHORIZED, Json(page)).into_response())
        }
        Err(e) => Err(e),
    }
}

// ============================================================================
// Sign Out
// ============================================================================

/// POST /user/logout
pub async fn sign_out<R>(
    State(state): State<AuthAppState<R>>,
    Extension(CurrentSession(mut session)): Extension<CurrentSession>,
) -> AuthResult<Redirect>
where
    R: AuthRepository,
{
    SignOutUseCase::new(state.repo.clone(), state.config.clone())
        .execute(&mut session)
        .await?;

    Ok(Redirect::to("/"))
}

// ============================================================================
// Session / User info
// ============================================================================

/// GET /user/status
pub async fn session_status<R>(
    State(state): State<AuthAppState<R>>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> Json<StatusResponse>
where
    R: AuthRepository,
{
    let user_id = state.binder().resolve(&session);

    Json(StatusResponse {
        authenticated: user_id.is_some(),
        user_id: user_id.map(|id| id.as_i64()),
        csrf_token: session.csrf_token.as_str().to_string(),
    })
}

/// GET /user/me (requires authentication)
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserInfoResponse> {
    Json(UserInfoResponse::from(&user))
}
