//! Auth Router

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};

use crate::application::config::AuthConfig;
use crate::domain::repository::AuthRepository;
use crate::error::AuthResult;
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{csrf_protect, load_session, require_authentication};

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(repo: PgAuthRepository, config: AuthConfig) -> AuthResult<Router> {
    auth_router_generic(repo, config)
}

/// Create a generic Auth router for any repository implementation
///
/// Layers run outermost first: session loading, then the CSRF guard, then
/// (on protected routes only) the authentication check.
pub fn auth_router_generic<R>(repo: R, config: AuthConfig) -> AuthResult<Router>
where
    R: AuthRepository,
{
    let state = AuthAppState::new(repo, config)?;

    let protected = Router::new()
        .route("/user/logout", post(handlers::sign_out::<R>))
        .route("/user/me", get(handlers::me))
        .route_layer(from_fn_with_state(
            state.clone(),
            require_authentication::<R>,
        ));

    let router = Router::new()
        .route(
            "/user/signup",
            get(handlers::sign_up_form).post(handlers::sign_up::<R>),
        )
        .route(
            "/user/login",
            get(handlers::sign_in_form).post(handlers::sign_in::<R>),
        )
        .route("/user/status", get(handlers::session_status::<R>))
        .merge(protected)
        .layer(from_fn(csrf_protect))
        .layer(from_fn_with_state(state.clone(), load_session::<R>))
        .with_state(state);

    Ok(router)
}
