//! Router-level tests against the in-memory repository

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use crate::application::config::AuthConfig;
use crate::application::session_binder::SessionBinder;
use crate::domain::entity::session::Session;
use crate::domain::repository::SessionRepository;
use crate::domain::value_object::user_id::UserId;
use crate::infra::memory::InMemoryAuthRepository;
use crate::presentation::router::auth_router_generic;
use crate::test_support::{seeded_user, test_config};

const SEEDED_EMAIL: &str = "test@mail.com";
const SEEDED_PASSWORD: &str = "pa55word-for-tests";

fn app(repo: &InMemoryAuthRepository, config: AuthConfig) -> Router {
    auth_router_generic(repo.clone(), config).unwrap()
}

fn seeded_repo() -> InMemoryAuthRepository {
    InMemoryAuthRepository::with_users(vec![seeded_user(1, SEEDED_EMAIL, SEEDED_PASSWORD)])
}

fn form(pairs: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

async fn get(app: &Router, path: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(app: &Router, path: &str, cookie: &str, body: String) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// `name=value` pair of the session cookie set by the response
fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Open a session through the signup form; returns (cookie, csrf token)
async fn open_session(app: &Router) -> (String, String) {
    let response = get(app, "/user/signup", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response).expect("session cookie issued");
    let page = json(response).await;
    let csrf = page["csrfToken"].as_str().unwrap().to_string();
    (cookie, csrf)
}

async fn login(app: &Router, cookie: &str, csrf: &str) -> Response<Body> {
    post_form(
        app,
        "/user/login",
        cookie,
        form(&[
            ("email", SEEDED_EMAIL),
            ("password", SEEDED_PASSWORD),
            ("csrf_token", csrf),
        ]),
    )
    .await
}

// ============================================================================
// Signup
// ============================================================================

#[tokio::test]
async fn test_signup_form_issues_session_and_token() {
    let repo = InMemoryAuthRepository::new();
    let app = app(&repo, test_config());

    let response = get(&app, "/user/signup", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));

    let page = json(response).await;
    assert!(!page["csrfToken"].as_str().unwrap().is_empty());
    assert_eq!(repo.session_count().await, 1);
}

#[tokio::test]
async fn test_signup_success_redirects_to_login() {
    let repo = InMemoryAuthRepository::new();
    let app = app(&repo, test_config());
    let (cookie, csrf) = open_session(&app).await;

    let response = post_form(
        &app,
        "/user/signup",
        &cookie,
        form(&[
            ("name", "Bob"),
            ("email", "bob@example.com"),
            ("password", "validPa$$word"),
            ("csrf_token", csrf.as_str()),
        ]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/user/login");
    assert_eq!(repo.count_by_email("bob@example.com").await, 1);
}

#[tokio::test]
async fn test_signup_duplicate_email_rerenders_form() {
    let repo = InMemoryAuthRepository::with_users(vec![seeded_user(
        1,
        "dupe@example.com",
        SEEDED_PASSWORD,
    )]);
    let app = app(&repo, test_config());
    let (cookie, csrf) = open_session(&app).await;

    let response = post_form(
        &app,
        "/user/signup",
        &cookie,
        form(&[
            ("name", "Dupe"),
            ("email", "dupe@example.com"),
            ("password", "validPa$$word"),
            ("csrf_token", csrf.as_str()),
        ]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let page = json(response).await;
    assert_eq!(page["fieldErrors"]["email"], "Address is already in use");
    assert_eq!(page["email"], "dupe@example.com");
    assert_eq!(page["csrfToken"], csrf.as_str());
    assert!(page.get("password").is_none());
    assert_eq!(repo.count_by_email("dupe@example.com").await, 1);
}

#[tokio::test]
async fn test_signup_validation_messages() {
    let repo = InMemoryAuthRepository::new();
    let app = app(&repo, test_config());
    let (cookie, csrf) = open_session(&app).await;

    let response = post_form(
        &app,
        "/user/signup",
        &cookie,
        form(&[
            ("name", "   "),
            ("email", "not-an-email"),
            ("password", "short"),
            ("csrf_token", csrf.as_str()),
        ]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let page = json(response).await;
    assert_eq!(page["fieldErrors"]["name"], "This field cannot be blank");
    assert_eq!(page["fieldErrors"]["email"], "This field is invalid");
    assert_eq!(
        page["fieldErrors"]["password"],
        "This field is too short (minimum is 10 characters)"
    );
    assert_eq!(repo.user_count().await, 0);
}

#[tokio::test]
async fn test_signup_with_wrong_csrf_token_is_rejected() {
    let repo = InMemoryAuthRepository::new();
    let app = app(&repo, test_config());
    let (cookie, _) = open_session(&app).await;

    let response = post_form(
        &app,
        "/user/signup",
        &cookie,
        form(&[
            ("name", "Bob"),
            ("email", "bob@example.com"),
            ("password", "validPa$$word"),
            ("csrf_token", "wrongToken"),
        ]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(repo.user_count().await, 0);
}

#[tokio::test]
async fn test_post_without_any_csrf_token_is_rejected() {
    let repo = InMemoryAuthRepository::new();
    let app = app(&repo, test_config());
    let (cookie, _) = open_session(&app).await;

    let response = post_form(
        &app,
        "/user/signup",
        &cookie,
        form(&[
            ("name", "Bob"),
            ("email", "bob@example.com"),
            ("password", "validPa$$word"),
        ]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(repo.user_count().await, 0);
}

// ============================================================================
// Login / Logout
// ============================================================================

#[tokio::test]
async fn test_login_binds_session_and_keeps_csrf_token() {
    let repo = seeded_repo();
    let app = app(&repo, test_config());
    let (cookie, csrf) = open_session(&app).await;

    let response = login(&app, &cookie, &csrf).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(session_cookie(&response).is_none());

    let status = json(get(&app, "/user/status", Some(&cookie)).await).await;
    assert_eq!(status["authenticated"], true);
    assert_eq!(status["userId"], 1);
    assert_eq!(status["csrfToken"], csrf.as_str());
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let repo = seeded_repo();
    let app = app(&repo, test_config());
    let (cookie, csrf) = open_session(&app).await;

    let response = post_form(
        &app,
        "/user/login",
        &cookie,
        form(&[
            ("email", SEEDED_EMAIL),
            ("password", "not-the-password"),
            ("csrf_token", csrf.as_str()),
        ]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let page = json(response).await;
    assert_eq!(page["nonFieldErrors"][0], "Invalid email or password");
    assert_eq!(page["email"], SEEDED_EMAIL);

    let status = json(get(&app, "/user/status", Some(&cookie)).await).await;
    assert_eq!(status["authenticated"], false);
}

#[tokio::test]
async fn test_login_with_unknown_email_looks_the_same() {
    let repo = seeded_repo();
    let app = app(&repo, test_config());
    let (cookie, csrf) = open_session(&app).await;

    let response = post_form(
        &app,
        "/user/login",
        &cookie,
        form(&[
            ("email", "nobody@mail.com"),
            ("password", SEEDED_PASSWORD),
            ("csrf_token", csrf.as_str()),
        ]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let page = json(response).await;
    assert_eq!(page["nonFieldErrors"][0], "Invalid email or password");
}

#[tokio::test]
async fn test_login_with_wrong_csrf_token_does_not_authenticate() {
    let repo = seeded_repo();
    let app = app(&repo, test_config());
    let (cookie, _) = open_session(&app).await;

    let response = post_form(
        &app,
        "/user/login",
        &cookie,
        form(&[
            ("email", SEEDED_EMAIL),
            ("password", SEEDED_PASSWORD),
            ("csrf_token", "wrongToken"),
        ]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let status = json(get(&app, "/user/status", Some(&cookie)).await).await;
    assert_eq!(status["authenticated"], false);
    assert!(status["userId"].is_null());
}

#[tokio::test]
async fn test_login_with_rotation_reissues_cookie() {
    let repo = seeded_repo();
    let config = AuthConfig {
        rotate_session_on_sign_in: true,
        ..test_config()
    };
    let app = app(&repo, config);
    let (cookie, csrf) = open_session(&app).await;

    let response = login(&app, &cookie, &csrf).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let rotated = session_cookie(&response).expect("rotated cookie");
    assert_ne!(rotated, cookie);

    let status = json(get(&app, "/user/status", Some(&rotated)).await).await;
    assert_eq!(status["authenticated"], true);
    assert_eq!(status["csrfToken"], csrf.as_str());

    // The old id no longer names a session
    let response = get(&app, "/user/status", Some(&cookie)).await;
    assert!(session_cookie(&response).is_some());
    assert_eq!(json(response).await["authenticated"], false);
}

#[tokio::test]
async fn test_logout_returns_session_to_anonymous() {
    let repo = seeded_repo();
    let app = app(&repo, test_config());
    let (cookie, csrf) = open_session(&app).await;
    login(&app, &cookie, &csrf).await;

    let response = post_form(
        &app,
        "/user/logout",
        &cookie,
        form(&[("csrf_token", csrf.as_str())]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let status = json(get(&app, "/user/status", Some(&cookie)).await).await;
    assert_eq!(status["authenticated"], false);

    let response = get(&app, "/user/me", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/user/login");
}

#[tokio::test]
async fn test_csrf_token_accepted_from_header() {
    let repo = seeded_repo();
    let app = app(&repo, test_config());
    let (cookie, csrf) = open_session(&app).await;
    login(&app, &cookie, &csrf).await;

    let request = Request::builder()
        .method("POST")
        .uri("/user/logout")
        .header(header::COOKIE, &cookie)
        .header("x-csrf-token", &csrf)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let request = Request::builder()
        .method("POST")
        .uri("/user/logout")
        .header(header::COOKIE, &cookie)
        .header("x-csrf-token", "wrongToken")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Protected routes
// ============================================================================

#[tokio::test]
async fn test_protected_route_redirects_anonymous() {
    let repo = seeded_repo();
    let app = app(&repo, test_config());

    let response = get(&app, "/user/me", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/user/login");
}

#[tokio::test]
async fn test_protected_route_serves_authenticated_user() {
    let repo = seeded_repo();
    let app = app(&repo, test_config());
    let (cookie, csrf) = open_session(&app).await;
    login(&app, &cookie, &csrf).await;

    let response = get(&app, "/user/me", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );

    let user = json(response).await;
    assert_eq!(user["userId"], 1);
    assert_eq!(user["email"], SEEDED_EMAIL);
    assert_eq!(user["name"], "Test User");
    assert!(user.get("password").is_none());
}

// ============================================================================
// Session cookie handling
// ============================================================================

#[tokio::test]
async fn test_tampered_cookie_gets_fresh_session() {
    let repo = seeded_repo();
    let app = app(&repo, test_config());
    let (cookie, csrf) = open_session(&app).await;
    login(&app, &cookie, &csrf).await;

    let (name_and_id, _) = cookie.split_once('.').unwrap();
    let tampered = format!("{name_and_id}.AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA");

    let response = get(&app, "/user/status", Some(&tampered)).await;
    let fresh = session_cookie(&response).expect("new session cookie");
    assert_ne!(fresh, cookie);

    let status = json(response).await;
    assert_eq!(status["authenticated"], false);
    assert_ne!(status["csrfToken"], csrf.as_str());
}

#[tokio::test]
async fn test_expired_session_is_replaced() {
    let repo = seeded_repo();
    let config = test_config();
    let binder = SessionBinder::new(Arc::new(repo.clone()), Arc::new(config.clone()));
    let app = app(&repo, config);

    let mut expired = Session::new_anonymous(chrono::Duration::hours(1));
    expired.bind(UserId::from_i64(1));
    expired.expires_at_ms = 0;
    repo.create_session(&expired).await.unwrap();

    let token = binder.issue_token(expired.session_id).unwrap();
    let cookie = format!("session={token}");

    let response = get(&app, "/user/me", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/user/login");
    assert!(session_cookie(&response).is_some());
    assert!(repo.find_session(expired.session_id).await.unwrap().is_none());
}

// ============================================================================
// Expired session sweep
// ============================================================================

async fn store_expired_sessions(repo: &InMemoryAuthRepository, count: usize) {
    for _ in 0..count {
        let mut expired = Session::new_anonymous(chrono::Duration::hours(1));
        expired.expires_at_ms = 0;
        repo.create_session(&expired).await.unwrap();
    }
}

#[tokio::test]
async fn test_cookieless_requests_sweep_expired_sessions() {
    let repo = seeded_repo();
    store_expired_sessions(&repo, 25).await;
    let app = app(&repo, test_config());

    let response = get(&app, "/user/status", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(repo.session_count().await, 1);
}

#[tokio::test]
async fn test_session_store_stays_bounded_under_cookieless_traffic() {
    let repo = seeded_repo();
    let config = AuthConfig {
        session_ttl: std::time::Duration::ZERO,
        session_sweep_interval: std::time::Duration::ZERO,
        ..test_config()
    };
    let app = app(&repo, config);
    store_expired_sessions(&repo, 10).await;

    for _ in 0..50 {
        let response = get(&app, "/user/status", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(session_cookie(&response).is_some());
    }
    let response = get(&app, "/user/me", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // Every new session expires immediately; only the latest survives
    assert!(repo.session_count().await <= 1);
}
