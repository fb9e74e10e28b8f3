use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::application::ports::account_repository::AccountRepository;
use crate::application::services::tokens::TokenIssuer;
use crate::application::testing::{InMemoryAccounts, InMemoryBlacklist, StalePrecheckAccounts};
use crate::bootstrap::app_context::{AppContext, AppServices};
use crate::bootstrap::config::Config;
use crate::presentation::http::accounts_router;

struct Harness {
    app: Router,
    accounts: Arc<InMemoryAccounts>,
}

fn router_with(accounts: Arc<dyn AccountRepository>) -> Router {
    let cfg = Config::from_lookup(|k| match k {
        "JWT_SECRET" => Some("router-test-secret".to_string()),
        _ => None,
    })
    .unwrap();
    let blacklist = Arc::new(InMemoryBlacklist::default());
    let tokens = TokenIssuer::from_config(&cfg);
    accounts_router(AppContext::new(
        cfg,
        AppServices::new(accounts, blacklist, tokens),
    ))
}

fn harness() -> Harness {
    let accounts = Arc::new(InMemoryAccounts::default());
    Harness {
        app: router_with(accounts.clone()),
        accounts,
    }
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn registration(username: &str, email: &str) -> Value {
    json!({
        "username": username,
        "email": email,
        "password": "hunter2-but-longer",
        "password_confirm": "hunter2-but-longer",
        "first_name": "Alan",
        "last_name": "Turing"
    })
}

async fn register(app: &Router, username: &str, email: &str) -> Value {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/auth/register/",
        None,
        Some(registration(username, email)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn register_returns_user_tokens_and_message() {
    let h = harness();
    let body = register(&h.app, "alan", "alan@example.com").await;
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["username"], "alan");
    assert_eq!(body["user"]["email"], "alan@example.com");
    assert_eq!(body["user"]["profile"]["bio"], "");
    assert!(body["user"]["profile"]["avatar"].is_null());
    assert!(body["user"].get("password").is_none());
    assert!(body["access"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body["refresh"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(h.accounts.len(), 1);
}

#[tokio::test]
async fn register_duplicate_email_is_400_field_error() {
    let h = harness();
    register(&h.app, "alan", "alan@example.com").await;
    let (status, body) = call(
        &h.app,
        Method::POST,
        "/api/auth/register/",
        None,
        Some(registration("alan2", "alan@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "email": ["A user with this email already exists."] }));
    assert_eq!(h.accounts.len(), 1);
}

#[tokio::test]
async fn register_conflict_raised_by_the_store_is_400_field_error() {
    let accounts = Arc::new(StalePrecheckAccounts::default());
    let app = router_with(accounts.clone());
    register(&app, "alan", "alan@example.com").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/register/",
        None,
        Some(registration("alan2", "alan@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "email": ["A user with this email already exists."] }));
    assert_eq!(accounts.inner.len(), 1);
}

#[tokio::test]
async fn register_refuses_null_characters() {
    let h = harness();
    let mut payload = registration("alan", "alan@example.com");
    payload["first_name"] = json!("Al\0an");
    let (status, body) =
        call(&h.app, Method::POST, "/api/auth/register/", None, Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "first_name": ["Null characters are not allowed."] }));
    assert_eq!(h.accounts.len(), 0);
}

#[tokio::test]
async fn login_errors_do_not_reveal_registered_emails() {
    let h = harness();
    register(&h.app, "alan", "alan@example.com").await;
    let (s1, wrong_password) = call(
        &h.app,
        Method::POST,
        "/api/auth/login/",
        None,
        Some(json!({ "email": "alan@example.com", "password": "wrong-password" })),
    )
    .await;
    let (s2, unknown_email) = call(
        &h.app,
        Method::POST,
        "/api/auth/login/",
        None,
        Some(json!({ "email": "ghost@example.com", "password": "hunter2-but-longer" })),
    )
    .await;
    assert_eq!(s1, StatusCode::BAD_REQUEST);
    assert_eq!(s2, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(
        wrong_password,
        json!({ "non_field_errors": ["Invalid email or password."] })
    );

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/api/auth/login/",
        None,
        Some(json!({ "email": "alan@example.com", "password": "hunter2-but-longer" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["username"], "alan");
}

#[tokio::test]
async fn profile_requires_bearer_token() {
    let h = harness();
    let (status, body) = call(&h.app, Method::GET, "/api/auth/profile/", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Authentication credentials were not provided.");

    let (status, body) =
        call(&h.app, Method::GET, "/api/auth/profile/", Some("nonsense"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "token_not_valid");
}

#[tokio::test]
async fn profile_returns_callers_own_view() {
    let h = harness();
    let alan = register(&h.app, "alan", "alan@example.com").await;
    register(&h.app, "ada", "ada@example.com").await;
    let token = alan["access"].as_str().unwrap();

    let (status, body) = call(&h.app, Method::GET, "/api/auth/profile/", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alan");
    assert_eq!(body["id"], alan["user"]["id"]);
    assert!(body["profile"]["created_at"].is_string());
}

#[tokio::test]
async fn refresh_token_cannot_be_used_after_logout() {
    let h = harness();
    let session = register(&h.app, "alan", "alan@example.com").await;
    let access = session["access"].as_str().unwrap();
    let refresh = session["refresh"].as_str().unwrap();

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/api/auth/token/refresh/",
        None,
        Some(json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Token refreshed successfully");
    assert!(body["access"].is_string());

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/api/auth/logout/",
        Some(access),
        Some(json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Logout successful" }));

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/api/auth/token/refresh/",
        None,
        Some(json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Token is blacklisted");
}

#[tokio::test]
async fn logout_soft_fails_on_bad_token_and_succeeds_without_one() {
    let h = harness();
    let session = register(&h.app, "alan", "alan@example.com").await;
    let access = session["access"].as_str().unwrap();

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/api/auth/logout/",
        Some(access),
        Some(json!({ "refresh": "definitely-not-a-jwt" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid token" }));

    let (status, _) = call(&h.app, Method::POST, "/api/auth/logout/", Some(access), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&h.app, Method::POST, "/api/auth/logout/", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

async fn logout_raw(
    app: &Router,
    access: &str,
    content_type: Option<&str>,
    body: impl Into<String>,
) -> (StatusCode, Value) {
    let mut req = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/logout/")
        .header(header::AUTHORIZATION, format!("Bearer {access}"));
    if let Some(ct) = content_type {
        req = req.header(header::CONTENT_TYPE, ct);
    }
    let res = app
        .clone()
        .oneshot(req.body(Body::from(body.into())).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn logout_rejects_unreadable_bodies_as_invalid_token() {
    let h = harness();
    let session = register(&h.app, "alan", "alan@example.com").await;
    let access = session["access"].as_str().unwrap();
    let refresh = session["refresh"].as_str().unwrap();

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/api/auth/logout/",
        Some(access),
        Some(json!({ "refresh": 42 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid token" }));

    let (status, body) =
        logout_raw(&h.app, access, Some("application/json"), r#"{"refresh": "eyJ"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid token" }));

    // Neither rejected body revoked anything.
    let (status, _) = call(
        &h.app,
        Method::POST,
        "/api/auth/token/refresh/",
        None,
        Some(json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn logout_revokes_token_sent_without_content_type() {
    let h = harness();
    let session = register(&h.app, "alan", "alan@example.com").await;
    let access = session["access"].as_str().unwrap();
    let refresh = session["refresh"].as_str().unwrap().to_string();
    let payload = json!({ "refresh": refresh }).to_string();

    let (status, body) = logout_raw(&h.app, access, None, payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Logout successful" }));

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/api/auth/token/refresh/",
        None,
        Some(json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Token is blacklisted");
}

#[tokio::test]
async fn patch_and_put_update_only_supplied_fields() {
    let h = harness();
    let session = register(&h.app, "alan", "alan@example.com").await;
    let access = session["access"].as_str().unwrap();

    let (status, body) = call(
        &h.app,
        Method::PATCH,
        "/api/auth/profile/update/",
        Some(access),
        Some(json!({ "first_name": "A." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile updated successfully");
    assert_eq!(body["user"]["first_name"], "A.");
    assert_eq!(body["user"]["last_name"], "Turing");
    assert_eq!(body["user"]["username"], "alan");

    let (status, body) = call(
        &h.app,
        Method::PUT,
        "/api/auth/profile/update/",
        Some(access),
        Some(json!({ "profile": { "bio": "Computable numbers." } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["profile"]["bio"], "Computable numbers.");
    assert_eq!(body["user"]["first_name"], "A.");
}

#[tokio::test]
async fn change_password_then_login_with_new_one() {
    let h = harness();
    let session = register(&h.app, "alan", "alan@example.com").await;
    let access = session["access"].as_str().unwrap();

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/api/auth/change-password/",
        Some(access),
        Some(json!({
            "old_password": "not-my-password",
            "new_password": "enigma-machine",
            "new_password_confirm": "enigma-machine"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "old_password": ["Old password is incorrect."] }));

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/api/auth/change-password/",
        Some(access),
        Some(json!({
            "old_password": "hunter2-but-longer",
            "new_password": "enigma-machine",
            "new_password_confirm": "enigma-machine"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password changed successfully");

    let (status, _) = call(
        &h.app,
        Method::POST,
        "/api/auth/login/",
        None,
        Some(json!({ "email": "alan@example.com", "password": "enigma-machine" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(
        &h.app,
        Method::POST,
        "/api/auth/login/",
        None,
        Some(json!({ "email": "alan@example.com", "password": "hunter2-but-longer" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn disabled_account_loses_access() {
    let h = harness();
    let session = register(&h.app, "alan", "alan@example.com").await;
    let access = session["access"].as_str().unwrap();
    let id = uuid::Uuid::parse_str(session["user"]["id"].as_str().unwrap()).unwrap();
    h.accounts.set_active(id, false);

    let (status, body) = call(&h.app, Method::GET, "/api/auth/profile/", Some(access), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "User is inactive");

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/api/auth/login/",
        None,
        Some(json!({ "email": "alan@example.com", "password": "hunter2-but-longer" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "non_field_errors": ["User account is disabled."] }));
}

#[tokio::test]
async fn malformed_json_is_a_400() {
    let h = harness();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = h.app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
