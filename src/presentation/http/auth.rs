use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::post,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::dto::accounts::{LoginInput, RegisterInput};
use crate::application::error::ServiceError;
use crate::application::use_cases::auth::AuthSession;
use crate::application::use_cases::auth::login::Login;
use crate::application::use_cases::auth::logout::Logout;
use crate::application::use_cases::auth::refresh_token::RefreshAccessToken;
use crate::application::use_cases::auth::register::Register;
use crate::bootstrap::app_context::AppContext;
use crate::domain::accounts::account::AccountWithProfile;
use crate::presentation::http::error::{ApiError, JsonBody};
use crate::presentation::http::extract::CurrentAccount;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub bio: String,
    pub avatar: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: chrono::DateTime<chrono::Utc>,
    pub profile: ProfileResponse,
}

impl From<AccountWithProfile> for UserResponse {
    fn from(row: AccountWithProfile) -> Self {
        let AccountWithProfile { account, profile } = row;
        UserResponse {
            id: account.id,
            username: account.username,
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            date_joined: account.date_joined,
            profile: ProfileResponse {
                bio: profile.bio,
                avatar: profile.avatar,
                created_at: profile.created_at,
                updated_at: profile.updated_at,
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access: String,
    pub refresh: String,
    pub message: String,
}

impl AuthResponse {
    fn new(session: AuthSession, message: &str) -> Self {
        AuthResponse {
            user: session.account.into(),
            access: session.tokens.access,
            refresh: session.tokens.refresh,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenRefreshResponse {
    pub access: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Json<Self> {
        Json(MessageResponse {
            message: message.to_string(),
        })
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/register/", post(register))
        .route("/login/", post(login))
        .route("/logout/", post(logout))
        .route("/token/refresh/", post(refresh_token))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/auth/register/", tag = "Auth", request_body = RegisterRequest, security(()), responses(
    (status = 201, body = AuthResponse),
    (status = 400, description = "Field errors")
))]
pub async fn register(
    State(ctx): State<AppContext>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let repo = ctx.account_repo();
    let uc = Register {
        repo: repo.as_ref(),
        tokens: ctx.tokens(),
    };
    let input = RegisterInput {
        username: req.username,
        email: req.email,
        password: req.password,
        password_confirm: req.password_confirm,
        first_name: req.first_name,
        last_name: req.last_name,
    };
    let session = uc.execute(&input).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new(session, "User registered successfully")),
    ))
}

#[utoipa::path(post, path = "/api/auth/login/", tag = "Auth", request_body = LoginRequest, security(()), responses(
    (status = 200, body = AuthResponse),
    (status = 400, description = "Invalid credentials or disabled account")
))]
pub async fn login(
    State(ctx): State<AppContext>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let repo = ctx.account_repo();
    let uc = Login {
        repo: repo.as_ref(),
        tokens: ctx.tokens(),
    };
    let input = LoginInput {
        email: req.email,
        password: req.password,
    };
    let session = uc
        .execute(&input)
        .await
        .inspect_err(|e| tracing::debug!(error = %e, "login_rejected"))?;
    Ok(Json(AuthResponse::new(session, "Login successful")))
}

#[utoipa::path(post, path = "/api/auth/logout/", tag = "Auth", request_body = RefreshRequest, responses(
    (status = 200, body = MessageResponse),
    (status = 400, description = "Invalid token")
))]
pub async fn logout(
    State(ctx): State<AppContext>,
    CurrentAccount(caller): CurrentAccount,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let refresh = logout_refresh_field(&body)?;
    let blacklist = ctx.token_blacklist();
    let uc = Logout {
        blacklist: blacklist.as_ref(),
        tokens: ctx.tokens(),
    };
    uc.execute(caller.id(), refresh.as_deref()).await?;
    Ok(MessageResponse::new("Logout successful"))
}

/// Pulls `refresh` out of a logout body regardless of its content type.
/// An empty body, a missing key or `null` mean "nothing to revoke"; anything
/// that is not a JSON object with a string `refresh` is an invalid token.
fn logout_refresh_field(body: &[u8]) -> Result<Option<String>, ServiceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| ServiceError::InvalidToken)?;
    let serde_json::Value::Object(mut fields) = value else {
        return Err(ServiceError::InvalidToken);
    };
    match fields.remove("refresh") {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(token)) => Ok(Some(token)),
        Some(_) => Err(ServiceError::InvalidToken),
    }
}

#[utoipa::path(post, path = "/api/auth/token/refresh/", tag = "Auth", request_body = RefreshRequest, security(()), responses(
    (status = 200, body = TokenRefreshResponse),
    (status = 401, description = "Token is invalid, expired or blacklisted")
))]
pub async fn refresh_token(
    State(ctx): State<AppContext>,
    JsonBody(req): JsonBody<RefreshRequest>,
) -> Result<Json<TokenRefreshResponse>, ApiError> {
    let repo = ctx.account_repo();
    let blacklist = ctx.token_blacklist();
    let uc = RefreshAccessToken {
        repo: repo.as_ref(),
        blacklist: blacklist.as_ref(),
        tokens: ctx.tokens(),
    };
    let access = uc.execute(req.refresh.as_deref()).await?;
    Ok(Json(TokenRefreshResponse {
        access,
        message: "Token refreshed successfully".to_string(),
    }))
}
