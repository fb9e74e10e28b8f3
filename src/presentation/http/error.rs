use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::application::error::ServiceError;

#[derive(Debug)]
pub enum ApiError {
    Service(ServiceError),
    NotAuthenticated,
    InvalidAccessToken,
    MalformedBody(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection.body_text())
    }
}

fn unauthorized(body: serde_json::Value) -> Response {
    let mut res = (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Bearer realm=\"api\""),
    );
    res
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotAuthenticated => unauthorized(json!({
                "detail": "Authentication credentials were not provided."
            })),
            ApiError::InvalidAccessToken => unauthorized(json!({
                "detail": "Given token not valid for any token type",
                "code": "token_not_valid"
            })),
            ApiError::MalformedBody(detail) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": format!("JSON parse error - {detail}") })),
            )
                .into_response(),
            ApiError::Service(err) => match err {
                ServiceError::Validation(errors) => {
                    (StatusCode::BAD_REQUEST, Json(errors)).into_response()
                }
                ServiceError::InvalidToken => (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "Invalid token" })),
                )
                    .into_response(),
                ServiceError::Token(e) => unauthorized(json!({
                    "detail": e.to_string(),
                    "code": "token_not_valid"
                })),
                ServiceError::AccountNotFound => unauthorized(json!({
                    "detail": "User not found",
                    "code": "user_not_found"
                })),
                ServiceError::AccountInactive => unauthorized(json!({
                    "detail": "User is inactive",
                    "code": "user_inactive"
                })),
                ServiceError::Internal(e) => {
                    tracing::error!(error = ?e, "request_failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "detail": "Internal server error" })),
                    )
                        .into_response()
                }
            },
        }
    }
}

/// `Json` extractor whose rejections render as [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
