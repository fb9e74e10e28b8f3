use axum::{
    Json, Router,
    extract::State,
    routing::{get, post, put},
};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::application::dto::accounts::{
    ChangePasswordInput, ProfileFieldsInput, ProfileUpdateInput,
};
use crate::application::use_cases::profile::change_password::ChangePassword;
use crate::application::use_cases::profile::update_profile::UpdateProfile;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::{MessageResponse, UserResponse};
use crate::presentation::http::error::{ApiError, JsonBody};
use crate::presentation::http::extract::CurrentAccount;

// Distinguishes an explicit `null` (clear) from an absent key (keep).
fn explicit_null<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProfileFieldsRequest {
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    #[schema(value_type = Option<String>)]
    pub avatar: Option<Option<String>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile: Option<ProfileFieldsRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateProfileResponse {
    pub user: UserResponse,
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
    pub new_password_confirm: Option<String>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/profile/", get(get_profile))
        .route("/profile/update/", put(update_profile).patch(update_profile))
        .route("/change-password/", post(change_password))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/auth/profile/", tag = "Profile", responses(
    (status = 200, body = UserResponse),
    (status = 401, description = "Not authenticated")
))]
// `CurrentAccount` has already loaded the caller with their profile.
pub async fn get_profile(CurrentAccount(caller): CurrentAccount) -> Json<UserResponse> {
    Json(caller.into())
}

#[utoipa::path(put, path = "/api/auth/profile/update/", tag = "Profile", request_body = UpdateProfileRequest, responses(
    (status = 200, body = UpdateProfileResponse),
    (status = 400, description = "Field errors")
))]
pub async fn update_profile(
    State(ctx): State<AppContext>,
    CurrentAccount(caller): CurrentAccount,
    JsonBody(req): JsonBody<UpdateProfileRequest>,
) -> Result<Json<UpdateProfileResponse>, ApiError> {
    let repo = ctx.account_repo();
    let uc = UpdateProfile {
        repo: repo.as_ref(),
    };
    let input = ProfileUpdateInput {
        username: req.username,
        email: req.email,
        first_name: req.first_name,
        last_name: req.last_name,
        profile: req.profile.map(|p| ProfileFieldsInput {
            bio: p.bio,
            avatar: p.avatar,
        }),
    };
    let row = uc.execute(caller.id(), &input).await?;
    Ok(Json(UpdateProfileResponse {
        user: row.into(),
        message: "Profile updated successfully".to_string(),
    }))
}

#[utoipa::path(post, path = "/api/auth/change-password/", tag = "Profile", request_body = ChangePasswordRequest, responses(
    (status = 200, body = MessageResponse),
    (status = 400, description = "Field errors")
))]
pub async fn change_password(
    State(ctx): State<AppContext>,
    CurrentAccount(caller): CurrentAccount,
    JsonBody(req): JsonBody<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let repo = ctx.account_repo();
    let uc = ChangePassword {
        repo: repo.as_ref(),
    };
    let input = ChangePasswordInput {
        old_password: req.old_password,
        new_password: req.new_password,
        new_password_confirm: req.new_password_confirm,
    };
    uc.execute(&caller.account, &input).await?;
    Ok(MessageResponse::new("Password changed successfully"))
}
