use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::application::error::ServiceError;
use crate::application::services::tokens::TokenType;
use crate::bootstrap::app_context::AppContext;
use crate::domain::accounts::account::AccountWithProfile;
use crate::presentation::http::error::ApiError;

pub struct Bearer(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::NotAuthenticated)?;
        Ok(Bearer(token.to_string()))
    }
}

/// The authenticated caller, resolved once per request from the bearer
/// access token.
pub struct CurrentAccount(pub AccountWithProfile);

#[axum::async_trait]
impl FromRequestParts<AppContext> for CurrentAccount {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let Bearer(token) = Bearer::from_request_parts(parts, ctx).await?;
        let verified = ctx
            .tokens()
            .verify(&token, TokenType::Access)
            .map_err(|_| ApiError::InvalidAccessToken)?;
        let account = ctx
            .account_repo()
            .find_by_id(verified.user_id)
            .await
            .map_err(|e| ApiError::Service(ServiceError::Internal(e)))?
            .ok_or(ApiError::Service(ServiceError::AccountNotFound))?;
        if !account.account.is_active {
            return Err(ApiError::Service(ServiceError::AccountInactive));
        }
        Ok(CurrentAccount(account))
    }
}
