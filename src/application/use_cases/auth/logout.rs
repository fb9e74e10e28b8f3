use uuid::Uuid;

use crate::application::error::ServiceError;
use crate::application::ports::token_blacklist::TokenBlacklist;
use crate::application::services::tokens::{TokenIssuer, TokenType};

pub struct Logout<'a, B: TokenBlacklist + ?Sized> {
    pub blacklist: &'a B,
    pub tokens: &'a TokenIssuer,
}

impl<'a, B: TokenBlacklist + ?Sized> Logout<'a, B> {
    /// Revokes `refresh` when one is supplied. Every failure to decode or
    /// revoke it collapses into [`ServiceError::InvalidToken`].
    pub async fn execute(&self, caller: Uuid, refresh: Option<&str>) -> Result<(), ServiceError> {
        let Some(refresh) = refresh.filter(|t| !t.trim().is_empty()) else {
            tracing::debug!(user_id = %caller, "logout_without_refresh_token");
            return Ok(());
        };
        let token = self
            .tokens
            .verify(refresh, TokenType::Refresh)
            .map_err(|_| ServiceError::InvalidToken)?;

        match self
            .blacklist
            .blacklist(token.jti, token.user_id, token.expires_at)
            .await
        {
            Ok(true) => {
                tracing::info!(user_id = %caller, jti = %token.jti, "refresh_token_blacklisted");
                Ok(())
            }
            Ok(false) => Err(ServiceError::InvalidToken),
            Err(e) => {
                tracing::warn!(user_id = %caller, error = ?e, "refresh_token_blacklist_failed");
                Err(ServiceError::InvalidToken)
            }
        }
    }
}
