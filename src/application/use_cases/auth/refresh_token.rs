use crate::application::error::ServiceError;
use crate::application::ports::account_repository::AccountRepository;
use crate::application::ports::token_blacklist::TokenBlacklist;
use crate::application::services::tokens::{TokenError, TokenIssuer, TokenType};
use crate::application::validation::{FieldErrors, required_secret};

pub struct RefreshAccessToken<'a, R, B>
where
    R: AccountRepository + ?Sized,
    B: TokenBlacklist + ?Sized,
{
    pub repo: &'a R,
    pub blacklist: &'a B,
    pub tokens: &'a TokenIssuer,
}

impl<'a, R, B> RefreshAccessToken<'a, R, B>
where
    R: AccountRepository + ?Sized,
    B: TokenBlacklist + ?Sized,
{
    /// Exchanges a live refresh token for a new access token.
    pub async fn execute(&self, refresh: Option<&str>) -> Result<String, ServiceError> {
        let mut errors = FieldErrors::new();
        let Some(refresh) = required_secret(&mut errors, "refresh", refresh) else {
            return Err(errors.into());
        };

        let token = self.tokens.verify(&refresh, TokenType::Refresh)?;
        if self.blacklist.is_blacklisted(token.jti).await? {
            return Err(TokenError::Blacklisted.into());
        }
        let account = self
            .repo
            .find_by_id(token.user_id)
            .await?
            .ok_or(ServiceError::AccountNotFound)?;
        if !account.account.is_active {
            return Err(ServiceError::AccountInactive);
        }
        let access = self.tokens.issue_access(token.user_id)?;
        tracing::debug!(user_id = %token.user_id, "access_token_refreshed");
        Ok(access)
    }
}
