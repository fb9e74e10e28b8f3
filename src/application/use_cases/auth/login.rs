use crate::application::dto::accounts::LoginInput;
use crate::application::error::ServiceError;
use crate::application::ports::account_repository::AccountRepository;
use crate::application::services::tokens::TokenIssuer;
use crate::application::use_cases::auth::AuthSession;
use crate::application::validation::login::LoginValidator;

pub struct Login<'a, R: AccountRepository + ?Sized> {
    pub repo: &'a R,
    pub tokens: &'a TokenIssuer,
}

impl<'a, R: AccountRepository + ?Sized> Login<'a, R> {
    pub async fn execute(&self, input: &LoginInput) -> Result<AuthSession, ServiceError> {
        let account = LoginValidator { repo: self.repo }.validate(input).await?;
        let tokens = self.tokens.issue_pair(account.id())?;
        tracing::info!(user_id = %account.id(), "login_succeeded");
        Ok(AuthSession { account, tokens })
    }
}
