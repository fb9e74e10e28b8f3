use crate::application::dto::accounts::RegisterInput;
use crate::application::error::ServiceError;
use crate::application::ports::account_repository::{AccountRepository, NewAccount};
use crate::application::services::passwords::hash_password;
use crate::application::services::tokens::TokenIssuer;
use crate::application::use_cases::auth::AuthSession;
use crate::application::validation::registration::RegistrationValidator;

pub struct Register<'a, R: AccountRepository + ?Sized> {
    pub repo: &'a R,
    pub tokens: &'a TokenIssuer,
}

impl<'a, R: AccountRepository + ?Sized> Register<'a, R> {
    pub async fn execute(&self, input: &RegisterInput) -> Result<AuthSession, ServiceError> {
        let valid = RegistrationValidator { repo: self.repo }
            .validate(input)
            .await?;
        let password_hash = hash_password(&valid.password)?;
        let new_account = NewAccount {
            username: valid.username,
            email: valid.email,
            password_hash,
            first_name: valid.first_name,
            last_name: valid.last_name,
        };
        // The store's unique constraints settle races the validator cannot see.
        let account = self.repo.create_account_with_profile(&new_account).await?;
        let tokens = self.tokens.issue_pair(account.id())?;
        tracing::info!(user_id = %account.id(), username = %account.account.username, "account_registered");
        Ok(AuthSession { account, tokens })
    }
}
