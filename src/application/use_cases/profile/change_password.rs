use crate::application::dto::accounts::ChangePasswordInput;
use crate::application::error::ServiceError;
use crate::application::ports::account_repository::AccountRepository;
use crate::application::services::passwords::hash_password;
use crate::application::validation::password_change::validate_password_change;
use crate::domain::accounts::account::Account;

pub struct ChangePassword<'a, R: AccountRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: AccountRepository + ?Sized> ChangePassword<'a, R> {
    /// Replaces the caller's password. Outstanding tokens stay valid.
    pub async fn execute(
        &self,
        caller: &Account,
        input: &ChangePasswordInput,
    ) -> Result<(), ServiceError> {
        let new_password = validate_password_change(caller, input)?;
        let hash = hash_password(&new_password)?;
        if !self.repo.set_password_hash(caller.id, &hash).await? {
            return Err(ServiceError::AccountNotFound);
        }
        tracing::info!(user_id = %caller.id, "password_changed");
        Ok(())
    }
}
