use uuid::Uuid;

use crate::application::dto::accounts::ProfileUpdateInput;
use crate::application::error::ServiceError;
use crate::application::ports::account_repository::AccountRepository;
use crate::application::validation::profile::ProfileUpdateValidator;
use crate::domain::accounts::account::AccountWithProfile;

pub struct UpdateProfile<'a, R: AccountRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: AccountRepository + ?Sized> UpdateProfile<'a, R> {
    pub async fn execute(
        &self,
        caller: Uuid,
        input: &ProfileUpdateInput,
    ) -> Result<AccountWithProfile, ServiceError> {
        let changes = ProfileUpdateValidator { repo: self.repo }
            .validate(caller, input)
            .await?;
        let updated = self
            .repo
            .update_account(caller, &changes)
            .await?
            .ok_or(ServiceError::AccountNotFound)?;
        tracing::info!(user_id = %caller, empty = changes.is_empty(), "profile_updated");
        Ok(updated)
    }
}
