use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::accounts::account::AccountWithProfile;

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

/// Partial update of an account and its profile. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<Option<String>>,
}

impl AccountChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.bio.is_none()
            && self.avatar.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

#[derive(Debug, thiserror::Error)]
pub enum AccountWriteError {
    #[error("unique constraint violated on {0:?}")]
    Conflict(UniqueField),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Inserts the account and its empty profile atomically.
    async fn create_account_with_profile(
        &self,
        account: &NewAccount,
    ) -> Result<AccountWithProfile, AccountWriteError>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<AccountWithProfile>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<AccountWithProfile>>;
    async fn email_taken(&self, email: &str, exclude: Option<Uuid>) -> anyhow::Result<bool>;
    async fn username_taken(&self, username: &str, exclude: Option<Uuid>)
    -> anyhow::Result<bool>;
    /// Applies the supplied changes and bumps the profile's `updated_at`,
    /// creating the profile if it is missing.
    async fn update_account(
        &self,
        id: Uuid,
        changes: &AccountChanges,
    ) -> Result<Option<AccountWithProfile>, AccountWriteError>;
    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> anyhow::Result<bool>;
}
