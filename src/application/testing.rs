//! In-memory port implementations for unit and router tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::ports::account_repository::{
    AccountChanges, AccountRepository, AccountWriteError, NewAccount, UniqueField,
};
use crate::application::ports::token_blacklist::TokenBlacklist;
use crate::domain::accounts::account::{Account, AccountWithProfile, Profile};

#[derive(Default)]
pub struct InMemoryAccounts {
    rows: Mutex<Vec<AccountWithProfile>>,
}

impl InMemoryAccounts {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn get(&self, id: Uuid) -> Option<AccountWithProfile> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.account.id == id)
            .cloned()
    }

    pub fn set_active(&self, id: Uuid, active: bool) {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|r| r.account.id == id) {
            row.account.is_active = active;
        }
    }

    fn conflict(
        rows: &[AccountWithProfile],
        username: Option<&str>,
        email: Option<&str>,
        exclude: Option<Uuid>,
    ) -> Option<UniqueField> {
        for row in rows.iter().filter(|r| Some(r.account.id) != exclude) {
            if username == Some(row.account.username.as_str()) {
                return Some(UniqueField::Username);
            }
            if email == Some(row.account.email.as_str()) {
                return Some(UniqueField::Email);
            }
        }
        None
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccounts {
    async fn create_account_with_profile(
        &self,
        account: &NewAccount,
    ) -> Result<AccountWithProfile, AccountWriteError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(field) =
            Self::conflict(&rows, Some(&account.username), Some(&account.email), None)
        {
            return Err(AccountWriteError::Conflict(field));
        }
        let now = Utc::now();
        let row = AccountWithProfile {
            account: Account {
                id: Uuid::new_v4(),
                username: account.username.clone(),
                email: account.email.clone(),
                password_hash: account.password_hash.clone(),
                first_name: account.first_name.clone(),
                last_name: account.last_name.clone(),
                is_active: true,
                date_joined: now,
            },
            profile: Profile {
                bio: String::new(),
                avatar: None,
                created_at: now,
                updated_at: now,
            },
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<AccountWithProfile>> {
        Ok(self.get(id))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<AccountWithProfile>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.account.email == email)
            .cloned())
    }

    async fn email_taken(&self, email: &str, exclude: Option<Uuid>) -> anyhow::Result<bool> {
        let rows = self.rows.lock().unwrap();
        Ok(Self::conflict(&rows, None, Some(email), exclude).is_some())
    }

    async fn username_taken(
        &self,
        username: &str,
        exclude: Option<Uuid>,
    ) -> anyhow::Result<bool> {
        let rows = self.rows.lock().unwrap();
        Ok(Self::conflict(&rows, Some(username), None, exclude).is_some())
    }

    async fn update_account(
        &self,
        id: Uuid,
        changes: &AccountChanges,
    ) -> Result<Option<AccountWithProfile>, AccountWriteError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(field) = Self::conflict(
            &rows,
            changes.username.as_deref(),
            changes.email.as_deref(),
            Some(id),
        ) {
            return Err(AccountWriteError::Conflict(field));
        }
        let Some(row) = rows.iter_mut().find(|r| r.account.id == id) else {
            return Ok(None);
        };
        if let Some(v) = &changes.username {
            row.account.username = v.clone();
        }
        if let Some(v) = &changes.email {
            row.account.email = v.clone();
        }
        if let Some(v) = &changes.first_name {
            row.account.first_name = v.clone();
        }
        if let Some(v) = &changes.last_name {
            row.account.last_name = v.clone();
        }
        if let Some(v) = &changes.bio {
            row.profile.bio = v.clone();
        }
        if let Some(v) = &changes.avatar {
            row.profile.avatar = v.clone();
        }
        row.profile.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|r| r.account.id == id) {
            Some(row) => {
                row.account.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Account store whose uniqueness pre-checks always come back clear, as when
/// a concurrent registration commits between validation and insert. Writes
/// still go through the inner store and hit its constraints.
#[derive(Default)]
pub struct StalePrecheckAccounts {
    pub inner: InMemoryAccounts,
}

#[async_trait]
impl AccountRepository for StalePrecheckAccounts {
    async fn create_account_with_profile(
        &self,
        account: &NewAccount,
    ) -> Result<AccountWithProfile, AccountWriteError> {
        self.inner.create_account_with_profile(account).await
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<AccountWithProfile>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<AccountWithProfile>> {
        self.inner.find_by_email(email).await
    }

    async fn email_taken(&self, _email: &str, _exclude: Option<Uuid>) -> anyhow::Result<bool> {
        Ok(false)
    }

    async fn username_taken(
        &self,
        _username: &str,
        _exclude: Option<Uuid>,
    ) -> anyhow::Result<bool> {
        Ok(false)
    }

    async fn update_account(
        &self,
        id: Uuid,
        changes: &AccountChanges,
    ) -> Result<Option<AccountWithProfile>, AccountWriteError> {
        self.inner.update_account(id, changes).await
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> anyhow::Result<bool> {
        self.inner.set_password_hash(id, password_hash).await
    }
}

#[derive(Default)]
pub struct InMemoryBlacklist {
    entries: Mutex<HashMap<Uuid, (Uuid, DateTime<Utc>)>>,
}

impl InMemoryBlacklist {
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl TokenBlacklist for InMemoryBlacklist {
    async fn blacklist(
        &self,
        jti: Uuid,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(&jti) {
            return Ok(false);
        }
        entries.insert(jti, (user_id, expires_at));
        Ok(true)
    }

    async fn is_blacklisted(&self, jti: Uuid) -> anyhow::Result<bool> {
        Ok(self.entries.lock().unwrap().contains_key(&jti))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> anyhow::Result<u64> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, (_, exp)| *exp > now);
        Ok((before - entries.len()) as u64)
    }
}
