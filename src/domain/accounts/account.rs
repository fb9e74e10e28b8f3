use uuid::Uuid;

pub const BIO_MAX_CHARS: usize = 500;

#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub date_joined: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct Profile {
    pub bio: String,
    pub avatar: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// An account joined with its one-to-one profile record.
#[derive(Debug, Clone)]
pub struct AccountWithProfile {
    pub account: Account,
    pub profile: Profile,
}

impl AccountWithProfile {
    pub fn id(&self) -> Uuid {
        self.account.id
    }
}
