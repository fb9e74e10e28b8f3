use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::account_repository::{
    AccountChanges, AccountRepository, AccountWriteError, NewAccount, UniqueField,
};
use crate::domain::accounts::account::{Account, AccountWithProfile, Profile};
use crate::infrastructure::db::PgPool;

const SELECT_ACCOUNT: &str = r#"
    SELECT u.id, u.username, u.email, u.password_hash, u.first_name, u.last_name,
           u.is_active, u.date_joined,
           COALESCE(p.bio, '') AS bio,
           p.avatar,
           COALESCE(p.created_at, u.date_joined) AS profile_created_at,
           COALESCE(p.updated_at, u.date_joined) AS profile_updated_at
    FROM users u
    LEFT JOIN user_profiles p ON p.user_id = u.id"#;

pub struct SqlxAccountRepository {
    pub pool: PgPool,
}

impl SqlxAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_row(r: &PgRow) -> AccountWithProfile {
    AccountWithProfile {
        account: Account {
            id: r.get("id"),
            username: r.get("username"),
            email: r.get("email"),
            password_hash: r.get("password_hash"),
            first_name: r.get("first_name"),
            last_name: r.get("last_name"),
            is_active: r.get("is_active"),
            date_joined: r.get("date_joined"),
        },
        profile: Profile {
            bio: r.get("bio"),
            avatar: r.get("avatar"),
            created_at: r.get("profile_created_at"),
            updated_at: r.get("profile_updated_at"),
        },
    }
}

fn map_write_error(err: sqlx::Error) -> AccountWriteError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            match db.constraint() {
                Some("users_email_key") => return AccountWriteError::Conflict(UniqueField::Email),
                Some("users_username_key") => {
                    return AccountWriteError::Conflict(UniqueField::Username);
                }
                _ => {}
            }
        }
    }
    AccountWriteError::Other(err.into())
}

#[async_trait]
impl AccountRepository for SqlxAccountRepository {
    async fn create_account_with_profile(
        &self,
        account: &NewAccount,
    ) -> Result<AccountWithProfile, AccountWriteError> {
        let mut tx = self.pool.begin().await.map_err(map_write_error)?;
        let id: Uuid = sqlx::query_scalar(
            r#"INSERT INTO users (username, email, password_hash, first_name, last_name)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id"#,
        )
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        sqlx::query("INSERT INTO user_profiles (user_id) VALUES ($1)")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;

        let row = sqlx::query(&format!("{SELECT_ACCOUNT} WHERE u.id = $1"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_write_error)?;
        tx.commit().await.map_err(map_write_error)?;
        Ok(map_row(&row))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<AccountWithProfile>> {
        let row = sqlx::query(&format!("{SELECT_ACCOUNT} WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_row))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<AccountWithProfile>> {
        let row = sqlx::query(&format!("{SELECT_ACCOUNT} WHERE u.email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_row))
    }

    async fn email_taken(&self, email: &str, exclude: Option<Uuid>) -> anyhow::Result<bool> {
        let taken: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND ($2::uuid IS NULL OR id <> $2))"#,
        )
        .bind(email)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn username_taken(
        &self,
        username: &str,
        exclude: Option<Uuid>,
    ) -> anyhow::Result<bool> {
        let taken: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 AND ($2::uuid IS NULL OR id <> $2))"#,
        )
        .bind(username)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn update_account(
        &self,
        id: Uuid,
        changes: &AccountChanges,
    ) -> Result<Option<AccountWithProfile>, AccountWriteError> {
        let mut tx = self.pool.begin().await.map_err(map_write_error)?;
        let updated = sqlx::query(
            r#"UPDATE users SET
                   username = COALESCE($2, username),
                   email = COALESCE($3, email),
                   first_name = COALESCE($4, first_name),
                   last_name = COALESCE($5, last_name)
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(changes.username.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.first_name.as_deref())
        .bind(changes.last_name.as_deref())
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        // Saving an account always saves its profile; a missing one is created.
        let set_avatar = changes.avatar.is_some();
        let avatar = changes.avatar.clone().flatten();
        sqlx::query(
            r#"INSERT INTO user_profiles (user_id, bio, avatar)
               VALUES ($1, COALESCE($2, ''), $3)
               ON CONFLICT (user_id) DO UPDATE SET
                   bio = COALESCE($2, user_profiles.bio),
                   avatar = CASE WHEN $4 THEN $3 ELSE user_profiles.avatar END,
                   updated_at = now()"#,
        )
        .bind(id)
        .bind(changes.bio.as_deref())
        .bind(avatar)
        .bind(set_avatar)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        let row = sqlx::query(&format!("{SELECT_ACCOUNT} WHERE u.id = $1"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_write_error)?;
        tx.commit().await.map_err(map_write_error)?;
        Ok(Some(map_row(&row)))
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
