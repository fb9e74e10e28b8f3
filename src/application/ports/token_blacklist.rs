use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Returns `false` when the token id was already present.
    async fn blacklist(
        &self,
        jti: Uuid,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<bool>;
    async fn is_blacklisted(&self, jti: Uuid) -> anyhow::Result<bool>;
    /// Drops entries whose token would have expired anyway.
    async fn purge_expired(&self, now: DateTime<Utc>) -> anyhow::Result<u64>;
}
