use async_trait::async_trait;

/// Liveness check against the backing store, used by `/api/health`.
#[async_trait]
pub trait DatabaseHealth: Send + Sync {
    /// Round-trips a trivial query. Any error means the store is unreachable.
    async fn ping(&self) -> anyhow::Result<()>;
}
