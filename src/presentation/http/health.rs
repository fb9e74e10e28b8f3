use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::ports::database_health::DatabaseHealth;

const PING_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Serialize, ToSchema)]
pub struct DatabaseStatus {
    pub reachable: bool,
    pub latency_ms: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: &'static str,
    pub database: DatabaseStatus,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, body = HealthResponse),
        (status = 503, body = HealthResponse, description = "Database unreachable")
    )
)]
pub async fn health(
    State(db): State<Arc<dyn DatabaseHealth>>,
) -> (StatusCode, Json<HealthResponse>) {
    let started = Instant::now();
    let reachable = match tokio::time::timeout(PING_TIMEOUT, db.ping()).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::warn!(error = ?e, "health_check_database_unreachable");
            false
        }
        Err(_) => {
            tracing::warn!(timeout_ms = PING_TIMEOUT.as_millis() as u64, "health_check_database_timeout");
            false
        }
    };
    let database = DatabaseStatus {
        reachable,
        latency_ms: started.elapsed().as_millis() as u64,
    };
    if reachable {
        (StatusCode::OK, Json(HealthResponse { status: "ok", database }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse { status: "degraded", database }),
        )
    }
}

pub fn routes(db: Arc<dyn DatabaseHealth>) -> Router {
    Router::new().route("/health", get(health)).with_state(db)
}
