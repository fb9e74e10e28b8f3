use axum::Router;

use crate::bootstrap::app_context::AppContext;

pub mod auth;
pub mod error;
pub mod extract;
pub mod health;
pub mod profile;

#[cfg(test)]
mod router_tests;

/// Account endpoints mounted under `/api/auth`.
pub fn accounts_router(ctx: AppContext) -> Router {
    Router::new().nest(
        "/api/auth",
        auth::routes(ctx.clone()).merge(profile::routes(ctx)),
    )
}
