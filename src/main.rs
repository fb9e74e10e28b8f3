use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::MatchedPath;
use dotenvy::dotenv;
use http::HeaderValue;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use accounts_api::application::ports::token_blacklist::TokenBlacklist;
use accounts_api::application::services::tokens::TokenIssuer;
use accounts_api::bootstrap::app_context::{AppContext, AppServices};
use accounts_api::bootstrap::config::Config;
use accounts_api::infrastructure::db::{self, PgDatabaseHealth};
use accounts_api::infrastructure::db::repositories::account_repository_sqlx::SqlxAccountRepository;
use accounts_api::infrastructure::db::repositories::token_blacklist_sqlx::SqlxTokenBlacklist;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            accounts_api::presentation::http::auth::register,
            accounts_api::presentation::http::auth::login,
            accounts_api::presentation::http::auth::logout,
            accounts_api::presentation::http::auth::refresh_token,
            accounts_api::presentation::http::profile::get_profile,
            accounts_api::presentation::http::profile::update_profile,
            accounts_api::presentation::http::profile::change_password,
            accounts_api::presentation::http::health::health,
        ),
        components(schemas(
            accounts_api::presentation::http::auth::RegisterRequest,
            accounts_api::presentation::http::auth::LoginRequest,
            accounts_api::presentation::http::auth::RefreshRequest,
            accounts_api::presentation::http::auth::ProfileResponse,
            accounts_api::presentation::http::auth::UserResponse,
            accounts_api::presentation::http::auth::AuthResponse,
            accounts_api::presentation::http::auth::TokenRefreshResponse,
            accounts_api::presentation::http::auth::MessageResponse,
            accounts_api::presentation::http::profile::ProfileFieldsRequest,
            accounts_api::presentation::http::profile::UpdateProfileRequest,
            accounts_api::presentation::http::profile::UpdateProfileResponse,
            accounts_api::presentation::http::profile::ChangePasswordRequest,
            accounts_api::presentation::http::health::HealthResponse,
            accounts_api::presentation::http::health::DatabaseStatus,
        )),
        tags(
            (name = "Auth", description = "Registration, login and tokens"),
            (name = "Profile", description = "Current user profile and password"),
            (name = "Health", description = "System health checks")
        )
    )]
struct ApiDoc;

fn cors_layer(cfg: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PUT,
            http::Method::PATCH,
            http::Method::OPTIONS,
        ])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION]);
    match cfg.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => base.allow_origin(origin),
        Some(Err(_)) | None if cfg.is_production => base.allow_origin(AllowOrigin::exact(
            HeaderValue::from_static("http://invalid"),
        )),
        // Development convenience
        _ => base.allow_origin(AllowOrigin::mirror_request()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "accounts_api=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(?cfg, "Starting accounts backend");

    // Database
    let pool = db::connect_pool(&cfg).await?;
    db::migrate(&pool).await?;

    let account_repo = Arc::new(SqlxAccountRepository::new(pool.clone()));
    let token_blacklist = Arc::new(SqlxTokenBlacklist::new(pool.clone()));
    match token_blacklist.purge_expired(chrono::Utc::now()).await {
        Ok(purged) => info!(purged, "expired_blacklist_entries_purged"),
        Err(e) => tracing::warn!(error = ?e, "blacklist_purge_failed"),
    }

    let services = AppServices::new(account_repo, token_blacklist, TokenIssuer::from_config(&cfg));
    let ctx = AppContext::new(cfg.clone(), services);

    let app = Router::new()
        .nest(
            "/api",
            accounts_api::presentation::http::health::routes(Arc::new(PgDatabaseHealth::new(
                pool.clone(),
            ))),
        )
        .merge(accounts_api::presentation::http::accounts_router(ctx))
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(&cfg))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = ?e, "shutdown_signal_failed");
    }
}
