//! RentMoldova - car rental backend

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rentmoldova::{
    api::{self, AppState},
    cache::create_cache,
    config::Config,
    db::{
        self,
        repositories::{SessionRepository, SqlxSessionRepository},
    },
    services::{HttpIdentityProvider, IdentityProvider},
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rentmoldova=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting RentMoldova...");

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.yml"));
    let config = Config::load_with_env(&config_path)?;
    tracing::info!("Configuration loaded from {}", config_path.display());

    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    let expired = SqlxSessionRepository::new(pool.clone()).delete_expired().await?;
    if expired > 0 {
        tracing::info!("Removed {} expired sessions", expired);
    }

    let cache = create_cache(&config.cache);
    tracing::info!("Cache initialized");

    let identity: Arc<dyn IdentityProvider> =
        Arc::new(HttpIdentityProvider::new(config.auth.identity_url.clone())?);

    let state = AppState::new(pool, cache, identity, &config.auth);

    if let Some(admin) = &config.auth.bootstrap_admin {
        if state.user_service.ensure_admin(admin).await? {
            tracing::info!("Bootstrap admin created for {}", admin.phone);
        }
    }

    let app = api::build_router(state, &config.server.cors_origins);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
