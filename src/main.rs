//! Sweetshop - a small sweet shop e-commerce backend

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sweetshop::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{SqlxSweetRepository, SqlxUserRepository},
    },
    services::{AuthService, CatalogService, InventoryService, TokenService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sweetshop=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting sweetshop backend...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    if config.auth.uses_default_secret() {
        tracing::warn!(
            "Using the built-in token signing secret; set SWEETSHOP_AUTH_SECRET_KEY in production"
        );
    }

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create repositories
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let sweet_repo = SqlxSweetRepository::boxed(pool.clone());

    // Initialize services
    let token_service = TokenService::new(&config.auth.secret_key, config.auth.token_ttl_minutes);
    let auth_service = Arc::new(AuthService::new(user_repo, token_service));
    let catalog_service = Arc::new(CatalogService::new(sweet_repo.clone()));
    let inventory_service = Arc::new(InventoryService::new(sweet_repo));

    // Build application state
    let state = AppState {
        auth_service,
        catalog_service,
        inventory_service,
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
