use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::{AppState, routes, settings::Settings};
use common::{
    database::{self, DatabaseConfig},
    jwt::{JwtConfig, JwtService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting API service");

    let settings = Settings::new()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool).await?;

    let jwt_service = JwtService::new(JwtConfig::from_env()?)?;

    let app = routes::create_router(AppState::new(pool, jwt_service));

    let bind_address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("API service listening on {}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
