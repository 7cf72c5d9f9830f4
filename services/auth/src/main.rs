use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use auth::{AppState, routes, settings::Settings};
use common::{
    cache::{RedisConfig, RedisPool},
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

    info!("Starting authentication service");

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

    let redis_pool = RedisPool::new(&RedisConfig::from_env()?).await?;
    if !redis_pool.health_check().await.unwrap_or(false) {
        anyhow::bail!("Failed to connect to Redis");
    }

    let bind_address = settings.bind_address();
    let app = routes::create_router(AppState::new(pool, redis_pool, jwt_service, settings));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Authentication service listening on {}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
