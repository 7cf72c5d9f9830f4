//! Integration tests for the infrastructure components
//!
//! These tests verify that the PostgreSQL database and Redis cache
//! are properly configured and accessible, and that the schema migrations
//! apply cleanly. They need live services, so they are ignored by default:
//! `cargo test -p common -- --ignored`.

use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
};
use sqlx::Row;

#[tokio::test]
#[ignore = "requires running PostgreSQL and Redis"]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    run_migrations(&pool).await?;

    let row = sqlx::query(
        "SELECT COUNT(*) AS tables FROM information_schema.tables \
         WHERE table_name IN ('users', 'projects', 'project_developers')",
    )
    .fetch_one(&pool)
    .await?;
    let tables: i64 = row.get("tables");
    assert_eq!(tables, 3, "Schema migration did not create every table");

    let redis_pool = RedisPool::new(&RedisConfig::from_env()?).await?;
    assert!(
        redis_pool.health_check().await?,
        "Redis health check failed"
    );

    let test_key = "integration_test_key";
    let test_value = "integration_test_value";

    redis_pool.set(test_key, test_value, Some(10)).await?;
    assert_eq!(
        redis_pool.get(test_key).await?,
        Some(test_value.to_string()),
        "Redis SET/GET test failed"
    );

    redis_pool.delete(test_key).await?;
    assert_eq!(
        redis_pool.get(test_key).await?,
        None,
        "Redis delete operation failed"
    );

    Ok(())
}
