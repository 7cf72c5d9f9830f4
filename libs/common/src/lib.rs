//! Common library for the DevManage services
//!
//! This crate provides shared functionality used by the auth and API
//! services: database connectivity and migrations, the Redis cache, token
//! issuing and validation, password hashing, input validation, and the
//! user entity and role model.
//!
//! ```rust,no_run
//! use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let pool = init_pool(&config).await?;
//!     run_migrations(&pool).await?;
//!     let is_healthy = health_check(&pool).await?;
//!     println!("Database health check: {}", is_healthy);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod database;
pub mod error;
pub mod jwt;
pub mod password;
pub mod role;
pub mod user;
pub mod validation;

pub use role::Role;
pub use user::{PublicUser, User};
