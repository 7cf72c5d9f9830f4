//! User repository for database operations

use common::{
    User,
    error::DatabaseResult,
    password::{self, PasswordError},
    user::USER_COLUMNS,
};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::NewUser;

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

/// Failure while creating a user
#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Database(#[from] common::error::DatabaseError),
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user, hashing the supplied password
    pub async fn create(&self, new_user: &NewUser) -> Result<User, CreateUserError> {
        info!("Creating new user: {}", new_user.user_name);

        let password_hash = password::hash_password(&new_user.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, name, email, phone, user_name, password_hash, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.phone)
        .bind(&new_user.user_name)
        .bind(&password_hash)
        .bind(new_user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(common::error::DatabaseError::from)?;

        Ok(user)
    }

    /// Find a user by e-mail address
    pub async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Whether an account already uses this e-mail address
    pub async fn email_exists(&self, email: &str) -> DatabaseResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Verify a user's password
    pub fn verify_password(&self, user: &User, password: &str) -> Result<bool, PasswordError> {
        password::verify_password(password, &user.password_hash)
    }
}
