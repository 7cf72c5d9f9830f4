//! Repositories for database operations

use common::{
    User,
    error::DatabaseResult,
    password::{self, PasswordError},
    user::USER_COLUMNS,
};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::{DeveloperListing, ProfileChanges};

pub mod project;

pub use project::ProjectRepository;

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Get all users
    pub async fn get_all(&self) -> DatabaseResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY created_at",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Name, e-mail and user name of every user
    pub async fn list_developers(&self) -> DatabaseResult<Vec<DeveloperListing>> {
        let developers = sqlx::query_as::<_, DeveloperListing>(
            "SELECT id, name, email, user_name FROM users ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(developers)
    }

    /// The subset of `ids` that belong to existing users
    pub async fn existing_ids(&self, ids: &[Uuid]) -> DatabaseResult<Vec<Uuid>> {
        let found = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(found)
    }

    /// Overwrite the given profile fields, keeping the others
    pub async fn update_profile(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
    ) -> DatabaseResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                user_name = COALESCE($4, user_name),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.phone.as_deref())
        .bind(changes.user_name.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Verify a user's password
    pub fn verify_password(&self, user: &User, password: &str) -> Result<bool, PasswordError> {
        password::verify_password(password, &user.password_hash)
    }

    /// Store a new password hash
    pub async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> DatabaseResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a user.
    ///
    /// Membership rows go with the user (cascade), their share entries are
    /// stripped from every project and projects they created lose their
    /// creator. Returns `false` when no such user exists.
    pub async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE projects
            SET developer_shares = developer_shares - $1::text, updated_at = NOW()
            WHERE developer_shares ? $1::text
            "#,
        )
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Deleted user {}", id);
        }
        Ok(deleted)
    }
}
