//! Custom error types for the common library
//!
//! This module defines application-specific error types that can be used
//! throughout the services.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// SQLSTATE codes Postgres reports for constraint violations
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// A write referenced a row that does not exist
    #[error("Foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl From<SqlxError> for DatabaseError {
    fn from(err: SqlxError) -> Self {
        if let SqlxError::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => return DatabaseError::UniqueViolation { constraint },
                Some(FOREIGN_KEY_VIOLATION) => {
                    return DatabaseError::ForeignKeyViolation { constraint };
                }
                _ => {}
            }
        }

        DatabaseError::Query(err)
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_become_query_errors() {
        let err: DatabaseError = SqlxError::RowNotFound.into();
        assert!(matches!(err, DatabaseError::Query(SqlxError::RowNotFound)));
    }

    #[test]
    fn test_unique_violation_display() {
        let err = DatabaseError::UniqueViolation {
            constraint: "users_email_key".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unique constraint violated: users_email_key"
        );
    }

    #[test]
    fn test_foreign_key_violation_display() {
        let err = DatabaseError::ForeignKeyViolation {
            constraint: "projects_created_by_fkey".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Foreign key constraint violated: projects_created_by_fkey"
        );
    }
}
