/// Error types for posts-service
use thiserror::Error;

/// PostgreSQL SQLSTATE codes the schema relies on
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const NOT_NULL_VIOLATION: &str = "23502";
const CHECK_VIOLATION: &str = "23514";
const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A unique index or constraint rejected the write (duplicate follow, slug, username)
    #[error("Uniqueness violation: {constraint}")]
    UniqueViolation { constraint: String },

    /// A foreign key pointed at a row that does not exist
    #[error("Reference integrity violation: {constraint}")]
    ReferenceViolation { constraint: String },

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl ServiceError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, ServiceError::UniqueViolation { .. })
    }

    pub fn is_reference_violation(&self) -> bool {
        matches!(self, ServiceError::ReferenceViolation { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::Validation(_))
    }

    /// Expected rejections are caller mistakes, not infrastructure failures
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ServiceError::Validation(_)
                | ServiceError::NotFound(_)
                | ServiceError::UniqueViolation { .. }
                | ServiceError::ReferenceViolation { .. }
        )
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        let Some(db_err) = err.as_database_error() else {
            return match err {
                sqlx::Error::RowNotFound => ServiceError::NotFound("row".to_string()),
                other => ServiceError::Database(other),
            };
        };

        let code = db_err.code().map(|c| c.into_owned());
        let constraint = db_err.constraint().unwrap_or("unknown").to_string();
        let message = db_err.message().to_string();
        match code.as_deref() {
            Some(UNIQUE_VIOLATION) => ServiceError::UniqueViolation { constraint },
            Some(FOREIGN_KEY_VIOLATION) => ServiceError::ReferenceViolation { constraint },
            Some(NOT_NULL_VIOLATION | CHECK_VIOLATION | STRING_DATA_RIGHT_TRUNCATION) => {
                ServiceError::Validation(message)
            }
            _ => ServiceError::Database(err),
        }
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
