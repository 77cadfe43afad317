use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            // Map "no rows" to NotFound
            sqlx::Error::RowNotFound => Self::NotFound("Resource not found".to_string()),
            sqlx::Error::PoolTimedOut => {
                Self::DeadlineExceeded("Timed out waiting for a database connection".to_string())
            }
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().unwrap_or_default();
                match code.as_ref() {
                    // PostgreSQL unique_violation
                    "23505" => {
                        let detail = db_err.message().to_string();
                        if detail.contains("telegram_id") {
                            Self::AlreadyExists(
                                "User with this chat identity already exists".to_string(),
                            )
                        } else {
                            Self::AlreadyExists("Resource already exists".to_string())
                        }
                    }
                    // PostgreSQL foreign_key_violation
                    "23503" => Self::NotFound("Referenced resource not found".to_string()),
                    // PostgreSQL check_violation
                    "23514" => Self::InvalidInput("Constraint check failed".to_string()),
                    // PostgreSQL not_null_violation
                    "23502" => Self::InvalidInput("Required field is missing".to_string()),
                    _ => Self::Database(err),
                }
            }
            _ => Self::Database(err),
        }
    }
}

impl Error {
    /// Wrap a database error with the name of the failing operation.
    ///
    /// Deliberate outcomes (NotFound, AlreadyExists, ...) pass through
    /// unchanged so callers can still match on them.
    #[must_use]
    pub fn with_operation(self, operation: &str) -> Self {
        match self {
            Self::Database(e) => Self::Internal(format!("{operation}: {e}")),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = Error::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn pool_timeout_maps_to_deadline_exceeded() {
        let err = Error::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, Error::DeadlineExceeded(_)));
    }

    #[test]
    fn with_operation_wraps_database_errors_only() {
        let wrapped = Error::from(sqlx::Error::WorkerCrashed).with_operation("load user");
        assert!(matches!(wrapped, Error::Internal(msg) if msg.starts_with("load user")));

        let not_found = Error::NotFound("event not found".to_string()).with_operation("get event");
        assert!(matches!(not_found, Error::NotFound(_)));
    }
}
