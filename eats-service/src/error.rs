use thiserror::Error;
use tracing::error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure of a domain operation.
///
/// The `&'static str` variants carry the user-facing message verbatim;
/// infrastructure failures are logged and replaced by the operation's
/// generic message before they reach a client.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error("{0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("token error: {0}")]
    Auth(#[from] common_auth::AuthError),
    #[error("password hashing failed: {0}")]
    Password(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ServiceError {
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ServiceError::Database(_)
                | ServiceError::Auth(_)
                | ServiceError::Password(_)
                | ServiceError::Serialization(_)
        )
    }

    /// Message safe to show the caller.
    pub fn public_message(&self, fallback: &str) -> String {
        if self.is_internal() {
            error!(error = %self, "operation failed");
            fallback.to_string()
        } else {
            self.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_pass_through() {
        let err = ServiceError::NotFound("Failed to find order.");
        assert_eq!(err.public_message("Could not load order."), "Failed to find order.");
    }

    #[test]
    fn internal_errors_use_fallback() {
        let err = ServiceError::Database(sqlx::Error::RowNotFound);
        assert!(err.is_internal());
        assert_eq!(err.public_message("Could not load order."), "Could not load order.");
    }
}
