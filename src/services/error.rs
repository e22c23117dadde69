use thiserror::Error;

use crate::domain::AccessError;

/// Errors shared by the place, way, route, notification and profile services.
#[derive(Debug, Error)]
pub enum TripError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    /// A write was rejected by the store (already logged there).
    #[error("Unsuccessful {0}")]
    Persistence(&'static str),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TripError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<AccessError> for TripError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::NotFound { .. } => Self::NotFound(err.to_string()),
            AccessError::Forbidden { .. } => Self::Forbidden(err.to_string()),
        }
    }
}

impl From<sea_orm::DbErr> for TripError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for TripError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_errors_keep_their_message() {
        let err: TripError = AccessError::Forbidden { kind: "Way", id: 3 }.into();
        assert!(matches!(&err, TripError::Forbidden(msg) if msg == "Way with id=3 belongs to another user"));

        let err: TripError = AccessError::NotFound { kind: "Place", id: 1 }.into();
        assert!(matches!(err, TripError::NotFound(_)));
    }

    #[test]
    fn db_errors_convert() {
        let err: TripError = sea_orm::DbErr::Custom("boom".to_string()).into();
        assert!(matches!(err, TripError::Database(_)));
    }
}
