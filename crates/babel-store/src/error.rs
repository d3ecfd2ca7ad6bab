use std::time::Duration;

use rusqlite::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Write timed out after {0:?}")]
    WriteTimeout(Duration),

    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    #[error("Expected {expected} parameters, got {got}")]
    ParameterCount { expected: usize, got: usize },

    #[error("Unknown named parameter: {0}")]
    UnknownParameter(String),

    #[error("Database error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("Write queue is closed")]
    QueueClosed,

    #[error("Database task failed: {0}")]
    Join(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Stable identifier sent to clients alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::WriteTimeout(_) => "write-timeout",
            StoreError::SchemaViolation(_) => "schema-violation",
            StoreError::ParameterCount { .. } | StoreError::UnknownParameter(_) => {
                "invalid-parameters"
            }
            StoreError::Sqlite(_) => "database",
            StoreError::QueueClosed | StoreError::Join(_) | StoreError::Io(_) => "store-unavailable",
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.code == ErrorCode::ConstraintViolation =>
            {
                StoreError::SchemaViolation(msg.clone().unwrap_or_else(|| e.to_string()))
            }
            _ => StoreError::Sqlite(err),
        }
    }
}
