use thiserror::Error;

/// Storage-specific error types for the parking station.
///
/// These errors represent failures in database access and payload encoding in
/// the bucket stores.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database connection or query execution failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration execution failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored bucket could not be encoded or decoded
    #[error("Payload error in {store}/{bucket}: {source}")]
    Payload {
        store: String,
        bucket: String,
        #[source]
        source: serde_json::Error,
    },

    /// Data validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
