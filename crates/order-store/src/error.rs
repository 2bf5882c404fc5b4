use thiserror::Error;

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum OrderStoreError {
    /// The store was unreachable or rejected a read or write.
    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// An order document could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store answered an aggregation with a result of unexpected shape.
    #[error("Unexpected aggregation result: {0}")]
    AggregationShape(String),

    /// A group's sum does not fit in a decimal.
    #[error("Sum for group {group} overflows the decimal range")]
    SumOverflow { group: i64 },
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, OrderStoreError>;
