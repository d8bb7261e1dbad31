//! Error types for tree operations

/// Result type for tree operations
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors that can occur during tree queries and structural mutations
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid tree operation: {0}")]
    Domain(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Storage error: {0}")]
    Storage(String),
}
