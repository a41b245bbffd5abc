use thiserror::Error;

/// Error types for the lifecycle engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// Referenced transaction or collaborator row does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request rejected before any write happened
    #[error("Validation failure: {0}")]
    Validation(String),

    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Type alias for Result with EngineError
pub type Result<T> = std::result::Result<T, EngineError>;
