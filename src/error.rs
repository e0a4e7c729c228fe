use thiserror::Error;

/// Main error type for Bondgraph
#[derive(Error, Debug)]
pub enum BondgraphError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Person not found
    #[error("Person not found: {0}")]
    PersonNotFound(String),

    /// Bond not found
    #[error("Bond not found: {0}")]
    BondNotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using BondgraphError
pub type Result<T> = std::result::Result<T, BondgraphError>;
