//! Error types for gibsgraph-kg
//!
//! Schema defects are never errors: validators report them as findings.
//! `KgError` is reserved for the collaborator seams (Neo4j, LLM, PCST solver,
//! settings), and those are converted to low scores at the stage boundary.

use thiserror::Error;

/// Main error type for collaborator failures
#[derive(Error, Debug)]
pub enum KgError {
    /// Connection error - network or connection pool issues
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Query execution error
    #[error("Query error: {0}")]
    QueryError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Language model invocation or response error
    #[error("LLM error: {0}")]
    LlmError(String),

    /// Cypher text rejected by the guard
    #[error("Unsafe Cypher: {0}")]
    UnsafeCypher(String),

    /// PCST solver failure
    #[error("Solver error: {0}")]
    SolverError(String),

    /// Neo4rs driver error (wrapper)
    #[error("Neo4rs driver error: {0}")]
    DriverError(#[from] neo4rs::Error),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for gibsgraph-kg operations
pub type Result<T> = std::result::Result<T, KgError>;

impl From<String> for KgError {
    fn from(s: String) -> Self {
        KgError::Other(s)
    }
}

impl From<&str> for KgError {
    fn from(s: &str) -> Self {
        KgError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for KgError {
    fn from(e: serde_json::Error) -> Self {
        KgError::SerializationError(e.to_string())
    }
}
