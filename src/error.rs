use thiserror::Error;

/// Main error type for KnowledgeMap
#[derive(Error, Debug)]
pub enum KnowledgeMapError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP server errors
    #[error("Server error: {0}")]
    Server(String),
}

/// Convenient Result type using KnowledgeMapError
pub type Result<T> = std::result::Result<T, KnowledgeMapError>;
