//! Error types for the lecture search library

/// Result type for lecture search operations
pub type Result<T> = std::result::Result<T, LectureSearchError>;

/// Error types for lecture search operations
#[derive(thiserror::Error, Debug)]
pub enum LectureSearchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Could not load catalog from {location}: {reason}")]
    CatalogLoad { location: String, reason: String },

    #[error("Malformed catalog JSON: {0}")]
    CatalogParse(#[from] serde_json::Error),

    #[error("Invalid catalog source: {0}")]
    InvalidSource(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
