//! Error types for diagram documents.
//!
//! Editing operations never fail: a missing id is skipped, an empty clipboard or
//! history is a no-op. Only converting a diagram to or from its persisted form
//! can produce an error.

use thiserror::Error;

/// Result type for document operations.
pub type DiagramResult<T> = Result<T, DiagramError>;

/// Errors that can occur while reading or writing a diagram document.
#[derive(Debug, Error)]
pub enum DiagramError {
    /// Document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The document parsed but does not describe a diagram.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}
