//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The backend could not produce a frame.
    #[error("Render backend failed: {0}")]
    Backend(String),

    /// Writing rendered output failed.
    #[error("Failed to write render output: {0}")]
    Io(#[from] std::io::Error),
}
