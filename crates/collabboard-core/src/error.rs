//! Error types for whiteboard operations.
//!
//! Scene edits never fail: unknown ids, undo at a history boundary, empty text
//! and unsupported uploads are silent no-ops. Errors only surface from
//! configuration and serialization.

use thiserror::Error;

/// Whiteboard errors.
#[derive(Debug, Error)]
pub enum WhiteboardError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for whiteboard operations.
pub type WhiteboardResult<T> = Result<T, WhiteboardError>;
