//! Wire error types

use thiserror::Error;

/// Errors that can occur while encoding or decoding wire data
#[derive(Error, Debug)]
pub enum WireError {
    /// JSON did not match the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary frame payload was not valid UTF-8
    #[error("Frame payload is not valid UTF-8")]
    NonUtf8Frame,
}
