//! Error types for wishcard

use thiserror::Error;

// Clipboard and audio errors are logged and dropped by the caller; only
// configuration errors reach the user.
#[derive(Error, Debug)]
pub enum WishError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Clipboard could not be opened or written
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Output device or track could not be opened
    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("Invalid hex color: {0} (expected RRGGBB, e.g. 1a1b26)")]
    InvalidColor(String),

    #[error("Invalid scale: {0} (must be a positive number)")]
    InvalidScale(f32),
}

pub type Result<T> = std::result::Result<T, WishError>;
