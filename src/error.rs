//! Error types for the rendering pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while composing or rendering a card
///
/// Degraded paths (background lookup, logo download) never produce one of
/// these; they fall back to defaults and log instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to launch or prepare the browser
    #[error("Browser initialization failed: {0}")]
    InitializationError(String),

    /// Failed to load the composed document
    #[error("Failed to load document: {0}")]
    LoadError(String),

    /// Failed to capture or produce the image
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Operation timed out
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Decoding, cropping or encoding the capture failed
    #[error("Image processing failed: {0}")]
    ImageError(#[from] image::ImageError),

    /// Scratch file I/O
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::NetworkError(format!("request timed out: {}", err))
        } else {
            Error::NetworkError(err.to_string())
        }
    }
}
