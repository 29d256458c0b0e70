//! Error types for Markdown to slide deck conversion.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing, rendering, or writing a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller input was rejected before or during parsing.
    #[error("{0}")]
    Validation(String),

    /// The input file does not exist.
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Failed to read or write a file.
    #[error("Failed to access file: {0}")]
    IoError(#[from] std::io::Error),

    /// An image could not be probed or embedded.
    #[error("Image error: {0}")]
    ImageError(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML writing or parsing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),

    /// The renderer referenced a slide the sink does not have.
    #[error("Render error: {0}")]
    RenderError(String),
}

impl Error {
    /// Shorthand for building a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// True for errors the caller can fix by changing their input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
