//! Error types for the sketch_sorter library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sketch_sorter operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Error types for extraction and sorting operations
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Image file could not be opened or decoded
    #[error("Failed to load image: {message}")]
    ImageLoadError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// File extension is not a known image format
    #[error("Unsupported image format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// Inset crop leaves no pixels
    #[error("Invalid region: {width}x{height} at ({x}, {y}) cannot be inset by {inset}px")]
    InvalidRegion {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        inset: i32,
    },

    /// OpenCV operation failed
    #[error("OpenCV error: {operation}")]
    OpenCvError {
        operation: String,
        #[source]
        source: opencv::Error,
    },

    /// Encoder refused to write an image
    #[error("Failed to write image: {}", path.display())]
    ImageWriteError { path: PathBuf },

    /// Filesystem operation failed
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ExtractError {
    /// Create an image load error with context
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoadError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an OpenCV error with context
    pub fn opencv(operation: impl Into<String>, source: opencv::Error) -> Self {
        Self::OpenCvError {
            operation: operation.into(),
            source,
        }
    }

    /// Create a filesystem error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Check if this error only affects a single region and the page can continue
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ExtractError::InvalidRegion { .. })
    }
}
