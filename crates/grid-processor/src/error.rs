//! Error types for grid processing.

use compare_common::CompareError;
use thiserror::Error;

/// Errors that can occur during grid processing.
#[derive(Error, Debug)]
pub enum GridProcessorError {
    /// Not enough usable samples to build a triangulation.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Input samples or grids are malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Invalid metadata in a gridded reference document.
    #[error("invalid grid metadata: {0}")]
    InvalidMetadata(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// File access error.
    #[error("storage error: {0}")]
    StorageError(String),

    /// Error raised by a shared data type.
    #[error(transparent)]
    Common(#[from] CompareError),
}

impl GridProcessorError {
    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        Self::InsufficientData(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

impl From<std::io::Error> for GridProcessorError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for GridProcessorError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidMetadata(err.to_string())
    }
}

impl From<GridProcessorError> for CompareError {
    fn from(err: GridProcessorError) -> Self {
        match err {
            GridProcessorError::InsufficientData(msg) => CompareError::InsufficientData(msg),
            GridProcessorError::InvalidInput(msg) => CompareError::Schema(msg),
            GridProcessorError::InvalidMetadata(msg) => CompareError::Format(msg),
            GridProcessorError::ConfigError(msg) => CompareError::Config(msg),
            GridProcessorError::StorageError(msg) => CompareError::Io(msg),
            GridProcessorError::Common(inner) => inner,
        }
    }
}

/// Result type for grid processor operations.
pub type Result<T> = std::result::Result<T, GridProcessorError>;
