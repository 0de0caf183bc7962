//! Rendering errors.

use compare_common::CompareError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid color map: {0}")]
    InvalidColorMap(String),

    #[error("Invalid normalization: {0}")]
    InvalidNormalize(String),

    #[error("Unknown palette: {0}")]
    UnknownPalette(String),

    #[error("Invalid canvas layout: {0}")]
    InvalidLayout(String),

    #[error("PNG encoding failed: {0}")]
    Encoding(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl RenderError {
    pub fn color_map(msg: impl Into<String>) -> Self {
        Self::InvalidColorMap(msg.into())
    }

    pub fn layout(msg: impl Into<String>) -> Self {
        Self::InvalidLayout(msg.into())
    }
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<RenderError> for CompareError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Io(msg) | RenderError::Encoding(msg) => CompareError::Io(msg),
            other => CompareError::Config(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
