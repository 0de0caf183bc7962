//! Radar decoding errors.

use compare_common::CompareError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RadarError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: '{value}'")]
    InvalidValue { field: String, value: String },

    #[error("XML header error: {0}")]
    Xml(String),

    #[error("BLOB error: {0}")]
    Blob(String),

    #[error("Decompression error: {0}")]
    Decompression(String),

    #[error("Unpacking error: {0}")]
    UnpackingError(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl RadarError {
    pub fn missing(path: impl Into<String>) -> Self {
        Self::MissingField(path.into())
    }

    pub fn invalid_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl From<quick_xml::Error> for RadarError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<std::io::Error> for RadarError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<RadarError> for CompareError {
    fn from(err: RadarError) -> Self {
        match err {
            RadarError::Io(msg) => CompareError::Io(msg),
            other => CompareError::Format(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, RadarError>;
