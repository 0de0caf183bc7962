//! Error taxonomy shared by every stage of the comparison pipeline.

use thiserror::Error;

/// Result type alias using CompareError.
pub type CompareResult<T> = Result<T, CompareError>;

/// Primary error type for pipeline stages.
///
/// Each variant is a distinct failure kind; callers can match on it or use
/// [`CompareError::code`] for reporting.
#[derive(Debug, Clone, Error)]
pub enum CompareError {
    /// Missing or mismatched input columns, or incompatible coordinate frames.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Not enough usable data to perform the requested operation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Malformed configuration (color map anchors, palettes, run settings).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed binary or structured input.
    #[error("Format error: {0}")]
    Format(String),

    /// Failed to access an input or output file.
    #[error("I/O error: {0}")]
    Io(String),
}

impl CompareError {
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        Self::InsufficientData(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Stable name of the error kind, used in run summaries.
    pub fn code(&self) -> &'static str {
        match self {
            CompareError::Schema(_) => "SchemaError",
            CompareError::InsufficientData(_) => "InsufficientDataError",
            CompareError::Config(_) => "ConfigError",
            CompareError::Format(_) => "FormatError",
            CompareError::Io(_) => "IoError",
        }
    }
}

impl From<std::io::Error> for CompareError {
    fn from(err: std::io::Error) -> Self {
        CompareError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CompareError {
    fn from(err: serde_json::Error) -> Self {
        CompareError::Format(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            CompareError::schema("a"),
            CompareError::insufficient_data("b"),
            CompareError::config("c"),
            CompareError::format("d"),
            CompareError::Io("e".to_string()),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 5);
    }

    #[test]
    fn test_display_includes_message() {
        let err = CompareError::config("anchor lists differ in length");
        assert!(err.to_string().contains("anchor lists differ"));
    }
}
