//! Error types for the CV evaluator.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, EvaluatorError>;

/// Errors that can occur while evaluating a candidate.
#[derive(Error, Debug)]
pub enum EvaluatorError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error during serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The document extension is not one of the supported formats.
    #[error("Unsupported document format for '{0}': expected .pdf or .docx")]
    UnsupportedFormat(PathBuf),

    /// The document exists but its text could not be extracted.
    #[error("Failed to read {format} file '{path}': {message}")]
    Extraction {
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    /// Job title or candidate text is too short to evaluate.
    #[error("Invalid input: Job title and CV must be provided with sufficient length.")]
    InvalidInput,

    /// LLM API error.
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// HTTP request error.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The LLM replied with text that is not valid JSON.
    #[error("Malformed JSON received from LLM.")]
    MalformedResponse,

    /// The LLM replied with JSON that does not match the evaluation schema.
    #[error("LLM response did not match the evaluation schema: {0}")]
    Schema(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EvaluatorError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an extraction error for a document of the given format.
    pub fn extraction(
        path: impl Into<PathBuf>,
        format: &'static str,
        cause: impl std::fmt::Display,
    ) -> Self {
        Self::Extraction {
            path: path.into(),
            format,
            message: cause.to_string(),
        }
    }
}

impl From<reqwest::Error> for EvaluatorError {
    fn from(err: reqwest::Error) -> Self {
        EvaluatorError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for EvaluatorError {
    fn from(err: serde_json::Error) -> Self {
        EvaluatorError::Serialization(err.to_string())
    }
}
