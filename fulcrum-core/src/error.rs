//! Error types for fulcrum.

use thiserror::Error;

/// A single field that blocked a submission, with the message shown next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors that can occur at the edges of fulcrum (config, submission, export).
///
/// The synchroniser itself never fails; bad input there becomes a validity message.
#[derive(Error, Debug)]
pub enum FulcrumError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown timezone '{0}'")]
    UnknownTimezone(String),

    #[error("{0}")]
    InvalidDateTime(String),

    #[error("{0}")]
    InvalidDuration(String),

    #[error("{0}")]
    Occurrence(String),

    #[error("Submission blocked: {}", format_field_errors(.0))]
    Blocked(Vec<FieldError>),

    #[error("ICS generation error: {0}")]
    IcsGenerate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for fulcrum operations.
pub type FulcrumResult<T> = Result<T, FulcrumError>;
