//! Error types for the mdxgen CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Retryable model failures live in [`crate::model::AttemptCause`] and only reach
//! this type wrapped inside [`GenError::Exhausted`].

use crate::exit_codes;
use crate::model::ModelError;
use thiserror::Error;

/// Main error type for mdxgen operations.
///
/// Each variant maps to a specific exit code.
#[derive(Error, Debug)]
pub enum GenError {
    /// User provided invalid arguments or configuration.
    #[error("{0}")]
    UserError(String),

    /// No prompt could be obtained: no usable cache and the fetch failed.
    #[error("prompt unavailable: {0}")]
    Unavailable(String),

    /// Every generation attempt failed with a retryable cause.
    #[error("generation exhausted after {attempts} attempt(s); last cause: {cause}")]
    Exhausted { attempts: u32, cause: String },

    /// The completion request could not be issued at all.
    #[error("generation request rejected on attempt {attempt}: {cause}")]
    FatalRequest { attempt: u32, cause: String },

    /// The model response contained no extractable code blocks.
    #[error("model response produced no files ({skipped} fenced block(s) skipped)")]
    EmptyOutput { skipped: usize },

    /// The generated tree failed validation.
    #[error("Validation failed: {unmet} unmet requirement(s): {detail}")]
    Validation { unmet: usize, detail: String },

    /// Filesystem failure outside of validation.
    #[error("I/O failure: {0}")]
    Io(String),
}

impl GenError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            GenError::UserError(_) => exit_codes::USER_ERROR,
            GenError::Unavailable(_) => exit_codes::PROMPT_UNAVAILABLE,
            GenError::Exhausted { .. } => exit_codes::GENERATION_FAILURE,
            GenError::FatalRequest { .. } => exit_codes::GENERATION_FAILURE,
            GenError::EmptyOutput { .. } => exit_codes::GENERATION_FAILURE,
            GenError::Validation { .. } => exit_codes::VALIDATION_FAILURE,
            GenError::Io(_) => exit_codes::IO_FAILURE,
        }
    }
}

impl From<ModelError> for GenError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Exhausted { attempts, last, .. } => GenError::Exhausted {
                attempts,
                cause: last.to_string(),
            },
            ModelError::Fatal { attempt, cause } => GenError::FatalRequest { attempt, cause },
        }
    }
}

/// Result type alias for mdxgen operations.
pub type Result<T> = std::result::Result<T, GenError>;
