//! Application layer error types

use thiserror::Error;

use crate::modeler::ResolutionErrors;

/// Application layer errors
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Failed to load document: {0}")]
    LoadError(#[from] crate::core::Error),

    #[error("{0}")]
    ResolutionFailed(#[from] ResolutionErrors),

    #[error("Output error: {0}")]
    OutputError(String),
}

/// Validation errors for requests
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Document source cannot be empty")]
    EmptySource,
}
