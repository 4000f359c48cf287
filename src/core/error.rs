//! Error handling for the swagger modeler.
//!
//! This module defines the main error type `Error` used by the loading,
//! configuration and command layers, along with a convenient `Result` type
//! alias. It uses `thiserror` and implements conversions from the common error
//! types those layers run into.
//!
//! Failures of the resolution pass itself are described by
//! [`ResolutionErrors`](crate::modeler::ResolutionErrors); they surface here
//! through the [`Error::Resolution`] variant.
//!
//! # Examples
//!
//! ```
//! use swagger_modeler::core::error::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     Err(Error::load("document is empty"))
//! }
//!
//! assert!(might_fail().is_err());
//! ```

use thiserror::Error;

use crate::modeler::ResolutionErrors;

/// Result type for modeler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for modeler operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Document could not be fetched or is not a Swagger 2.0 document
    #[error("Load error: {0}")]
    Load(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The resolution pass reported one or more defects
    #[error("{0}")]
    Resolution(#[from] ResolutionErrors),
}

impl Error {
    /// Create a new load error
    pub fn load<S: Into<String>>(msg: S) -> Self {
        Self::Load(msg.into())
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}
