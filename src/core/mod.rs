//! Core building blocks shared by every layer of the modeler.
//!
//! Holds the crate-wide error type, the modeler configuration and the naming
//! helpers used when synthesizing type names.

pub mod config;
pub mod error;
pub mod utils;

pub use config::ModelerConfig;
pub use error::{Error, Result};
