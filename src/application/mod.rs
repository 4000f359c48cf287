//! Application layer - orchestrates use cases and coordinates between domains

pub mod build_model;
pub mod commands;
pub mod errors;
pub mod traits;

pub use build_model::*;
pub use commands::*;
pub use errors::*;
pub use traits::*;
