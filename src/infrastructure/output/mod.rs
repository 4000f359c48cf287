//! Output service implementations

pub mod json_output;

pub use json_output::*;
