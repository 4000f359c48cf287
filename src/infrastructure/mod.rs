//! Infrastructure layer - concrete implementations of application ports

pub mod output;
pub mod swagger;
