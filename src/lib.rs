//! Swagger 2.0 schema resolution engine.
//!
//! Turns a Swagger document into a canonical client model: deduplicated named
//! types with stable identity, validated polymorphic hierarchies and the
//! operation graph that references them.
//!
//! Layers:
//!
//! - [`core`]: crate errors, configuration and naming helpers
//! - [`infrastructure`]: the Swagger schema graph, its parser and loaders, and
//!   model output
//! - [`model`]: model types, the registry that owns them and the client model
//! - [`modeler`]: the resolution pass
//! - [`application`]: the build-model use case
#![deny(unsafe_code)]

pub mod application;
pub mod core;
pub mod infrastructure;
pub mod model;
pub mod modeler;

pub use crate::core::{Error, ModelerConfig, Result};
pub use model::ClientModel;
pub use modeler::{Modeler, ResolutionError, ResolutionErrors};
