//! The client model: resolved types, the registry that owns them, and the
//! operation graph that references them.

pub mod client;
pub mod registry;
pub mod types;

pub use client::{
    ClientModel, CollectionFormat, Method, Parameter, ParameterLocation, Response,
};
pub use registry::{EnumConflict, Interned, ModelRegistry};
pub use types::{
    CompositeId, CompositeState, CompositeType, Constraints, EnumId, EnumType, EnumValue,
    ModelType, PrimaryType, Property,
};
