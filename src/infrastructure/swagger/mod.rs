//! Swagger document schema graph, parsing and loading

pub mod composite_loader;
pub mod file_loader;
pub mod http_loader;
pub mod loader;
pub mod parser;
pub mod types;

pub use composite_loader::CompositeSpecLoader;
pub use file_loader::FileSpecLoader;
pub use http_loader::HttpSpecLoader;
pub use loader::SpecLoader;
pub use parser::SwaggerParser;
pub use types::*;
